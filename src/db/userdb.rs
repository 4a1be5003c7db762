// db/userdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::{Notification, User};

#[async_trait]
pub trait UserExt {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error>;

    async fn create_notification(
        &self,
        user_id: Option<Uuid>,
        notification_type: String,
        title: String,
        message: String,
        data: Option<serde_json::Value>,
    ) -> Result<Notification, Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, phone, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_notification(
        &self,
        user_id: Option<Uuid>,
        notification_type: String,
        title: String,
        message: String,
        data: Option<serde_json::Value>,
    ) -> Result<Notification, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, notification_type, title, message, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, notification_type, title, message, data, is_read, created_at
            "#,
        )
        .bind(user_id)
        .bind(notification_type)
        .bind(title)
        .bind(message)
        .bind(data)
        .fetch_one(&self.pool)
        .await
    }
}
