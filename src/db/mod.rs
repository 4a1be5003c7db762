pub mod arbitrationdb;
pub mod db;
pub mod escrowdb;
pub mod userdb;
pub mod walletdb;
