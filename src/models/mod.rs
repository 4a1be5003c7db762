pub mod arbitrationmodels;
pub mod escrowmodels;
pub mod usermodel;
pub mod walletmodels;
