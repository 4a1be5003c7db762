pub mod arbitration;
pub mod escrow;
pub mod wallet;
