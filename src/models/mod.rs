pub mod category;
pub mod currency;
pub mod transaction;
