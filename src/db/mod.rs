pub mod category_repository;
pub mod connection;
pub mod error;
pub mod presets;
pub mod settings_repository;
pub mod transaction_repository;
