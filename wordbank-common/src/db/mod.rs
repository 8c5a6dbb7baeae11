//! Record store access for the word banks

pub mod init;
pub mod models;
pub mod words;

pub use init::init_database_pool;
pub use models::*;
pub use words::WordStore;
