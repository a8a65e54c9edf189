pub mod migrations;
pub mod queries;
pub mod store;
pub use migrations::create_database_pool;
pub use store::LastQueryStore;
