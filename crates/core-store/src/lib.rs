pub mod error;
pub mod loader;
pub mod models;
pub mod schema;
pub mod service;

pub use error::{StoreError, StoreResult};
pub use models::QueryResult;
pub use schema::SchemaDescription;
pub use service::StoreService;
