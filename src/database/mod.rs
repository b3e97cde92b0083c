pub mod manager;
pub mod models;
pub mod postgres;
pub mod query_builder;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use postgres::PgStore;
pub use repository::{Model, Repository};
pub use store::{Collection, Document, DocumentStore, InsertOneResult, UpdateResult};
