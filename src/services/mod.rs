// Service exports
pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::{BridgeRow, MemoryStore};
pub use postgres::PostgresStore;
pub use store::{StoreError, SurveyStore};
