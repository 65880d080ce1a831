pub mod error;
pub mod schema;
pub mod store;

pub use error::StorageError;
pub use store::{SqliteStore, StoreSession};
