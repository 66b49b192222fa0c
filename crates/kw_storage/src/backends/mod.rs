pub mod memory;

#[cfg(feature = "mongodb")]
pub mod mongo;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryStorage;

#[cfg(feature = "mongodb")]
pub use mongo::MongoStorage;

#[cfg(feature = "sqlite")]
pub use sqlite::SQLiteStorage;
