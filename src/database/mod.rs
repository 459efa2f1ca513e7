pub mod manager;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod schema;
pub mod store;
pub mod validation;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use record::{Record, RecordError, RecordVecExt};
pub use schema::{AttributeDef, AttributeKind, DefaultValue, Dependent, RecordClass};
pub use store::{Row, Store};
pub use validation::Validation;
