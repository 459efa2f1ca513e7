//! Generic record operations.
//!
//! Every operation is bound to one [`RecordClass`] when constructed and
//! holds no state between calls. Expected failures come back as failing
//! [`Outcome`]s; operations that consume a record hand it back as the
//! failure's value.

pub mod assign;
pub mod build;
pub mod create;
pub mod destroy;
pub mod factory;
pub mod find_many;
pub mod find_matching;
pub mod find_one;
pub mod save;
pub mod stages;
pub mod update;

pub use assign::Assign;
pub use build::Build;
pub use create::Create;
pub use destroy::Destroy;
pub use factory::{AnyOperation, Factory, OperationName, UnknownOperation};
pub use find_many::{FindMany, FoundRecords};
pub use find_matching::{FindMatching, MatchOptions};
pub use find_one::FindOne;
pub use save::Save;
pub use stages::{AssignStage, BuildStage, SaveStage};
pub use update::Update;

use tracing::{debug, warn};

use crate::database::record::Record;
use crate::database::schema::RecordClass;
use crate::database::store::Row;

use super::error::OperationError;
use super::outcome::Outcome;

/// Diagnostic name of an operation bound to a class, e.g. `FindOneJob`.
pub(crate) fn operation_name(operation: &str, class: &RecordClass) -> String {
    format!("{}{}", operation, class.name)
}

pub(crate) fn load_record(class: &'static RecordClass, row: Row) -> Result<Record, OperationError> {
    Ok(Record::from_row(class, row)?)
}

pub(crate) fn log_outcome<T>(name: &str, outcome: &Outcome<T>) {
    match outcome.error() {
        None => debug!("{} succeeded", name),
        Some(error) => warn!("{} failed ({}): {}", name, error.type_tag(), error),
    }
}
