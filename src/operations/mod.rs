pub mod error;
pub mod outcome;
pub mod records;
pub mod steps;
pub mod validations;

pub use error::{FieldError, OperationError};
pub use outcome::{Outcome, Status};
pub use records::{
    AnyOperation, Assign, Build, Create, Destroy, Factory, FindMany, FindMatching, FindOne,
    FoundRecords, MatchOptions, OperationName, Save, Update,
};
pub use steps::{step, steps, steps_sync, Halt, Step, StepResult};
