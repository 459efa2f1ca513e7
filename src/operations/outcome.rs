use serde::{Deserialize, Serialize};

use super::error::OperationError;

/// Status of a finished operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Failure,
}

/// The value every operation returns: a success carrying a value, or a
/// failure carrying an error and possibly a value.
///
/// Success holds exactly when no error is present. Outcomes can only be
/// built through the constructors below, so that invariant cannot be broken.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Outcome<T> {
    value: Option<T>,
    error: Option<OperationError>,
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Self { value: Some(value), error: None }
    }

    pub fn failure(error: OperationError) -> Self {
        Self { value: None, error: Some(error) }
    }

    /// A failure that still hands back a value, e.g. the unsaved record.
    pub fn failure_with_value(error: OperationError, value: T) -> Self {
        Self { value: Some(value), error: Some(error) }
    }

    pub(crate) fn from_parts(value: Option<T>, error: Option<OperationError>) -> Self {
        match (&value, &error) {
            (None, None) => panic!("an outcome needs either a value or an error"),
            _ => Self { value, error },
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    pub fn status(&self) -> Status {
        if self.is_success() {
            Status::Success
        } else {
            Status::Failure
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&OperationError> {
        self.error.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn into_parts(self) -> (Option<T>, Option<OperationError>) {
        (self.value, self.error)
    }

    /// Drops any value carried by a failure.
    pub fn into_result(self) -> Result<T, OperationError> {
        match (self.value, self.error) {
            (_, Some(error)) => Err(error),
            (Some(value), None) => Ok(value),
            (None, None) => unreachable!("successful outcomes always carry a value"),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome { value: self.value.map(f), error: self.error }
    }
}

impl<T> From<Result<T, OperationError>> for Outcome<T> {
    fn from(result: Result<T, OperationError>) -> Self {
        match result {
            Ok(value) => Outcome::success(value),
            Err(error) => Outcome::failure(error),
        }
    }
}
