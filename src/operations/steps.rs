//! Step-based control flow for composing fallible operations.
//!
//! A block of steps is an ordinary function or `async` block returning
//! [`StepResult`]. Each fallible action goes through [`step`] and is
//! propagated with `?`; the first failure halts the block and becomes the
//! block's outcome, error and value included.
//!
//! ```ignore
//! let outcome = steps(async {
//!     let record = step(build.call(attributes).await)?;
//!     step(save.call(record).await)
//! })
//! .await;
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;

use super::error::OperationError;
use super::outcome::Outcome;

/// The failing outcome of a step, held while it propagates out of a block.
///
/// The value is type-erased so that a block may halt on a step whose value
/// type differs from the block's own; [`steps`] restores it when the types
/// agree.
pub struct Halt {
    error: OperationError,
    value: Option<Box<dyn Any + Send>>,
}

impl Halt {
    pub fn error(&self) -> &OperationError {
        &self.error
    }

    fn into_outcome<T: 'static>(self) -> Outcome<T> {
        let value = self.value.and_then(|v| v.downcast::<T>().ok()).map(|boxed| *boxed);
        Outcome::from_parts(value, Some(self.error))
    }
}

impl fmt::Debug for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Halt")
            .field("error", &self.error)
            .field("has_value", &self.value.is_some())
            .finish()
    }
}

impl From<OperationError> for Halt {
    fn from(error: OperationError) -> Self {
        Halt { error, value: None }
    }
}

pub type StepResult<T> = Result<T, Halt>;

/// Anything that can be run as a step.
pub enum Step<'a, T> {
    /// An already computed outcome.
    Outcome(Outcome<T>),
    /// A plain value; always succeeds.
    Value(T),
    /// A deferred computation, invoked when the step runs.
    Call(Box<dyn FnOnce() -> Outcome<T> + Send + 'a>),
}

impl<'a, T> Step<'a, T> {
    pub fn call(f: impl FnOnce() -> Outcome<T> + Send + 'a) -> Self {
        Step::Call(Box::new(f))
    }

    pub fn value(value: T) -> Self {
        Step::Value(value)
    }

    fn into_outcome(self) -> Outcome<T> {
        match self {
            Step::Outcome(outcome) => outcome,
            Step::Value(value) => Outcome::success(value),
            Step::Call(f) => f(),
        }
    }
}

impl<T> From<Outcome<T>> for Step<'_, T> {
    fn from(outcome: Outcome<T>) -> Self {
        Step::Outcome(outcome)
    }
}

/// Runs a step. Evaluates to the wrapped value on success; on failure
/// returns a [`Halt`] that `?` carries out of the enclosing block.
pub fn step<'a, T: Send + 'static>(x: impl Into<Step<'a, T>>) -> StepResult<T> {
    match x.into().into_outcome().into_parts() {
        (value, Some(error)) => Err(Halt {
            error,
            value: value.map(|v| Box::new(v) as Box<dyn Any + Send>),
        }),
        (Some(value), None) => Ok(value),
        (None, None) => unreachable!("successful outcomes always carry a value"),
    }
}

/// Evaluates an async block of steps into a single outcome.
pub async fn steps<T: 'static>(block: impl Future<Output = StepResult<T>>) -> Outcome<T> {
    block.await.into()
}

/// Evaluates a synchronous block of steps into a single outcome.
pub fn steps_sync<T: 'static>(block: impl FnOnce() -> StepResult<T>) -> Outcome<T> {
    block().into()
}

impl<T: 'static> From<StepResult<T>> for Outcome<T> {
    fn from(result: StepResult<T>) -> Self {
        match result {
            Ok(value) => Outcome::success(value),
            Err(halt) => halt.into_outcome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn failing(message: &str) -> Outcome<i32> {
        Outcome::failure(OperationError::other(message))
    }

    #[test]
    fn test_block_value_wrapped_as_success() {
        let outcome = steps_sync(|| {
            let a = step(Outcome::success(2))?;
            let b = step(Step::value(3))?;
            Ok(a * b)
        });

        assert_eq!(outcome, Outcome::success(6));
    }

    #[test]
    fn test_first_failure_short_circuits() {
        let calls = AtomicUsize::new(0);

        let outcome: Outcome<i32> = steps_sync(|| {
            step(Step::call(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Outcome::success(1)
            }))?;
            step(failing("first"))?;
            step(Step::call(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                failing("second")
            }))?;
            Ok(0)
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.error(), Some(&OperationError::other("first")));
    }

    #[test]
    fn test_failing_value_is_preserved_when_types_match() {
        let error = OperationError::other("invalid");
        let outcome: Outcome<String> = steps_sync(|| {
            step(Outcome::failure_with_value(error.clone(), "unsaved".to_string()))
        });

        assert_eq!(outcome, Outcome::failure_with_value(error, "unsaved".to_string()));
    }

    #[test]
    fn test_failing_value_dropped_when_types_differ() {
        let outcome: Outcome<String> = steps_sync(|| {
            let n = step(Outcome::failure_with_value(OperationError::other("x"), 5_i32))?;
            Ok(n.to_string())
        });

        assert!(outcome.is_failure());
        assert!(outcome.value().is_none());
    }

    #[test]
    fn test_nested_blocks_propagate_inner_failure() {
        let inner = || steps_sync(|| -> StepResult<i32> { step(failing("inner")) });

        let outcome = steps_sync(|| {
            let value = step(inner())?;
            Ok(value + 1)
        });

        assert_eq!(outcome.error(), Some(&OperationError::other("inner")));
    }

    #[test]
    fn test_operation_error_halts_directly() {
        let outcome: Outcome<()> =
            steps_sync(|| Err(OperationError::invalid_parameter("order", "is invalid").into()));

        assert_eq!(outcome.error().map(|e| e.type_tag()), Some("invalid_parameters"));
    }

    #[tokio::test]
    async fn test_async_block() {
        let outcome = steps(async {
            let a = step(async { Outcome::success(20) }.await)?;
            Ok(a + 1)
        })
        .await;

        assert_eq!(outcome, Outcome::success(21));
    }
}
