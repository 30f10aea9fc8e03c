//! Result object returned by the coordinator.

/// Outcome of a coordinator run.
///
/// Carries the success flag, the data (or nothing), an optional
/// human-readable error, and whether a compensation sweep ran. No error is
/// expected to escape the coordinator boundary under normal failure paths;
/// failures surface here instead.
#[derive(Debug)]
pub struct SagaOutcome<T> {
    /// True if the unit of work committed.
    pub success: bool,

    /// The committed data, present only on success.
    pub data: Option<T>,

    /// Human-readable failure message, present only on failure.
    pub error: Option<String>,

    /// True if at least one compensating action was swept.
    pub rolled_back: bool,
}

impl<T> SagaOutcome<T> {
    /// A committed outcome carrying data. The rollback stack was discarded.
    pub fn committed(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            rolled_back: false,
        }
    }

    /// A failed outcome carrying the error message.
    pub fn failed(error: impl Into<String>, rolled_back: bool) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            rolled_back,
        }
    }

    /// Converts the outcome into a `Result`, losing the rollback flag.
    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(error),
            (None, None) => Err("saga produced no data and no error".to_string()),
        }
    }

    /// Unwraps the data, panicking with the error message on failure.
    ///
    /// Test helper; production callers should match on the fields.
    pub fn expect_committed(self) -> T {
        match self.into_result() {
            Ok(data) => data,
            Err(error) => panic!("saga failed: {error}"),
        }
    }
}
