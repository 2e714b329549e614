use super::expectation::SharedExpectation;
use crate::runtime::lock;
use crate::value::Arguments;
use std::fmt;

/// Verdicts about one method's recorded calls, produced by
/// [`Stub::asserts_that`](super::Stub::asserts_that).
///
/// A method that was never stubbed or called has no expectation; every
/// count-based verdict is then `false` rather than an error.
pub struct AssertionHandle {
    method: Option<String>,
    expectation: Option<SharedExpectation>,
    match_count: usize,
}

impl AssertionHandle {
    pub(crate) fn new(
        method: String,
        expectation: Option<SharedExpectation>,
        match_count: usize,
    ) -> Self {
        Self {
            method: Some(method),
            expectation,
            match_count,
        }
    }

    /// Name of the method the assertion closure called
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Recorded calls matching the queried arguments, `None` if the method
    /// was never touched
    pub fn match_count(&self) -> Option<usize> {
        self.expectation.as_ref().map(|_| self.match_count)
    }

    /// Exactly one matching call
    pub fn was_called(&self) -> bool {
        self.was_called_x_times(1)
    }

    pub fn was_called_two_times(&self) -> bool {
        self.was_called_x_times(2)
    }

    pub fn was_called_three_times(&self) -> bool {
        self.was_called_x_times(3)
    }

    pub fn was_called_four_times(&self) -> bool {
        self.was_called_x_times(4)
    }

    pub fn was_called_five_times(&self) -> bool {
        self.was_called_x_times(5)
    }

    pub fn was_called_x_times(&self, times: usize) -> bool {
        self.match_count() == Some(times)
    }

    pub fn was_called_any_number_of_times(&self) -> bool {
        self.match_count().is_some_and(|count| count > 0)
    }

    /// Whether any recorded call, whatever the queried arguments were,
    /// satisfies `predicate`
    pub fn using_callback<P>(&self, predicate: P) -> bool
    where
        P: Fn(&Arguments) -> bool,
    {
        let Some(expectation) = &self.expectation else {
            return false;
        };
        // Snapshot so the predicate may call back into the substitute.
        let recorded = lock(expectation).recorded_calls().to_vec();
        recorded.iter().any(predicate)
    }
}

impl fmt::Debug for AssertionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionHandle")
            .field("method", &self.method)
            .field("match_count", &self.match_count())
            .finish()
    }
}
