use crate::value::{Arguments, Value};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Computes a stubbed return value from the actual call's arguments
pub type ReturnCallback = Arc<dyn Fn(&Arguments) -> Value + Send + Sync>;

pub(crate) type SharedExpectation = Arc<Mutex<Expectation>>;

/// What a configured expectation answers with
#[derive(Clone)]
pub(crate) enum Reply {
    Fixed(Value),
    Computed(ReturnCallback),
}

impl Reply {
    pub(crate) fn produce(self, args: &Arguments) -> Value {
        match self {
            Reply::Fixed(value) => value,
            Reply::Computed(callback) => callback(args),
        }
    }
}

/// Configured behavior and observed history of one method on one substitute.
///
/// Configuration (`expected_arguments`, return value, callback) and history
/// (`recorded_calls`) are cleared independently of each other.
///
/// A configured expectation answers a call only while exactly one call
/// matching its signature has been recorded since it was configured, so the
/// first matching call gets the stubbed answer and later ones reach the
/// original until history is cleared or the method is stubbed again.
pub struct Expectation {
    expected_arguments: Option<Arguments>,
    /// Index into `recorded_calls` where the current configuration starts
    configured_at: usize,
    validate_arguments: bool,
    return_value: Value,
    return_callback: Option<ReturnCallback>,
    recorded_calls: Vec<Arguments>,
    match_count: usize,
}

impl Expectation {
    pub fn new() -> Self {
        Self {
            expected_arguments: None,
            configured_at: 0,
            validate_arguments: true,
            return_value: Value::Undefined,
            return_callback: None,
            recorded_calls: Vec::new(),
            match_count: 0,
        }
    }

    pub(crate) fn shared(self) -> SharedExpectation {
        Arc::new(Mutex::new(self))
    }

    pub fn expected_arguments(&self) -> Option<&Arguments> {
        self.expected_arguments.as_ref()
    }

    pub fn validates_arguments(&self) -> bool {
        self.validate_arguments
    }

    pub fn is_configured(&self) -> bool {
        self.expected_arguments.is_some()
    }

    pub fn recorded_calls(&self) -> &[Arguments] {
        &self.recorded_calls
    }

    /// Result of the most recent assertion against this expectation
    pub fn match_count(&self) -> usize {
        self.match_count
    }

    /// Capture a new signature. Any previous return behavior is dropped;
    /// recorded history is kept but no longer counts against the stub.
    pub(crate) fn configure(&mut self, expected: Arguments, validate_arguments: bool) {
        self.expected_arguments = Some(expected);
        self.configured_at = self.recorded_calls.len();
        self.validate_arguments = validate_arguments;
        self.return_value = Value::Undefined;
        self.return_callback = None;
    }

    pub(crate) fn set_return_value(&mut self, value: Value) {
        self.return_value = value;
    }

    pub(crate) fn set_callback(&mut self, callback: ReturnCallback) {
        self.return_callback = Some(callback);
    }

    pub(crate) fn record(&mut self, args: Arguments) {
        self.recorded_calls.push(args);
    }

    /// The configured answer for the call `args`, which must already be
    /// recorded. Answers only if `args` matches the configured signature and
    /// it is the one matching call recorded since configuration, both under
    /// the expectation's own validation policy.
    pub(crate) fn stubbed_reply(&self, args: &Arguments) -> Option<Reply> {
        let expected = self.expected_arguments.as_ref()?;
        if !expected.matches(args, self.validate_arguments) {
            return None;
        }
        let since_configured = self.recorded_calls.get(self.configured_at..).unwrap_or(&[]);
        let matching = since_configured
            .iter()
            .filter(|recorded| expected.matches(recorded, self.validate_arguments))
            .count();
        if matching != 1 {
            return None;
        }
        Some(match &self.return_callback {
            Some(callback) => Reply::Computed(Arc::clone(callback)),
            None => Reply::Fixed(self.return_value.clone()),
        })
    }

    /// Number of recorded calls matching `query`
    pub fn count_matches(&self, query: &Arguments, validate_arguments: bool) -> usize {
        self.recorded_calls
            .iter()
            .filter(|recorded| query.matches(recorded, validate_arguments))
            .count()
    }

    pub(crate) fn evaluate(&mut self, query: &Arguments, validate_arguments: bool) -> usize {
        self.match_count = self.count_matches(query, validate_arguments);
        self.match_count
    }

    pub(crate) fn clear_configuration(&mut self) {
        self.expected_arguments = None;
        self.configured_at = 0;
        self.validate_arguments = true;
        self.return_value = Value::Undefined;
        self.return_callback = None;
    }

    pub(crate) fn clear_recorded(&mut self) {
        self.recorded_calls.clear();
        self.configured_at = 0;
        self.match_count = 0;
    }
}

impl Default for Expectation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("expected_arguments", &self.expected_arguments)
            .field("configured_at", &self.configured_at)
            .field("validate_arguments", &self.validate_arguments)
            .field("return_value", &self.return_value)
            .field("has_callback", &self.return_callback.is_some())
            .field("recorded_calls", &self.recorded_calls.len())
            .finish()
    }
}
