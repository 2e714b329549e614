use super::assertions::AssertionHandle;
use super::expectation::SharedExpectation;
use super::mode::{Mode, ModeGuard, Touched};
use super::substitute::{CallRecord, Substitute};
use crate::config::StubConfig;
use crate::runtime::{lock, Binding, ClassDescriptor};
use crate::value::{Arguments, Value};
use crate::{Result, TeddyError};
use std::fmt;
use std::sync::Arc;

/// Entry point of the mocking workflow: owns a substitute for a class and
/// switches it between configuring, asserting and plain calls.
///
/// ```
/// use teddy_mocks::{args, ClassDescriptor, Stub, Value};
///
/// let class = ClassDescriptor::builder("Clock")
///     .method("now", |_, _| Ok(Value::Int(0)))
///     .build();
/// let stub = Stub::new(&class).unwrap();
///
/// stub.stubs(|s| s.call("now", args![])).unwrap().and_returns(1_700_000_000);
/// assert_eq!(stub.object().call("now", args![]).unwrap(), Value::Int(1_700_000_000));
/// assert!(stub.asserts_that(|s| s.call("now", args![])).unwrap().was_called());
/// ```
pub struct Stub {
    object: Arc<Substitute>,
    validate_arguments: bool,
}

impl Stub {
    pub fn new(class: &Arc<ClassDescriptor>) -> Result<Self> {
        Self::with_config(class, &StubConfig::default())
    }

    pub fn with_config(class: &Arc<ClassDescriptor>, config: &StubConfig) -> Result<Self> {
        Self::build(class, Arguments::new(), config)
    }

    /// Build a substitute whose original constructor receives `args`
    pub fn with_arguments(class: &Arc<ClassDescriptor>, args: Arguments) -> Result<Self> {
        Self::build(class, args, &StubConfig::default())
    }

    /// Build from a namespace binding, which must be a class
    pub fn from_binding(binding: &Binding) -> Result<Self> {
        match binding {
            Binding::Class(class) => Self::new(class),
            other => Err(TeddyError::InvalidArgument(format!(
                "a {} binding is not a constructible class",
                other.kind()
            ))),
        }
    }

    fn build(class: &Arc<ClassDescriptor>, args: Arguments, config: &StubConfig) -> Result<Self> {
        Ok(Self {
            object: Substitute::build(class, args, config.strict_construction)?,
            validate_arguments: config.validate_arguments,
        })
    }

    /// The substitute to hand to code under test
    pub fn object(&self) -> &Arc<Substitute> {
        &self.object
    }

    /// Configure the method called inside `configure`, matching its arguments
    pub fn stubs<F, T>(&self, configure: F) -> Result<StubHandle>
    where
        F: FnOnce(&Substitute) -> Result<T>,
    {
        self.stubs_with(configure, self.validate_arguments)
    }

    /// Like [`stubs`](Self::stubs); with `validate_arguments` false any call
    /// with the same number of arguments gets the stubbed answer
    pub fn stubs_with<F, T>(&self, configure: F, validate_arguments: bool) -> Result<StubHandle>
    where
        F: FnOnce(&Substitute) -> Result<T>,
    {
        let guard = ModeGuard::enter(&self.object, Mode::ConfiguringStub, validate_arguments)?;
        configure(&*self.object)?;

        match guard.take_touched() {
            Touched::Expectation {
                method,
                expectation,
                ..
            } => Ok(StubHandle {
                method,
                expectation,
            }),
            Touched::Untouched { .. } | Touched::Nothing => Err(TeddyError::NothingTouched("stubs")),
        }
    }

    /// Query the recorded calls of the method called inside `assert`
    pub fn asserts_that<F, T>(&self, assert: F) -> Result<AssertionHandle>
    where
        F: FnOnce(&Substitute) -> Result<T>,
    {
        self.asserts_that_with(assert, self.validate_arguments)
    }

    /// Like [`asserts_that`](Self::asserts_that); with `validate_arguments`
    /// false every recorded call with the same number of arguments counts
    pub fn asserts_that_with<F, T>(
        &self,
        assert: F,
        validate_arguments: bool,
    ) -> Result<AssertionHandle>
    where
        F: FnOnce(&Substitute) -> Result<T>,
    {
        let guard = ModeGuard::enter(&self.object, Mode::Asserting, validate_arguments)?;
        assert(&*self.object)?;

        match guard.take_touched() {
            Touched::Expectation {
                method,
                expectation,
                match_count,
            } => Ok(AssertionHandle::new(method, Some(expectation), match_count)),
            Touched::Untouched { method } => Ok(AssertionHandle::new(method, None, 0)),
            Touched::Nothing => Err(TeddyError::NothingTouched("asserts_that")),
        }
    }

    /// Drop every stubbed return value and callback; recorded calls stay
    pub fn clear_stubbed_methods(&self) {
        self.object.clear_configuration();
    }

    /// Forget every recorded call; stubbed behavior stays
    pub fn clear_recorded_methods(&self) {
        self.object.clear_recorded();
    }

    /// Clear both stubbed behavior and recorded calls
    pub fn clear(&self) {
        self.clear_stubbed_methods();
        self.clear_recorded_methods();
    }

    pub fn call_log(&self) -> Vec<CallRecord> {
        self.object.call_log()
    }
}

impl fmt::Debug for Stub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stub")
            .field("object", &self.object)
            .field("validate_arguments", &self.validate_arguments)
            .finish()
    }
}

/// Binds the answer of a method configured by [`Stub::stubs`]
pub struct StubHandle {
    method: String,
    expectation: SharedExpectation,
}

impl StubHandle {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Answer the matching call with `value`. Only the first matching call
    /// recorded after configuration is answered; later ones run the original.
    pub fn and_returns(&self, value: impl Into<Value>) -> &Self {
        lock(&self.expectation).set_return_value(value.into());
        self
    }

    /// Answer the matching call with `callback(actual_arguments)`. Takes
    /// precedence over [`and_returns`](Self::and_returns).
    pub fn with_callback<F>(&self, callback: F) -> &Self
    where
        F: Fn(&Arguments) -> Value + Send + Sync + 'static,
    {
        lock(&self.expectation).set_callback(Arc::new(callback));
        self
    }
}

impl fmt::Debug for StubHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubHandle")
            .field("method", &self.method)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::runtime::Receiver;

    fn object_to_stub() -> Arc<ClassDescriptor> {
        ClassDescriptor::builder("ObjectToStub")
            .constructor(|this, _| {
                this.set_field("bar_val", Value::Int(-1));
                Ok(())
            })
            .method("foo", |_, _| Err(TeddyError::raised("Should not be called")))
            .method("bar", |this, _| Ok(this.field("bar_val")))
            .method("add", |_, args| {
                Ok(Value::Int(
                    args.arg(0).as_int().unwrap_or(0) + args.arg(1).as_int().unwrap_or(0),
                ))
            })
            .build()
    }

    #[test]
    fn test_modes_reset_after_pass() {
        let stub = Stub::new(&object_to_stub()).unwrap();
        stub.stubs(|s| s.call("bar", args![])).unwrap();
        assert_eq!(stub.object().mode(), Mode::Idle);

        stub.asserts_that(|s| s.call("bar", args![])).unwrap();
        assert_eq!(stub.object().mode(), Mode::Idle);
    }

    #[test]
    fn test_modes_reset_when_closure_fails() {
        let stub = Stub::new(&object_to_stub()).unwrap();

        let result = stub.stubs(|s| {
            s.call("bar", args![])?;
            Err::<(), _>(TeddyError::raised("configuration aborted"))
        });
        assert!(matches!(result, Err(TeddyError::Raised(_))));
        assert_eq!(stub.object().mode(), Mode::Idle);

        let result = stub.asserts_that(|s| s.call("missing", args![]));
        assert!(matches!(result, Err(TeddyError::UnknownMethod { .. })));
        assert_eq!(stub.object().mode(), Mode::Idle);
    }

    #[test]
    fn test_modes_reset_when_closure_panics() {
        let stub = Stub::new(&object_to_stub()).unwrap();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = stub.stubs(|s| -> Result<()> {
                s.call("bar", args![])?;
                panic!("closure blew up");
            });
        }));
        assert!(outcome.is_err());
        assert_eq!(stub.object().mode(), Mode::Idle);
        assert_eq!(stub.object().call("bar", args![]).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_closure_must_touch_a_method() {
        let stub = Stub::new(&object_to_stub()).unwrap();

        assert!(matches!(
            stub.stubs(|_| Ok(())),
            Err(TeddyError::NothingTouched("stubs"))
        ));
        assert!(matches!(
            stub.asserts_that(|_| Ok(())),
            Err(TeddyError::NothingTouched("asserts_that"))
        ));
    }

    #[test]
    fn test_nested_pass_fails_loudly() {
        let stub = Stub::new(&object_to_stub()).unwrap();

        let result = stub.stubs(|s| {
            s.call("bar", args![])?;
            stub.asserts_that(|s| s.call("bar", args![]))
        });
        assert!(matches!(result, Err(TeddyError::InvalidState(_))));
        assert_eq!(stub.object().mode(), Mode::Idle);
    }

    #[test]
    fn test_last_call_in_closure_wins() {
        let stub = Stub::new(&object_to_stub()).unwrap();
        let handle = stub
            .stubs(|s| {
                s.call("foo", args![])?;
                s.call("add", args![1, 2])
            })
            .unwrap();
        assert_eq!(handle.method(), "add");
        handle.and_returns(10);

        assert_eq!(stub.object().call("add", args![1, 2]).unwrap(), Value::Int(10));
        assert_eq!(stub.object().call("foo", args![]).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_config_default_validation() {
        let config = StubConfig {
            validate_arguments: false,
            strict_construction: false,
        };
        let stub = Stub::with_config(&object_to_stub(), &config).unwrap();
        stub.stubs(|s| s.call("add", args![1, 1])).unwrap().and_returns(0);

        assert_eq!(stub.object().call("add", args![5, 5]).unwrap(), Value::Int(0));
        assert!(stub
            .asserts_that(|s| s.call("add", args![9, 9]))
            .unwrap()
            .was_called());
    }

    #[test]
    fn test_with_arguments_reaches_constructor() {
        let class = ClassDescriptor::builder("Named")
            .constructor(|this, args| {
                this.set_field("name", args.arg(0).clone());
                Ok(())
            })
            .method("name", |this, _| Ok(this.field("name")))
            .build();

        let stub = Stub::with_arguments(&class, args!["teddy"]).unwrap();
        assert_eq!(stub.object().field("name"), Value::from("teddy"));
        assert_eq!(stub.object().call("name", args![]).unwrap(), Value::from("teddy"));
    }

    #[test]
    fn test_from_binding_rejects_non_classes() {
        assert!(matches!(
            Stub::from_binding(&Binding::Value(Value::Int(1))),
            Err(TeddyError::InvalidArgument(_))
        ));
        assert!(Stub::from_binding(&Binding::Class(object_to_stub())).is_ok());
    }
}
