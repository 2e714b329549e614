use super::expectation::{Expectation, SharedExpectation};
use super::mode::{Mode, ModeState, Touched};
use crate::logging;
use crate::runtime::object::Fields;
use crate::runtime::{lock, ClassDescriptor, Method, Receiver};
use crate::value::{Arguments, Value};
use crate::{Result, TeddyError};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// One call observed by a substitute, in call order across all methods
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CallRecord {
    pub method: String,
    pub arguments: Arguments,
    /// Whether the call was answered by a stubbed value instead of the original
    pub stubbed: bool,
}

/// Mode, expectation table and call log, guarded together
#[derive(Debug, Default)]
pub(crate) struct DispatchState {
    pub(crate) mode: ModeState,
    expectations: HashMap<String, SharedExpectation>,
    call_log: Vec<CallRecord>,
}

impl DispatchState {
    fn expectation_for(&mut self, method: &str) -> SharedExpectation {
        Arc::clone(
            self.expectations
                .entry(method.to_string())
                .or_insert_with(|| Expectation::new().shared()),
        )
    }
}

/// Stands in for one method of the original class
struct Interceptor {
    method: String,
    original: Method,
}

impl Interceptor {
    fn dispatch(&self, owner: &Substitute, args: Arguments) -> Result<Value> {
        let mut state = lock(&owner.state);
        let validate = state.mode.validate_arguments;

        match state.mode.mode {
            Mode::ConfiguringStub => {
                let expectation = state.expectation_for(&self.method);
                lock(&expectation).configure(args.clone(), validate);
                logging::log_stub_configured(owner.class.name(), &self.method, &args, validate);
                state.mode.touched = Touched::Expectation {
                    method: self.method.clone(),
                    expectation,
                    match_count: 0,
                };
                Ok(Value::Undefined)
            }
            Mode::Asserting => {
                state.mode.touched = match state.expectations.get(&self.method).cloned() {
                    Some(expectation) => {
                        let match_count = lock(&expectation).evaluate(&args, validate);
                        logging::log_assertion(
                            owner.class.name(),
                            &self.method,
                            &args,
                            Some(match_count),
                        );
                        Touched::Expectation {
                            method: self.method.clone(),
                            expectation,
                            match_count,
                        }
                    }
                    None => {
                        logging::log_assertion(owner.class.name(), &self.method, &args, None);
                        Touched::Untouched {
                            method: self.method.clone(),
                        }
                    }
                };
                Ok(Value::Undefined)
            }
            Mode::Idle => {
                let expectation = state.expectation_for(&self.method);
                let reply = {
                    let mut expectation = lock(&expectation);
                    expectation.record(args.clone());
                    expectation.stubbed_reply(&args)
                };
                state.call_log.push(CallRecord {
                    method: self.method.clone(),
                    arguments: args.clone(),
                    stubbed: reply.is_some(),
                });
                drop(state);

                logging::log_call(owner.class.name(), &self.method, &args, reply.is_some());
                match reply {
                    Some(reply) => Ok(reply.produce(&args)),
                    None => {
                        let receiver: &dyn Receiver = owner;
                        (self.original)(receiver, &args)
                    }
                }
            }
        }
    }
}

/// The synthesized stand-in for an instance of a class.
///
/// Every member of the class is wired to an interceptor that records the
/// call and either answers with stubbed behavior or runs the original method
/// with the substitute as receiver. No lock is held while original methods
/// or return callbacks run, so they may call back into the substitute.
pub struct Substitute {
    class: Arc<ClassDescriptor>,
    fields: Fields,
    interceptors: HashMap<String, Interceptor>,
    state: Mutex<DispatchState>,
}

impl Substitute {
    /// Build a substitute for `class` and run the original constructor on it.
    ///
    /// Constructor failures are logged and swallowed unless
    /// `strict_construction` is set; some constructors cannot run outside
    /// their normal construction path.
    pub(crate) fn build(
        class: &Arc<ClassDescriptor>,
        args: Arguments,
        strict_construction: bool,
    ) -> Result<Arc<Substitute>> {
        if !class.is_constructible() {
            return Err(TeddyError::InvalidArgument(format!(
                "class `{}` is abstract; stubs need a constructible class",
                class.name()
            )));
        }

        // Enumerate every member before wiring any of them.
        let members = class.callable_members();
        let mut interceptors = HashMap::with_capacity(members.len());
        for name in &members {
            if let Some(original) = class.find_method(name) {
                interceptors.insert(
                    name.clone(),
                    Interceptor {
                        method: name.clone(),
                        original: Arc::clone(original),
                    },
                );
            }
        }

        let substitute = Arc::new(Substitute {
            class: Arc::clone(class),
            fields: Fields::default(),
            interceptors,
            state: Mutex::new(DispatchState::default()),
        });
        logging::log_substitute_built(class.name(), members.len());

        if let Err(err) = class.construct_on(&*substitute, &args) {
            if strict_construction {
                return Err(err);
            }
            logging::log_construction_swallowed(class.name(), &err);
        }

        Ok(substitute)
    }

    /// Call a method through its interceptor
    pub fn call(&self, method: &str, args: Arguments) -> Result<Value> {
        match self.interceptors.get(method) {
            Some(interceptor) => interceptor.dispatch(self, args),
            None => {
                logging::log_unknown_method(self.class.name(), method);
                Err(TeddyError::UnknownMethod {
                    class: self.class.name().to_string(),
                    method: method.to_string(),
                })
            }
        }
    }

    pub fn class(&self) -> &Arc<ClassDescriptor> {
        &self.class
    }

    /// Names of the intercepted methods, in the class's member order
    pub fn method_names(&self) -> Vec<String> {
        self.class
            .callable_members()
            .into_iter()
            .filter(|name| self.interceptors.contains_key(name))
            .collect()
    }

    pub fn mode(&self) -> Mode {
        lock(&self.state).mode.mode
    }

    /// Arguments of every recorded call to `method`, oldest first
    pub fn recorded_calls(&self, method: &str) -> Vec<Arguments> {
        let state = lock(&self.state);
        state
            .expectations
            .get(method)
            .map(|expectation| lock(expectation).recorded_calls().to_vec())
            .unwrap_or_default()
    }

    /// Whether `method` currently has stubbed behavior
    pub fn is_stubbed(&self, method: &str) -> bool {
        let state = lock(&self.state);
        state
            .expectations
            .get(method)
            .is_some_and(|expectation| lock(expectation).is_configured())
    }

    pub fn call_log(&self) -> Vec<CallRecord> {
        lock(&self.state).call_log.clone()
    }

    pub(crate) fn with_mode<R>(&self, f: impl FnOnce(&mut ModeState) -> R) -> R {
        f(&mut lock(&self.state).mode)
    }

    pub(crate) fn clear_configuration(&self) {
        let state = lock(&self.state);
        for expectation in state.expectations.values() {
            lock(expectation).clear_configuration();
        }
    }

    pub(crate) fn clear_recorded(&self) {
        let mut state = lock(&self.state);
        for expectation in state.expectations.values() {
            lock(expectation).clear_recorded();
        }
        state.call_log.clear();
    }
}

impl Receiver for Substitute {
    fn class(&self) -> &Arc<ClassDescriptor> {
        &self.class
    }

    fn field(&self, name: &str) -> Value {
        self.fields.get(name)
    }

    fn set_field(&self, name: &str, value: Value) {
        self.fields.set(name, value);
    }

    fn call(&self, method: &str, args: Arguments) -> Result<Value> {
        Substitute::call(self, method, args)
    }
}

impl fmt::Debug for Substitute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substitute")
            .field("class", &self.class.name())
            .field("methods", &self.method_names())
            .field("mode", &self.mode())
            .finish()
    }
}
