use super::class::ClassDescriptor;
use super::lock;
use crate::value::{Arguments, Value};
use crate::{Result, TeddyError};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Anything methods can be called on: a real [`Instance`] or a
/// [`Substitute`](crate::mock::Substitute) standing in for one.
///
/// Code under test should accept `&dyn Receiver` so either can be passed.
pub trait Receiver: Send + Sync {
    /// The class whose method set this object exposes
    fn class(&self) -> &Arc<ClassDescriptor>;

    /// Read an instance field; `Undefined` if it was never set
    fn field(&self, name: &str) -> Value;

    fn set_field(&self, name: &str, value: Value);

    /// Call a method by name
    fn call(&self, method: &str, args: Arguments) -> Result<Value>;
}

/// Per-object field storage
#[derive(Debug, Default)]
pub(crate) struct Fields(Mutex<BTreeMap<String, Value>>);

impl Fields {
    pub(crate) fn get(&self, name: &str) -> Value {
        lock(&self.0).get(name).cloned().unwrap_or(Value::Undefined)
    }

    pub(crate) fn set(&self, name: &str, value: Value) {
        lock(&self.0).insert(name.to_string(), value);
    }
}

/// A live object built from a [`ClassDescriptor`]
pub struct Instance {
    class: Arc<ClassDescriptor>,
    fields: Fields,
}

impl Instance {
    /// Allocate an object and run the constructor chain on it
    pub fn new(class: &Arc<ClassDescriptor>, args: Arguments) -> Result<Arc<Instance>> {
        if !class.is_constructible() {
            return Err(TeddyError::InvalidArgument(format!(
                "class `{}` is abstract and cannot be instantiated",
                class.name()
            )));
        }

        let instance = Arc::new(Instance {
            class: Arc::clone(class),
            fields: Fields::default(),
        });
        class.construct_on(&*instance, &args)?;
        Ok(instance)
    }
}

impl Receiver for Instance {
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
        let body = self
            .class
            .find_method(method)
            .cloned()
            .ok_or_else(|| TeddyError::UnknownMethod {
                class: self.class.name().to_string(),
                method: method.to_string(),
            })?;
        let receiver: &dyn Receiver = self;
        body(receiver, &args)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name())
            .field("fields", &self.fields)
            .finish()
    }
}
