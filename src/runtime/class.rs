use super::object::Receiver;
use crate::value::{Arguments, Value};
use crate::Result;
use std::fmt;
use std::sync::Arc;

/// Body of a method: receives the object it was called on and the call's arguments
pub type Method = Arc<dyn Fn(&dyn Receiver, &Arguments) -> Result<Value> + Send + Sync>;

/// Body of a constructor, run once against a freshly allocated object
pub type Constructor = Arc<dyn Fn(&dyn Receiver, &Arguments) -> Result<()> + Send + Sync>;

/// Runtime description of a class: its name, parent, constructor and methods.
///
/// Descriptors are immutable once built and shared behind an `Arc`; bindings
/// in a [`Namespace`](super::Namespace) and substitutes both point at them.
pub struct ClassDescriptor {
    name: String,
    parent: Option<Arc<ClassDescriptor>>,
    constructor: Option<Constructor>,
    methods: Vec<(String, Method)>,
    constructible: bool,
}

impl ClassDescriptor {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<ClassDescriptor>> {
        self.parent.as_ref()
    }

    /// Abstract descriptors can describe a method set but never be instantiated
    pub fn is_constructible(&self) -> bool {
        self.constructible
    }

    /// Resolve a method on this class or the nearest parent that declares it
    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|(method_name, _)| method_name == name)
            .map(|(_, method)| method)
            .or_else(|| self.parent.as_ref().and_then(|p| p.find_method(name)))
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.find_method(name).is_some()
    }

    /// Every callable member name: own methods in declaration order, then
    /// inherited ones that are not overridden.
    pub fn callable_members(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.iter().map(|(n, _)| n.clone()).collect();
        if let Some(parent) = &self.parent {
            for inherited in parent.callable_members() {
                if !names.contains(&inherited) {
                    names.push(inherited);
                }
            }
        }
        names
    }

    /// Run the constructor chain against `receiver`. A class without its own
    /// constructor falls back to its parent's.
    pub(crate) fn construct_on(&self, receiver: &dyn Receiver, args: &Arguments) -> Result<()> {
        match (&self.constructor, &self.parent) {
            (Some(constructor), _) => constructor(receiver, args),
            (None, Some(parent)) => parent.construct_on(receiver, args),
            (None, None) => Ok(()),
        }
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("methods", &self.callable_members())
            .field("constructible", &self.constructible)
            .finish()
    }
}

/// Builder for [`ClassDescriptor`]
pub struct ClassBuilder {
    name: String,
    parent: Option<Arc<ClassDescriptor>>,
    constructor: Option<Constructor>,
    methods: Vec<(String, Method)>,
    constructible: bool,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            constructor: None,
            methods: Vec::new(),
            constructible: true,
        }
    }

    pub fn extends(mut self, parent: &Arc<ClassDescriptor>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    pub fn constructor<F>(mut self, body: F) -> Self
    where
        F: Fn(&dyn Receiver, &Arguments) -> Result<()> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(body));
        self
    }

    /// Declare a method. Declaring the same name twice replaces the earlier
    /// body but keeps its position.
    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&dyn Receiver, &Arguments) -> Result<Value> + Send + Sync + 'static,
    {
        self.insert_method(name.into(), Arc::new(body));
        self
    }

    pub(crate) fn insert_method(&mut self, name: String, body: Method) {
        match self.methods.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = body,
            None => self.methods.push((name, body)),
        }
    }

    pub fn abstract_class(mut self) -> Self {
        self.constructible = false;
        self
    }

    pub fn build(self) -> Arc<ClassDescriptor> {
        Arc::new(ClassDescriptor {
            name: self.name,
            parent: self.parent,
            constructor: self.constructor,
            methods: self.methods,
            constructible: self.constructible,
        })
    }
}
