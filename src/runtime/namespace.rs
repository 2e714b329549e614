use super::class::ClassDescriptor;
use super::object::Instance;
use crate::value::{Arguments, Value};
use crate::{Result, TeddyError};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Body of a free function bound in a namespace
pub type FunctionBody = Arc<dyn Fn(&Arguments) -> Result<Value> + Send + Sync>;

/// A named free function
#[derive(Clone)]
pub struct NativeFunction {
    name: Arc<str>,
    body: FunctionBody,
}

impl NativeFunction {
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &Arguments) -> Result<Value> {
        (self.body)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// What a name in a [`Namespace`] resolves to
#[derive(Clone, Debug)]
pub enum Binding {
    Class(Arc<ClassDescriptor>),
    Function(NativeFunction),
    Value(Value),
}

impl Binding {
    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Class(_) => "class",
            Binding::Function(_) => "function",
            Binding::Value(_) => "value",
        }
    }

    pub fn as_class(&self) -> Option<&Arc<ClassDescriptor>> {
        match self {
            Binding::Class(class) => Some(class),
            _ => None,
        }
    }
}

/// Classes and functions compare by identity, plain values by shallow equality
impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Binding::Class(a), Binding::Class(b)) => Arc::ptr_eq(a, b),
            (Binding::Function(a), Binding::Function(b)) => {
                Arc::as_ptr(&a.body) as *const () == Arc::as_ptr(&b.body) as *const ()
            }
            (Binding::Value(a), Binding::Value(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Arc<ClassDescriptor>> for Binding {
    fn from(class: Arc<ClassDescriptor>) -> Self {
        Binding::Class(class)
    }
}

impl From<NativeFunction> for Binding {
    fn from(function: NativeFunction) -> Self {
        Binding::Function(function)
    }
}

impl From<Value> for Binding {
    fn from(value: Value) -> Self {
        Binding::Value(value)
    }
}

/// Indirection table from names to bindings.
///
/// Code under test resolves constructors and free functions through a
/// namespace (usually [`Namespace::global`]) instead of naming them directly,
/// which is what lets a global override swap them for the duration of a scope.
/// Clones share the same table.
#[derive(Clone)]
pub struct Namespace {
    label: Arc<str>,
    bindings: Arc<RwLock<HashMap<String, Binding>>>,
}

impl Namespace {
    pub fn new(label: &str) -> Self {
        Self {
            label: Arc::from(label),
            bindings: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The ambient process-wide namespace
    pub fn global() -> &'static Namespace {
        static GLOBAL: OnceLock<Namespace> = OnceLock::new();
        GLOBAL.get_or_init(|| Namespace::new("global"))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Binding>> {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Binding>> {
        self.bindings.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, name: &str) -> Option<Binding> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Bind `name`, returning whatever it was bound to before
    pub fn bind(&self, name: &str, binding: impl Into<Binding>) -> Option<Binding> {
        self.write().insert(name.to_string(), binding.into())
    }

    pub fn unbind(&self, name: &str) -> Option<Binding> {
        self.write().remove(name)
    }

    /// All bound names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Instantiate the class bound to `name`
    pub fn construct(&self, name: &str, args: Arguments) -> Result<Arc<Instance>> {
        match self.get(name) {
            Some(Binding::Class(class)) => Instance::new(&class, args),
            Some(other) => Err(TeddyError::InvalidArgument(format!(
                "`{}` is bound to a {} in namespace `{}`, not a class",
                name,
                other.kind(),
                self.label
            ))),
            None => Err(TeddyError::UnboundName(name.to_string())),
        }
    }

    /// Call the free function bound to `name`
    pub fn invoke(&self, name: &str, args: Arguments) -> Result<Value> {
        match self.get(name) {
            Some(Binding::Function(function)) => function.call(&args),
            Some(other) => Err(TeddyError::InvalidArgument(format!(
                "`{}` is bound to a {} in namespace `{}`, not a function",
                name,
                other.kind(),
                self.label
            ))),
            None => Err(TeddyError::UnboundName(name.to_string())),
        }
    }

    pub fn same_table(&self, other: &Namespace) -> bool {
        Arc::ptr_eq(&self.bindings, &other.bindings)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("label", &self.label)
            .field("names", &self.names())
            .finish()
    }
}
