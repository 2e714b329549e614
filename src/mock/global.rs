//! Scoped replacement of namespace bindings.
//!
//! At most one [`GlobalOverride`] scope is open per process. Every binding
//! replaced while it is open is put back, newest first, when the scope
//! closes, whether the body returned normally, returned an error or panicked.

use super::stub::Stub;
use super::substitute::Substitute;
use crate::logging;
use crate::runtime::{lock, Binding, ClassBuilder, ClassDescriptor, Namespace};
use crate::{Result, TeddyError};
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

struct ReplacedBinding {
    container: Namespace,
    name: String,
    original: Option<Binding>,
}

/// `None` while no scope is open
static ACTIVE_SCOPE: Mutex<Option<Vec<ReplacedBinding>>> = Mutex::new(None);

/// Process-wide window for swapping namespace bindings
pub struct GlobalOverride;

impl GlobalOverride {
    /// Open the scope, run `body`, then restore every replaced binding.
    ///
    /// Fails with `InvalidState` if a scope is already open; scopes do not nest.
    pub fn create_scope<R>(body: impl FnOnce() -> R) -> Result<R> {
        let _scope = ScopeGuard::open()?;
        Ok(body())
    }

    pub fn is_open() -> bool {
        lock(&ACTIVE_SCOPE).is_some()
    }

    /// Bind `name` in `container` to `replacement` until the scope closes
    pub fn replace(
        name: &str,
        container: &Namespace,
        replacement: impl Into<Binding>,
    ) -> Result<()> {
        let mut scope = lock(&ACTIVE_SCOPE);
        let replaced = scope.as_mut().ok_or_else(|| {
            TeddyError::InvalidState(format!(
                "cannot replace `{}` outside of GlobalOverride::create_scope",
                name
            ))
        })?;

        let original = container.bind(name, replacement);
        logging::log_binding_replaced(container.label(), name, original.is_some());
        replaced.push(ReplacedBinding {
            container: container.clone(),
            name: name.to_string(),
            original,
        });
        Ok(())
    }
}

struct ScopeGuard;

impl ScopeGuard {
    fn open() -> Result<Self> {
        let mut scope = lock(&ACTIVE_SCOPE);
        if scope.is_some() {
            return Err(TeddyError::InvalidState(
                "a global override scope is already open".to_string(),
            ));
        }
        *scope = Some(Vec::new());
        logging::log_scope_opened();
        Ok(ScopeGuard)
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let replaced = lock(&ACTIVE_SCOPE).take().unwrap_or_default();
        let restored = replaced.len();

        for binding in replaced.into_iter().rev() {
            match binding.original {
                Some(original) => {
                    binding.container.bind(&binding.name, original);
                }
                None => {
                    binding.container.unbind(&binding.name);
                }
            }
            logging::log_binding_restored(binding.container.label(), &binding.name);
        }
        logging::log_scope_closed(restored);
    }
}

/// A stub installed in place of a class bound in a namespace.
///
/// The namespace gets a synthesized class of the same name whose methods
/// forward to this stub's substitute, so code that constructs the class by
/// name reaches the same stubbed behavior and recorded calls. Only valid
/// inside [`GlobalOverride::create_scope`]; the original class is restored
/// when the scope closes.
pub struct GlobalStub {
    name: String,
    container: Namespace,
    stub: Stub,
}

impl GlobalStub {
    /// Stub a class bound in the global namespace
    pub fn new(name: &str) -> Result<Self> {
        Self::in_container(name, Namespace::global())
    }

    pub fn in_container(name: &str, container: &Namespace) -> Result<Self> {
        if !GlobalOverride::is_open() {
            return Err(TeddyError::InvalidState(format!(
                "cannot stub global `{}` outside of GlobalOverride::create_scope",
                name
            )));
        }

        let original = container
            .get(name)
            .ok_or_else(|| TeddyError::UnboundName(name.to_string()))?;
        let stub = Stub::from_binding(&original)?;

        let forwarding = forwarding_class(name, stub.object());
        GlobalOverride::replace(name, container, forwarding)?;

        Ok(Self {
            name: name.to_string(),
            container: container.clone(),
            stub,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container(&self) -> &Namespace {
        &self.container
    }

    pub fn stub(&self) -> &Stub {
        &self.stub
    }
}

impl Deref for GlobalStub {
    type Target = Stub;

    fn deref(&self) -> &Stub {
        &self.stub
    }
}

impl fmt::Debug for GlobalStub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalStub")
            .field("name", &self.name)
            .field("container", &self.container.label())
            .field("stub", &self.stub)
            .finish()
    }
}

/// A class named `name` whose constructor does nothing and whose methods
/// delegate to `target`
fn forwarding_class(name: &str, target: &Arc<Substitute>) -> Arc<ClassDescriptor> {
    let mut builder = ClassBuilder::new(name);
    for method in target.method_names() {
        let target = Arc::clone(target);
        let forwarded = method.clone();
        builder = builder.method(method, move |_, args| target.call(&forwarded, args.clone()));
    }
    builder.build()
}
