//! Host environment model: classes, objects and namespaces.
//!
//! The mocking engine intercepts calls on objects described here. A
//! [`ClassDescriptor`] lists a class's callable members, an [`Instance`] is a
//! live object, and a [`Namespace`] maps names to bindings so code under test
//! can be redirected by a global override.

pub mod class;
pub mod namespace;
pub mod object;

pub use class::{ClassBuilder, ClassDescriptor, Constructor, Method};
pub use namespace::{Binding, FunctionBody, NativeFunction, Namespace};
pub use object::{Instance, Receiver};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a panicking test poisoned it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
