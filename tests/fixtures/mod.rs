//! Class fixtures shared by the integration tests
//!
//! Each fixture builds a fresh `ClassDescriptor`, so tests never share
//! substitutes or namespaces by accident.
#![allow(dead_code)]

use std::sync::Arc;
use teddy_mocks::{ClassDescriptor, TeddyError, Value};

/// A class whose `foo` must never run and whose `bar` reads a field set by
/// the constructor
pub fn object_to_stub() -> Arc<ClassDescriptor> {
    ClassDescriptor::builder("ObjectToStub")
        .constructor(|this, _| {
            this.set_field("bar_val", Value::Int(-1));
            Ok(())
        })
        .method("foo", |_, _| Err(TeddyError::raised("Should not be called")))
        .method("bar", |this, _| Ok(this.field("bar_val")))
        .build()
}

/// Arithmetic with a running total
pub fn calculator() -> Arc<ClassDescriptor> {
    ClassDescriptor::builder("Calculator")
        .constructor(|this, _| {
            this.set_field("total", Value::Int(0));
            Ok(())
        })
        .method("add", |_, args| {
            Ok(Value::Int(int_arg(args, 0) + int_arg(args, 1)))
        })
        .method("accumulate", |this, args| {
            let total = this.field("total").as_int().unwrap_or(0) + int_arg(args, 0);
            this.set_field("total", Value::Int(total));
            Ok(Value::Int(total))
        })
        .method("total", |this, _| Ok(this.field("total")))
        .build()
}

/// A mailer that cannot actually send anything in tests
pub fn mailer() -> Arc<ClassDescriptor> {
    ClassDescriptor::builder("Mailer")
        .method("send", |_, args| {
            Err(TeddyError::raised(format!(
                "network unavailable, cannot send to {}",
                args.arg(0)
            )))
        })
        .method("outbox_size", |_, _| Ok(Value::Int(0)))
        .build()
}

fn int_arg(args: &teddy_mocks::Arguments, index: usize) -> i64 {
    args.arg(index).as_int().unwrap_or(0)
}
