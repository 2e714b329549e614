/// Tests for scoped replacement of namespace bindings
mod fixtures;

use fixtures::{calculator, mailer};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use teddy_mocks::{
    args, Binding, GlobalOverride, GlobalStub, NativeFunction, Namespace, Receiver, Result,
    TeddyError, Value,
};

// Every test here touches the single process-wide scope.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Code under test: looks the mailer up by name on every call
fn send_report(ns: &Namespace, to: &str) -> Result<Value> {
    ns.construct("Mailer", args![])?.call("send", args![to])
}

#[test]
fn test_global_stub_requires_open_scope() {
    let _serial = serial();
    Namespace::global().bind("GlobalCalculator", calculator());

    let err = GlobalStub::new("GlobalCalculator").unwrap_err();
    assert!(matches!(err, TeddyError::InvalidState(_)));
    assert!(matches!(
        GlobalOverride::replace("GlobalCalculator", Namespace::global(), Value::Null),
        Err(TeddyError::InvalidState(_))
    ));

    Namespace::global().unbind("GlobalCalculator");
}

#[test]
fn test_global_stub_rejects_unbound_and_non_class_names() {
    let _serial = serial();
    let ns = Namespace::new("services");
    ns.bind("retries", Value::Int(3));

    GlobalOverride::create_scope(|| {
        assert!(matches!(
            GlobalStub::in_container("Missing", &ns),
            Err(TeddyError::UnboundName(name)) if name == "Missing"
        ));
        assert!(matches!(
            GlobalStub::in_container("retries", &ns),
            Err(TeddyError::InvalidArgument(_))
        ));
    })
    .unwrap();

    assert_eq!(ns.get("retries"), Some(Binding::Value(Value::Int(3))));
}

#[test]
fn test_global_stub_is_seen_by_code_resolving_by_name() {
    let _serial = serial();
    let ns = Namespace::new("services");
    ns.bind("Mailer", mailer());
    assert!(send_report(&ns, "ops@example.com").is_err());

    GlobalOverride::create_scope(|| {
        let stub = GlobalStub::in_container("Mailer", &ns).unwrap();
        stub.stubs_with(|s| s.call("send", args![""]), false)
            .unwrap()
            .and_returns(true);

        assert_eq!(send_report(&ns, "ops@example.com").unwrap(), Value::Bool(true));
        assert!(stub
            .asserts_that(|s| s.call("send", args!["ops@example.com"]))
            .unwrap()
            .was_called());

        // A second matching call reaches the original through the forwarder.
        assert!(send_report(&ns, "dev@example.com").is_err());
        stub.clear_recorded_methods();
        assert_eq!(send_report(&ns, "dev@example.com").unwrap(), Value::Bool(true));

        assert_eq!(stub.name(), "Mailer");
        assert!(stub.container().same_table(&ns));
    })
    .unwrap();

    assert!(send_report(&ns, "ops@example.com").is_err());
}

#[test]
fn test_global_stub_in_global_namespace() {
    let _serial = serial();
    Namespace::global().bind("SharedCalculator", calculator());

    GlobalOverride::create_scope(|| {
        let stub = GlobalStub::new("SharedCalculator").unwrap();
        stub.stubs(|s| s.call("total", args![])).unwrap().and_returns(77);

        let calc = Namespace::global()
            .construct("SharedCalculator", args![])
            .unwrap();
        assert_eq!(calc.call("total", args![]).unwrap(), Value::Int(77));
        assert_eq!(calc.call("add", args![2, 3]).unwrap(), Value::Int(5));
    })
    .unwrap();

    let calc = Namespace::global()
        .construct("SharedCalculator", args![])
        .unwrap();
    assert_eq!(calc.call("total", args![]).unwrap(), Value::Int(0));
    Namespace::global().unbind("SharedCalculator");
}

#[test]
fn test_replaced_functions_are_restored() {
    let _serial = serial();
    let ns = Namespace::new("clock");
    ns.bind("now", NativeFunction::new("now", |_| Ok(Value::Int(1))));

    let seen = GlobalOverride::create_scope(|| {
        GlobalOverride::replace(
            "now",
            &ns,
            NativeFunction::new("now", |_| Ok(Value::Int(42))),
        )
        .unwrap();
        ns.invoke("now", args![]).unwrap()
    })
    .unwrap();

    assert_eq!(seen, Value::Int(42));
    assert_eq!(ns.invoke("now", args![]).unwrap(), Value::Int(1));
}

#[test]
fn test_bindings_restored_when_body_returns_error() {
    let _serial = serial();
    let ns = Namespace::new("services");
    ns.bind("Mailer", mailer());
    let original = ns.get("Mailer");

    let result: Result<Result<()>> = GlobalOverride::create_scope(|| {
        let _stub = GlobalStub::in_container("Mailer", &ns)?;
        GlobalOverride::replace("extra", &ns, Value::from("temporary"))?;
        Err(TeddyError::raised("test body failed"))
    });

    assert!(matches!(result, Ok(Err(TeddyError::Raised(_)))));
    assert_eq!(ns.get("Mailer"), original);
    assert!(!ns.contains("extra"));
    assert!(!GlobalOverride::is_open());
}

#[test]
fn test_bindings_restored_when_body_panics() {
    let _serial = serial();
    let ns = Namespace::new("services");
    ns.bind("Mailer", mailer());
    let original = ns.get("Mailer");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = GlobalOverride::create_scope(|| {
            let _stub = GlobalStub::in_container("Mailer", &ns).unwrap();
            panic!("test body panicked");
        });
    }));

    assert!(outcome.is_err());
    assert_eq!(ns.get("Mailer"), original);
    assert!(!GlobalOverride::is_open());

    // A fresh scope opens normally afterwards.
    assert!(GlobalOverride::create_scope(|| ()).is_ok());
}

#[test]
fn test_scopes_do_not_nest() {
    let _serial = serial();

    let inner = GlobalOverride::create_scope(|| {
        assert!(GlobalOverride::is_open());
        GlobalOverride::create_scope(|| ())
    })
    .unwrap();

    assert!(matches!(inner, Err(TeddyError::InvalidState(_))));
    assert!(!GlobalOverride::is_open());
}
