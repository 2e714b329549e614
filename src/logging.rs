//! Structured logging utilities for the mocking engine.
//!
//! This module provides helper functions for consistent, structured logging
//! across the engine using the `tracing` crate, and a subscriber setup for
//! test binaries that want to see them.

use crate::config::LoggingConfig;
use crate::value::Arguments;
use crate::TeddyError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` overrides the configured level. Returns `false` if a subscriber
/// was already installed, which is normal when several tests call this.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let level = config.level.as_deref().unwrap_or("info");
    let fallback_filter = format!("teddy_mocks={}", level);

    if config.json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| fallback_filter.clone().into()),
            )
            .with(json_layer)
            .try_init()
            .is_ok()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| fallback_filter.into()),
            )
            .with(fmt_layer)
            .try_init()
            .is_ok()
    }
}

/// Log substitute construction.
pub fn log_substitute_built(class: &str, methods: usize) {
    tracing::debug!(class, methods, "Substitute built");
}

/// Log a constructor failure that was swallowed while building a substitute.
pub fn log_construction_swallowed(class: &str, error: &TeddyError) {
    tracing::warn!(
        class,
        error = %error,
        "Original constructor failed while building substitute; continuing without it"
    );
}

/// Log a method being stubbed.
pub fn log_stub_configured(class: &str, method: &str, args: &Arguments, validate: bool) {
    tracing::debug!(
        class,
        method,
        arguments = %args,
        validate_arguments = validate,
        "Stub configured"
    );
}

/// Log an assertion query. `matches` is `None` for a method never touched.
pub fn log_assertion(class: &str, method: &str, args: &Arguments, matches: Option<usize>) {
    match matches {
        Some(count) => tracing::debug!(
            class,
            method,
            arguments = %args,
            matches = count,
            "Assertion evaluated"
        ),
        None => tracing::debug!(class, method, arguments = %args, "Assertion on untouched method"),
    }
}

/// Log an intercepted call.
pub fn log_call(class: &str, method: &str, args: &Arguments, stubbed: bool) {
    tracing::trace!(class, method, arguments = %args, stubbed, "Call intercepted");
}

/// Log a call to a method the class does not have.
pub fn log_unknown_method(class: &str, method: &str) {
    tracing::warn!(class, method, "Unknown method called on substitute");
}

/// Log a global override scope opening.
pub fn log_scope_opened() {
    tracing::debug!("Global override scope opened");
}

/// Log a global override scope closing.
pub fn log_scope_closed(restored: usize) {
    tracing::debug!(restored, "Global override scope closed");
}

/// Log a namespace binding being swapped.
pub fn log_binding_replaced(namespace: &str, name: &str, had_original: bool) {
    tracing::debug!(namespace, name, had_original, "Binding replaced");
}

/// Log a namespace binding being put back.
pub fn log_binding_restored(namespace: &str, name: &str) {
    tracing::debug!(namespace, name, "Binding restored");
}
