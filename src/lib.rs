pub mod config;
pub mod logging;
pub mod mock;
pub mod runtime;
pub mod value;

use miette::Diagnostic;

pub use config::Config;
pub use mock::{
    AssertionHandle, CallRecord, GlobalOverride, GlobalStub, Stub, StubHandle, Substitute,
};
pub use runtime::{Binding, ClassDescriptor, Instance, NativeFunction, Namespace, Receiver};
pub use value::{Arguments, Value};

/// Result type alias for the mocking engine
pub type Result<T> = std::result::Result<T, TeddyError>;

/// Error types for the mocking engine
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum TeddyError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(teddy::invalid_argument),
        help("Stubs can only be built from constructible class descriptors. Abstract descriptors and non-class bindings are rejected.")
    )]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    #[diagnostic(
        code(teddy::invalid_state),
        help("Global replacements and global stubs must be created inside `GlobalOverride::create_scope`, and scopes cannot be nested.")
    )]
    InvalidState(String),

    #[error("Unknown method `{method}` on `{class}`")]
    #[diagnostic(
        code(teddy::unknown_method),
        help("Only methods declared on the class or one of its parents can be called.")
    )]
    UnknownMethod { class: String, method: String },

    #[error("Name `{0}` is not bound in this namespace")]
    #[diagnostic(code(teddy::unbound_name))]
    UnboundName(String),

    #[error("The closure passed to {0} did not call any method on the substitute")]
    #[diagnostic(
        code(teddy::nothing_touched),
        help("Call exactly one method inside the closure, e.g. `stub.stubs(|s| s.call(\"bar\", args![]))`.")
    )]
    NothingTouched(&'static str),

    #[error("{0}")]
    #[diagnostic(code(teddy::raised))]
    Raised(String),

    #[error("JSON error: {0}")]
    #[diagnostic(
        code(teddy::json),
        help("Argument lists are written as a JSON array. Example: '[\"Alice\", 1000]'.")
    )]
    Json(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(teddy::config),
        help("Check that the configuration file is valid TOML and accessible.")
    )]
    Config(String),
}

impl TeddyError {
    /// Failure raised by a method body or constructor.
    pub fn raised(message: impl Into<String>) -> Self {
        TeddyError::Raised(message.into())
    }
}

impl From<serde_json::Error> for TeddyError {
    fn from(err: serde_json::Error) -> Self {
        TeddyError::Json(err.to_string())
    }
}

impl From<toml::de::Error> for TeddyError {
    fn from(err: toml::de::Error) -> Self {
        TeddyError::Config(err.to_string())
    }
}
