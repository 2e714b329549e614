//! The mocking engine: substitutes, stubbing, assertions and global overrides.

pub mod assertions;
pub mod expectation;
pub mod global;
pub mod mode;
pub mod stub;
pub mod substitute;

pub use assertions::AssertionHandle;
pub use expectation::{Expectation, ReturnCallback};
pub use global::{GlobalOverride, GlobalStub};
pub use mode::Mode;
pub use stub::{Stub, StubHandle};
pub use substitute::{CallRecord, Substitute};
