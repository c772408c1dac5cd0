//! Read-only REST access to the full state of a target.

mod error;
pub use error::InfoError;

mod endpoint;
pub use endpoint::{DEFAULT_INFO_TIMEOUT, TargetInfoEndpoint};
