//! Domain types shared by the broadcast execution controller.
//!
//! - [`Event`]: a status event as published by a remote receiver through the relay;
//! - [`ExecutionRequest`]: what is asked of the remote receiver, and how long to wait for it;
//! - [`ExecState`]: the protocol state of one tracked execution;
//! - [`ExitOutcome`]: the single terminal result surfaced at the process boundary.

mod domain;
pub use domain::*;

mod event;
pub use event::*;
