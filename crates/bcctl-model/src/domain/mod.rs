mod tracking_id;
pub use tracking_id::{TRACKING_ID_FLAG, TrackingId};

mod exec_state;
pub use exec_state::ExecState;

mod exit_outcome;
pub use exit_outcome::ExitOutcome;

mod request;
pub use request::ExecutionRequest;

/// Logical name of a remote execution target (a group of hosts served by receivers).
pub type Target = String;
