mod error;
pub use error::EventError;

mod status;
pub use status::{Event, EVENT_CALL_INFO, EVENT_CMD, EVENT_SERVICE_CHANGE, STATE_FAILED};

mod report;
pub use report::{CallInfo, ServiceChange};
