//! Coin exchanges that need an approver's sign-off

pub mod request;
pub mod workflow;

pub use request::{ApprovalRequest, ExchangeDirection, RequestStatus};
pub use workflow::{ConfirmationWorkflow, RequestSweep};
