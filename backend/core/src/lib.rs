pub mod error;
pub mod traits;
pub mod types;

pub use error::{PatternError, WardenError};
pub use traits::ApprovalHandler;
pub use types::{ApprovalRequest, ApprovalResponse, CommandVerdict, TimeoutAction};
