mod messages;
mod types;

pub use messages::{ErrorReply, Frame, OkReply, Reply, Request, StatusCounts, StatusEvent};
pub use types::{BranchName, ErrorCode, GoblinId, GoblinStatus, GoblinSummary, SessionName};
