pub mod approval;
pub mod classifier;
pub mod pattern;
pub mod sanitize;
pub mod whitelist;

pub use approval::{ApprovalService, ApprovalSettings};
pub use classifier::{approval_reason, classify, is_destructive, requires_sudo, Classification};
pub use pattern::{compile_pattern, validate_pattern, MAX_PATTERN_LEN};
pub use sanitize::SanitizeError;
pub use whitelist::{
    is_read_only, ConfigLoadError, Whitelist, WhitelistConfig, WhitelistSource, WhitelistStore,
};
