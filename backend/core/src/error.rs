use thiserror::Error;

/// Errors surfaced by the command gateway to its callers.
#[derive(Debug, Error)]
pub enum WardenError {
    #[error(
        "no approval handler registered, cannot gate `{command}`; \
         the host must call set_approval_handler() during startup before running gated commands"
    )]
    NoHandler { command: String },

    #[error(
        "command `{command}` was denied by the operator (approval required: {reason}); \
         nothing was executed, re-issue the command to ask again or add it to the whitelist"
    )]
    Denied { command: String, reason: String },

    #[error("approval for `{command}` timed out after {timeout_secs}s without an answer")]
    ApprovalTimeout { command: String, timeout_secs: u64 },

    #[error("approval handler failed for `{command}`: {message}")]
    Handler { command: String, message: String },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Rejection reasons for a regular expression.
///
/// The `Dangerous` check works on the pattern text and only recognises a few
/// common catastrophic-backtracking shapes. It can reject harmless patterns and
/// it will miss others.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is {len} characters long, the limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error(
        "pattern looks prone to catastrophic backtracking ({signature}); \
         this is a best-effort heuristic, not a complete ReDoS check, \
         rewrite it without nested or chained quantifiers"
    )]
    Dangerous { signature: &'static str },

    #[error("invalid regular expression: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_message_names_command_and_reason() {
        let err = WardenError::Denied {
            command: "rm -rf /x".to_string(),
            reason: "destructive action".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("rm -rf /x"));
        assert!(msg.contains("destructive action"));
        assert!(msg.contains("nothing was executed"));
    }

    #[test]
    fn no_handler_message_is_actionable() {
        let err = WardenError::NoHandler {
            command: "reboot".to_string(),
        };
        assert!(err.to_string().contains("set_approval_handler"));
    }

    #[test]
    fn dangerous_pattern_message_admits_heuristic() {
        let err = PatternError::Dangerous {
            signature: "nested quantifier (...+)+",
        };
        assert!(err.to_string().contains("best-effort heuristic"));
    }
}
