//! Approval orchestration. Decides whether a command needs a human, asks the
//! registered handler, and gates the caller's executor on the answer.
//!
//! Per command: Received → Classified → Allowed | PendingApproval, and
//! PendingApproval → Approved → Allowed | Denied → Aborted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use warden_config::{SecurityConfig, WardenConfig};
use warden_core::{
    ApprovalHandler, ApprovalRequest, ApprovalResponse, CommandVerdict, TimeoutAction, WardenError,
};
use warden_logging::{EventLogger, GatewayEvent};

use crate::classifier::classify;
use crate::whitelist::{WhitelistStore, is_read_only};

const REASON_SAFE: &str = "whitelisted/read-only";
const REASON_APPROVAL_DISABLED: &str = "approval disabled";

/// Runtime knobs for the orchestrator.
#[derive(Debug, Clone)]
pub struct ApprovalSettings {
    /// When false, nothing is gated.
    pub require_approval: bool,
    /// Default wait for the handler; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub timeout_action: TimeoutAction,
}

impl Default for ApprovalSettings {
    fn default() -> Self {
        Self {
            require_approval: true,
            timeout: None,
            timeout_action: TimeoutAction::Deny,
        }
    }
}

impl From<&SecurityConfig> for ApprovalSettings {
    fn from(config: &SecurityConfig) -> Self {
        Self {
            require_approval: config.require_approval,
            timeout: config.approval_timeout(),
            timeout_action: config.timeout_action,
        }
    }
}

/// The command gateway. Build one at startup and share it behind an `Arc`.
pub struct ApprovalService {
    whitelist: WhitelistStore,
    settings: ApprovalSettings,
    handler: RwLock<Option<Arc<dyn ApprovalHandler>>>,
    /// Held for the whole handler call so prompts never overlap.
    in_flight: Mutex<()>,
}

impl ApprovalService {
    pub fn new(whitelist: WhitelistStore, settings: ApprovalSettings) -> Self {
        if !settings.require_approval {
            warn!("Approval is disabled; every command will run without asking");
        }
        Self {
            whitelist,
            settings,
            handler: RwLock::new(None),
            in_flight: Mutex::new(()),
        }
    }

    /// Gateway backed by the configured whitelist file.
    pub fn from_config(config: &WardenConfig) -> Self {
        Self::new(
            WhitelistStore::from_path(&config.security.whitelist_path),
            ApprovalSettings::from(&config.security),
        )
    }

    pub fn whitelist(&self) -> &WhitelistStore {
        &self.whitelist
    }

    pub fn settings(&self) -> &ApprovalSettings {
        &self.settings
    }

    /// Install the handler, replacing any previous one.
    pub async fn set_approval_handler<H>(&self, handler: H)
    where
        H: ApprovalHandler + 'static,
    {
        let mut slot = self.handler.write().await;
        if slot.is_some() {
            debug!("Replacing registered approval handler");
        }
        *slot = Some(Arc::new(handler));
    }

    pub async fn clear_approval_handler(&self) {
        *self.handler.write().await = None;
    }

    pub async fn has_approval_handler(&self) -> bool {
        self.handler.read().await.is_some()
    }

    pub async fn is_whitelisted(&self, command: &str) -> bool {
        self.whitelist.is_whitelisted(command).await
    }

    /// Whitelist and read-only status take precedence over the destructive and
    /// sudo markers: `rm` on the whitelist runs without asking.
    pub async fn needs_approval(&self, command: &str) -> bool {
        if !self.settings.require_approval {
            return false;
        }
        let cmd = command.trim();
        !(self.whitelist.is_whitelisted(cmd).await || is_read_only(cmd))
    }

    /// Ask the handler using the configured default timeout.
    pub async fn request_approval(&self, command: &str) -> Result<ApprovalResponse, WardenError> {
        self.request_approval_with_timeout(command, self.settings.timeout)
            .await
    }

    /// Ask the handler, waiting at most `timeout` for an answer.
    ///
    /// Calls are serialized: a second request waits until the first one has
    /// been answered.
    pub async fn request_approval_with_timeout(
        &self,
        command: &str,
        timeout: Option<Duration>,
    ) -> Result<ApprovalResponse, WardenError> {
        let handler = self
            .handler
            .read()
            .await
            .clone()
            .ok_or_else(|| WardenError::NoHandler {
                command: command.to_string(),
            })?;

        let classification = classify(command);
        let request = ApprovalRequest {
            command: command.to_string(),
            reason: classification.reason,
            destructive: classification.destructive,
            requires_sudo: classification.requires_sudo,
        };

        let _turn = self.in_flight.lock().await;
        EventLogger::log_event(GatewayEvent::ApprovalRequested {
            command: request.command.clone(),
            reason: request.reason.clone(),
        });

        let outcome = match timeout {
            Some(limit) => match tokio::time::timeout(limit, handler.request(request)).await {
                Ok(outcome) => outcome,
                Err(_) => return self.on_timeout(command, limit),
            },
            None => handler.request(request).await,
        };

        let response = outcome.map_err(|e| WardenError::Handler {
            command: command.to_string(),
            message: format!("{e:#}"),
        })?;

        EventLogger::log_event(GatewayEvent::ApprovalDecided {
            command: command.to_string(),
            approved: response.approved,
        });
        Ok(response)
    }

    fn on_timeout(&self, command: &str, limit: Duration) -> Result<ApprovalResponse, WardenError> {
        warn!(command = %command, timeout_secs = limit.as_secs(), "Approval timed out");
        match self.settings.timeout_action {
            TimeoutAction::Deny => {
                EventLogger::log_event(GatewayEvent::ApprovalDecided {
                    command: command.to_string(),
                    approved: false,
                });
                Ok(ApprovalResponse::denied())
            }
            TimeoutAction::Error => Err(WardenError::ApprovalTimeout {
                command: command.to_string(),
                timeout_secs: limit.as_secs(),
            }),
        }
    }

    /// Run `executor` only if the command is safe or the operator approves it.
    ///
    /// A denial returns `WardenError::Denied` without touching `executor`.
    /// The executor's own result is passed through unchanged.
    pub async fn execute_with_approval<T, E, F, Fut>(
        &self,
        command: &str,
        executor: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<WardenError>,
    {
        if self.needs_approval(command).await {
            let response = self.request_approval(command).await?;
            if !response.approved {
                let reason = classify(command).reason;
                info!(command = %command, reason = %reason, "Command denied");
                return Err(WardenError::Denied {
                    command: command.to_string(),
                    reason,
                }
                .into());
            }
            info!(command = %command, "Command approved");
        } else {
            let reason = if self.settings.require_approval {
                REASON_SAFE
            } else {
                REASON_APPROVAL_DISABLED
            };
            EventLogger::log_event(GatewayEvent::Allowed {
                command: command.to_string(),
                reason: reason.to_string(),
            });
        }

        executor().await
    }

    /// Preview the gateway's decision without asking anyone.
    pub async fn validate_command(&self, command: &str) -> CommandVerdict {
        let needs_approval = self.needs_approval(command).await;
        let safe = self.whitelist.is_whitelisted(command).await || is_read_only(command);

        let reason = if needs_approval {
            classify(command).reason
        } else if safe {
            REASON_SAFE.to_string()
        } else {
            REASON_APPROVAL_DISABLED.to_string()
        };

        CommandVerdict {
            safe,
            needs_approval,
            reason,
        }
    }
}
