use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{ApprovalRequest, ApprovalResponse};

/// Presents an approval request to a human and returns their decision.
///
/// Implemented by the host UI (terminal prompt, desktop dialog, chat button).
/// Async closures returning `anyhow::Result<ApprovalResponse>` implement it too.
#[async_trait]
pub trait ApprovalHandler: Send + Sync {
    async fn request(&self, request: ApprovalRequest) -> Result<ApprovalResponse>;
}

#[async_trait]
impl<F, Fut> ApprovalHandler for F
where
    F: Fn(ApprovalRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApprovalResponse>> + Send + 'static,
{
    async fn request(&self, request: ApprovalRequest) -> Result<ApprovalResponse> {
        (self)(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closures_are_handlers() {
        let handler = |req: ApprovalRequest| async move {
            Ok::<_, anyhow::Error>(ApprovalResponse {
                approved: !req.destructive,
                timestamp: chrono::Utc::now(),
            })
        };
        let resp = handler
            .request(ApprovalRequest {
                command: "reboot".to_string(),
                reason: "destructive action".to_string(),
                destructive: true,
                requires_sudo: false,
            })
            .await
            .unwrap();
        assert!(!resp.approved);
    }
}
