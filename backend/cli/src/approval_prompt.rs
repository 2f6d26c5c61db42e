//! Interactive y/N approval on the controlling terminal.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use warden_core::{ApprovalHandler, ApprovalRequest, ApprovalResponse};

use crate::terminal_output::{paint, BOLD, RED, YELLOW};

/// Asks on stderr and reads the answer from stdin. Anything but `y`/`yes`
/// (including EOF) is a denial.
pub struct TerminalApprovalHandler;

#[async_trait]
impl ApprovalHandler for TerminalApprovalHandler {
    async fn request(&self, request: ApprovalRequest) -> Result<ApprovalResponse> {
        let mut input = BufReader::new(tokio::io::stdin());
        let mut output = tokio::io::stderr();
        let approved = ask(&request, &mut input, &mut output).await?;
        Ok(if approved {
            ApprovalResponse::approved()
        } else {
            ApprovalResponse::denied()
        })
    }
}

pub fn render_prompt(request: &ApprovalRequest) -> String {
    let mut prompt = format!(
        "\n{}\n  Command: {}\n  Reason:  {}\n",
        paint(BOLD, "Command requires approval"),
        request.command,
        request.reason
    );
    if request.destructive {
        prompt.push_str(&format!(
            "  {}\n",
            paint(RED, "This command is destructive and may not be reversible.")
        ));
    }
    if request.requires_sudo {
        prompt.push_str(&format!("  {}\n", paint(YELLOW, "This command requires root privileges.")));
    }
    prompt.push_str("Approve? [y/N] ");
    prompt
}

pub fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub async fn ask<R, W>(request: &ApprovalRequest, input: &mut R, output: &mut W) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output
        .write_all(render_prompt(request).as_bytes())
        .await
        .context("failed to write approval prompt")?;
    output.flush().await?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .await
        .context("failed to read approval answer")?;

    let approved = read > 0 && parse_answer(&line);
    debug!(command = %request.command, approved, "Terminal answer");
    Ok(approved)
}
