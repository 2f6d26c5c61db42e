use std::process::{ExitCode, ExitStatus, Stdio};
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::process::{Child, Command};
use tracing::info;

use warden_core::WardenError;
use warden_logging::{EventLogger, GatewayEvent};
use warden_safety::ApprovalService;

use crate::terminal_output::{note_error, note_warn};

/// Argument-vector processes, each stage's stdout feeding the next stage's
/// stdin. Nothing passes through a shell, so the rendered text that gets
/// gated is exactly what runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Vec<String>>,
}

impl Pipeline {
    pub fn new(argv: Vec<String>) -> Self {
        Self { stages: vec![argv] }
    }

    pub fn pipe(mut self, argv: Vec<String>) -> Self {
        self.stages.push(argv);
        self
    }

    pub fn stages(&self) -> &[Vec<String>] {
        &self.stages
    }

    /// Shell-like rendering used for classification and logs. Arguments with
    /// anything outside a conservative set are single-quoted.
    pub fn render(&self) -> String {
        self.stages
            .iter()
            .map(|argv| argv.iter().map(|a| quote_arg(a)).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    async fn spawn_and_wait(&self) -> Result<ExitStatus> {
        let last = self.stages.len().saturating_sub(1);
        let mut children: Vec<Child> = Vec::with_capacity(self.stages.len());
        let mut upstream: Option<Stdio> = None;

        for (i, argv) in self.stages.iter().enumerate() {
            let (program, args) = argv.split_first().context("empty command")?;
            let mut command = Command::new(program);
            command.args(args);
            if let Some(stdin) = upstream.take() {
                command.stdin(stdin);
            }
            if i < last {
                command.stdout(Stdio::piped());
            }

            let mut child = command
                .spawn()
                .with_context(|| format!("failed to start '{program}'"))?;
            if i < last {
                let stdout = child.stdout.take().context("stage output was not captured")?;
                let piped = TryInto::<Stdio>::try_into(stdout)
                    .context("failed to connect pipeline stages")?;
                upstream = Some(piped);
            }
            children.push(child);
        }

        let mut status = None;
        for mut child in children {
            status = Some(child.wait().await?);
        }
        status.context("empty command")
    }
}

fn quote_arg(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

pub async fn run(service: &ApprovalService, argv: Vec<String>) -> Result<ExitCode> {
    execute(service, "exec", &Pipeline::new(argv)).await
}

/// Gate the rendered pipeline, run it with inherited stdio, and map the
/// outcome to an exit code. A denial exits 1 without starting anything.
pub async fn execute(service: &ApprovalService, tool: &str, pipeline: &Pipeline) -> Result<ExitCode> {
    let command = pipeline.render();
    let started = Instant::now();
    let result = service
        .execute_with_approval(&command, || pipeline.spawn_and_wait())
        .await;

    match result {
        Ok(status) => {
            EventLogger::log_event(GatewayEvent::ToolExecuted {
                tool: tool.to_string(),
                arguments_json: serde_json::json!({ "argv": pipeline.stages() }).to_string(),
                duration_ms: Some(started.elapsed().as_millis() as u64),
            });
            info!(command = %command, status = %status, "Command finished");
            Ok(ExitCode::from(exit_status(status.code())))
        }
        Err(e) => {
            EventLogger::log_event(GatewayEvent::ToolFailed {
                tool: tool.to_string(),
                error_msg: format!("{e:#}"),
            });
            match e.downcast_ref::<WardenError>() {
                Some(WardenError::Denied { .. }) => {
                    note_warn(&e.to_string());
                    Ok(ExitCode::FAILURE)
                }
                Some(_) => {
                    note_error(&e.to_string());
                    Ok(ExitCode::FAILURE)
                }
                None => Err(e),
            }
        }
    }
}

/// Killed-by-signal has no code; report it as a generic failure.
fn exit_status(code: Option<i32>) -> u8 {
    code.and_then(|c| u8::try_from(c).ok()).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use warden_core::{ApprovalRequest, ApprovalResponse};
    use warden_safety::{ApprovalSettings, WhitelistConfig, WhitelistStore};

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    async fn denying_service() -> (ApprovalService, Arc<AtomicUsize>) {
        let service = ApprovalService::new(
            WhitelistStore::from_config(WhitelistConfig::default()),
            ApprovalSettings::default(),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        service
            .set_approval_handler(move |_req: ApprovalRequest| {
                seen.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, anyhow::Error>(ApprovalResponse::denied()) }
            })
            .await;
        (service, calls)
    }

    #[test]
    fn exit_statuses() {
        assert_eq!(exit_status(Some(0)), 0);
        assert_eq!(exit_status(Some(3)), 3);
        assert_eq!(exit_status(Some(300)), 1);
        assert_eq!(exit_status(None), 1);
    }

    #[test]
    fn render_quotes_shell_syntax() {
        let pipeline = Pipeline::new(argv(&["tail", "-n", "50", "/var/log/syslog"]))
            .pipe(argv(&["grep", "-E", "it's|failed"]));
        assert_eq!(
            pipeline.render(),
            r"tail -n 50 /var/log/syslog | grep -E 'it'\''s|failed'"
        );
        assert_eq!(Pipeline::new(argv(&["ls", "/x;", "touch"])).render(), "ls '/x;' touch");
    }

    #[tokio::test]
    async fn chained_mutation_in_arguments_never_runs() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let marker_arg = marker.to_string_lossy().to_string();
        let (service, calls) = denying_service().await;

        // Separators are plain arguments to `ls`, which is read-only.
        let split = Pipeline::new(argv(&["ls", "/nonexistent_dir;", "touch", &marker_arg]));
        execute(&service, "exec", &split).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!marker.exists());

        // A whole shell line as one argument renders quoted, so it is not
        // mistaken for `ls` and goes to the handler.
        let joined = Pipeline::new(vec![format!("ls /nonexistent_dir; touch {marker_arg}")]);
        execute(&service, "exec", &joined).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn denied_mutation_is_not_started() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let (service, calls) = denying_service().await;

        let touch = Pipeline::new(vec!["touch".to_string(), marker.to_string_lossy().to_string()]);
        execute(&service, "exec", &touch).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn pipeline_feeds_stdout_to_next_stage() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        std::fs::write(&log, "ok\nfailed once\n").unwrap();
        let log = log.to_string_lossy().to_string();
        let (service, _) = denying_service().await;

        let pipeline = Pipeline::new(argv(&["cat", &log]))
            .pipe(argv(&["grep", "-q", "failed"]));
        assert_eq!(pipeline.spawn_and_wait().await.unwrap().code(), Some(0));

        let missing = Pipeline::new(argv(&["cat", &log]))
            .pipe(argv(&["grep", "-q", "absent"]));
        assert_eq!(missing.spawn_and_wait().await.unwrap().code(), Some(1));

        // `cat` is read-only, so the gate lets the pipeline through.
        execute(&service, "exec", &pipeline).await.unwrap();
    }
}
