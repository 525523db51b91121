use crate::domain::tts::{EngineKind, SynthesisError};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const STDERR_LIMIT: usize = 2000;

/// Run `command` with `input` on stdin and require a zero exit status.
/// The child is killed if the returned future is dropped.
pub async fn run_with_stdin(
    engine: EngineKind,
    mut command: Command,
    input: &str,
) -> Result<(), SynthesisError> {
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|e| SynthesisError::EngineProcessFailed {
        engine,
        code: None,
        stderr: format!("failed to start process: {}", e),
    })?;

    if let Some(mut stdin) = child.stdin.take() {
        // A process that exits early closes the pipe; its exit status tells the story
        if let Err(e) = stdin.write_all(input.as_bytes()).await {
            tracing::debug!(engine = %engine, error = %e, "Writing to engine stdin failed");
        }
    }

    let output = child.wait_with_output().await?;
    if output.status.success() {
        return Ok(());
    }

    let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.len() > STDERR_LIMIT {
        let cut = (0..=STDERR_LIMIT)
            .rev()
            .find(|i| stderr.is_char_boundary(*i))
            .unwrap_or(0);
        stderr.truncate(cut);
    }

    Err(SynthesisError::EngineProcessFailed {
        engine,
        code: output.status.code(),
        stderr,
    })
}
