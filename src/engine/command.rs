use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::RenderEngine;
use crate::error::{Result, TexPilotError};

/// Render engine that pipes the document through a shell command.
///
/// The command reads LaTeX on stdin and writes HTML on stdout. The argument
/// string is exposed as `TEX_PILOT_ARGS` so wrappers can forward it.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    command: String,
}

impl CommandEngine {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl RenderEngine for CommandEngine {
    async fn render(&self, input: &str, args: &str) -> Result<String> {
        debug!(command = %self.command, args, "Running render command");

        let mut child = Command::new("sh")
            .args(["-c", &self.command])
            .env("TEX_PILOT_ARGS", args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TexPilotError::engine(format!("failed to start engine: {}", e)))?;

        let stdin = child.stdin.take();
        let feed = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            stdin.write_all(input.as_bytes()).await?;
            stdin.shutdown().await
        };

        // Output is drained while stdin is fed so a full pipe cannot stall either side.
        let (written, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        // Commands may exit without reading stdin; the exit status decides.
        if let Err(e) = written
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(e.into());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("engine exited with {}", output.status)
            } else {
                stderr
            };
            return Err(TexPilotError::Engine(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_render_pipes_stdin_to_stdout() {
        let engine = CommandEngine::new("cat");
        let output = engine.render("Hello $x$", "").await.unwrap();
        assert_eq!(output, "Hello $x$");
    }

    #[tokio::test]
    async fn test_args_exposed_in_environment() {
        let engine = CommandEngine::new("printf '%s' \"$TEX_PILOT_ARGS\"");
        let output = engine.render("", "--to html5").await.unwrap();
        assert_eq!(output, "--to html5");
    }

    #[tokio::test]
    async fn test_failure_carries_stderr() {
        let engine = CommandEngine::new("echo 'Stack space overflow' >&2; exit 3");
        let err = engine.render("x", "").await.unwrap_err();
        assert_eq!(err.raw_message(), "Stack space overflow");
    }

    #[tokio::test]
    async fn test_render_input_larger_than_pipe_buffer() {
        let engine = CommandEngine::new("cat");
        let input = "a".repeat(1_000_000);
        let output = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            engine.render(&input, ""),
        )
        .await
        .expect("large input must not stall the pipes")
        .unwrap();
        assert_eq!(output.len(), input.len());
    }
}
