//! # Execution Engine Adapter
//!
//! The orchestrator reaches the execution engine only through `Executor`.
//! `SubprocessExecutor` is the production implementation: it runs an
//! external engine command with the pin file path as its last argument.
//!
//! Engine contract:
//! - stdout carries exactly one JSON run record, buffered up to a size limit
//! - stderr carries free-form progress in any encoding, relayed line by line
//!   as it arrives and drained until EOF
//! - the engine's own exit status is not an invocation failure; only a
//!   launch failure or an undecodable run record is
//!
//! There is no timeout. If the engine hangs, the evaluation hangs.

use reppl_core::primitives::MAX_RUN_RECORD_SIZE;
use reppl_core::{ReppError, RunRecord, run_record_from_bytes};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Prefix for relayed engine stderr lines.
pub const ENGINE_LOG_PREFIX: &str = "│ reppl eval >\t";

/// Prefix for the echoed run record.
pub const RUN_RECORD_PREFIX: &str = "│ reppl eval ∴⟩\t";

/// Something that can execute a pinned formula.
#[allow(async_fn_in_trait)]
pub trait Executor {
    /// Execute the pinned formula stored at `pin_file` and return its run
    /// record, unstamped.
    async fn run(&mut self, pin_file: &Path) -> Result<RunRecord, ReppError>;
}

/// Runs the engine as a child process.
#[derive(Debug, Clone)]
pub struct SubprocessExecutor {
    program: String,
    args: Vec<String>,
    output_limit: usize,
}

impl SubprocessExecutor {
    /// Build from a command line: program followed by leading arguments.
    pub fn new(command: &[String]) -> Result<Self, ReppError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ReppError::Usage("engine command is empty".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            output_limit: MAX_RUN_RECORD_SIZE,
        })
    }

    /// Cap how many bytes of engine stdout are kept.
    #[must_use]
    pub fn with_output_limit(mut self, bytes: usize) -> Self {
        self.output_limit = bytes;
        self
    }
}

async fn relay_lines(stream: impl AsyncRead + Unpin) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&line);
        eprintln!(
            "{}{}",
            ENGINE_LOG_PREFIX,
            text.trim_end_matches(['\n', '\r'])
        );
    }
}

/// Keep at most `limit` bytes of `stream`, discarding the rest so the writer
/// never blocks. Returns the kept bytes and how many were discarded.
async fn capture_bounded(
    mut stream: impl AsyncRead + Unpin,
    limit: usize,
) -> std::io::Result<(Vec<u8>, u64)> {
    let mut kept = Vec::new();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX);
    (&mut stream).take(cap).read_to_end(&mut kept).await?;
    let discarded = tokio::io::copy(&mut stream, &mut tokio::io::sink()).await?;
    Ok((kept, discarded))
}

impl Executor for SubprocessExecutor {
    async fn run(&mut self, pin_file: &Path) -> Result<RunRecord, ReppError> {
        tracing::debug!(
            program = %self.program,
            pin_file = %pin_file.display(),
            "launching engine"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(pin_file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReppError::Engine(format!("could not start {:?}: {}", self.program, e))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReppError::Engine("engine stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReppError::Engine("engine stderr not captured".to_string()))?;

        let (captured, relayed) = tokio::join!(
            capture_bounded(stdout, self.output_limit),
            relay_lines(stderr)
        );
        let (buffer, discarded) =
            captured.map_err(|e| ReppError::Engine(format!("reading engine output: {}", e)))?;
        if let Err(e) = relayed {
            tracing::warn!("engine stderr relay stopped: {}", e);
        }

        let status = child
            .wait()
            .await
            .map_err(|e| ReppError::Engine(format!("waiting for engine: {}", e)))?;
        if !status.success() {
            tracing::warn!(%status, "engine exited unsuccessfully");
        }
        if discarded > 0 {
            return Err(ReppError::Engine(format!(
                "engine output exceeds {} bytes",
                self.output_limit
            )));
        }

        let text = String::from_utf8_lossy(&buffer);
        for line in text.trim().lines() {
            eprintln!("{}{}", RUN_RECORD_PREFIX, line);
        }

        run_record_from_bytes(&buffer).map_err(|e| ReppError::Engine(e.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
