//! Decoder process supervision
//!
//! Spawns the external decoder with piped stdio and turns its output into
//! events on the engine's channel. Every spawn gets an attempt number; events
//! carry it so the engine can discard anything from a superseded process.
//!
//! The child is spawned with `kill_on_drop` so an engine teardown can never
//! leak a running decoder.

use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Which playback mode the live decoder belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderKind {
    /// Local file from the play queue
    Queue,
    /// Internet radio stream
    Stream,
}

/// Events delivered from decoder I/O tasks (and the start-timeout timer)
/// into the engine loop.
#[derive(Debug)]
pub enum PlayerEvent {
    /// A line of decoder standard output
    Stdout { attempt: u64, line: String },
    /// A line of decoder standard error
    Stderr { attempt: u64, line: String },
    /// Decoder stdout reached EOF: the process has exited (or is exiting)
    StdoutClosed { attempt: u64 },
    /// The deferred start-timeout check fired
    StartTimeout { attempt: u64 },
}

/// Handle to the single live decoder process.
///
/// Owned by the engine task; at most one exists at a time.
pub struct ActiveDecoder {
    pub attempt: u64,
    pub kind: DecoderKind,
    child: Child,
    stdin: ChildStdin,
}

impl ActiveDecoder {
    /// Spawn the decoder bound to `target` (absolute file path or stream
    /// URL). Stdout and stderr reader tasks forward every line to `events`
    /// tagged with `attempt`, followed by [`PlayerEvent::StdoutClosed`] when
    /// the output pipe closes.
    pub fn spawn(
        command: &str,
        args: &[String],
        target: &str,
        attempt: u64,
        kind: DecoderKind,
        events: mpsc::UnboundedSender<PlayerEvent>,
    ) -> std::io::Result<Self> {
        let mut child = Command::new(command)
            .args(args)
            .arg(target)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        debug!(command, target, attempt, ?kind, "spawned decoder");

        let stdin = child.stdin.take().expect("decoder stdin was piped");
        let stdout = child.stdout.take().expect("decoder stdout was piped");
        let stderr = child.stderr.take().expect("decoder stderr was piped");

        let out_events = events.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if out_events
                            .send(PlayerEvent::Stdout { attempt, line })
                            .is_err()
                        {
                            return;
                        }
                    }
                    // EOF and read errors both mean the pipe is gone; either
                    // way the engine must observe the exit
                    Ok(None) | Err(_) => break,
                }
            }
            let _ = out_events.send(PlayerEvent::StdoutClosed { attempt });
        });

        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if events.send(PlayerEvent::Stderr { attempt, line }).is_err() {
                    return;
                }
            }
        });

        Ok(Self {
            attempt,
            kind,
            child,
            stdin,
        })
    }

    /// Write one control line (`pause`, `volume +10`, ...) to the decoder's
    /// stdin. Fire-and-forget: a write failure is logged, never surfaced.
    pub async fn send_line(&mut self, line: &str) {
        let result = async {
            self.stdin.write_all(line.as_bytes()).await?;
            self.stdin.write_all(b"\n").await?;
            self.stdin.flush().await
        }
        .await;
        if let Err(e) = result {
            warn!(attempt = self.attempt, error = %e, "decoder command write failed");
        }
    }

    /// Kill the decoder and reap it. Used for stop, skip, and supersede;
    /// SIGKILL delivery and the reap both complete promptly.
    pub async fn terminate(mut self) {
        if let Err(e) = self.child.kill().await {
            warn!(attempt = self.attempt, error = %e, "decoder kill failed");
        }
    }

    /// Reap a decoder whose stdout has closed. Normally the process has
    /// already exited and the wait returns immediately; a decoder that closed
    /// stdout but lingers is killed after a short grace period.
    pub async fn reap(mut self) -> Option<std::process::ExitStatus> {
        match tokio::time::timeout(std::time::Duration::from_secs(2), self.child.wait()).await {
            Ok(Ok(status)) => Some(status),
            Ok(Err(e)) => {
                warn!(attempt = self.attempt, error = %e, "decoder wait failed");
                None
            }
            Err(_) => {
                warn!(attempt = self.attempt, "decoder lingered after stdout EOF, killing");
                let _ = self.child.kill().await;
                None
            }
        }
    }
}
