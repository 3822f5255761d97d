//! The playback engine task and its public handle
//!
//! A single spawned task owns the queue, the local playback session, the
//! stream session, and the one decoder slot shared by both modes. Commands
//! from HTTP handlers arrive on an mpsc channel and are answered over
//! oneshot channels; decoder stdout/stderr/EOF and the start-timeout timer
//! arrive as [`PlayerEvent`]s on a second channel. Both feed the same loop,
//! so every mutation is serialized and every snapshot is consistent.

use crate::config::Config;
use crate::library;
use crate::playback::queue::TrackQueue;
use crate::playback::state::{PlaybackSnapshot, StreamSnapshot, StreamStatus};
use crate::playback::supervisor::{ActiveDecoder, DecoderKind, PlayerEvent};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Requests into the engine task.
enum EngineCommand {
    Enqueue {
        track: String,
        reply: oneshot::Sender<Result<usize>>,
    },
    RemoveAt {
        index: usize,
        reply: oneshot::Sender<()>,
    },
    Play {
        reply: oneshot::Sender<()>,
    },
    Next {
        reply: oneshot::Sender<()>,
    },
    Previous {
        reply: oneshot::Sender<()>,
    },
    TogglePause {
        reply: oneshot::Sender<Result<bool>>,
    },
    AdjustVolume {
        up: bool,
        reply: oneshot::Sender<()>,
    },
    LoadQueue {
        tracks: Vec<String>,
        reply: oneshot::Sender<usize>,
    },
    Playback {
        reply: oneshot::Sender<PlaybackSnapshot>,
    },
    PlayStation {
        name: String,
        url: String,
        reply: oneshot::Sender<()>,
    },
    StopStream {
        reply: oneshot::Sender<()>,
    },
    Stream {
        reply: oneshot::Sender<StreamSnapshot>,
    },
}

/// Handle to the engine task. Cheap to clone; all methods go through the
/// command channel, so callers never touch engine state directly.
#[derive(Clone)]
pub struct PlaybackEngine {
    commands: mpsc::UnboundedSender<EngineCommand>,
}

impl PlaybackEngine {
    /// Spawn the engine task and return its handle.
    pub fn start(config: Arc<Config>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = EngineTask {
            config,
            queue: TrackQueue::new(),
            session: LocalSession::default(),
            stream: StreamSnapshot::default(),
            active: None,
            next_attempt: 0,
            event_tx,
        };
        tokio::spawn(task.run(command_rx, event_rx));
        Self {
            commands: command_tx,
        }
    }

    /// Validate and append a track to the queue. Returns the queue length.
    pub async fn enqueue(&self, track: String) -> Result<usize> {
        self.request(|reply| EngineCommand::Enqueue { track, reply })
            .await?
    }

    /// Remove the queue entry at `index`; out-of-range is a no-op.
    pub async fn remove_at(&self, index: usize) -> Result<()> {
        self.request(|reply| EngineCommand::RemoveAt { index, reply })
            .await
    }

    /// Start queue playback. No-op when already playing or the queue is
    /// empty. Returns before the decoder has necessarily started; poll
    /// [`playback`](Self::playback).
    pub async fn play(&self) -> Result<()> {
        self.request(|reply| EngineCommand::Play { reply }).await
    }

    /// Skip to the next queued track.
    pub async fn next(&self) -> Result<()> {
        self.request(|reply| EngineCommand::Next { reply }).await
    }

    /// Restart the interrupted track (re-queues it at the front first).
    pub async fn previous(&self) -> Result<()> {
        self.request(|reply| EngineCommand::Previous { reply }).await
    }

    /// Send the decoder its pause toggle. Returns the optimistic paused
    /// state, or `InvalidState` when nothing is playing.
    pub async fn toggle_pause(&self) -> Result<bool> {
        self.request(|reply| EngineCommand::TogglePause { reply })
            .await?
    }

    pub async fn volume_up(&self) -> Result<()> {
        self.request(|reply| EngineCommand::AdjustVolume { up: true, reply })
            .await
    }

    pub async fn volume_down(&self) -> Result<()> {
        self.request(|reply| EngineCommand::AdjustVolume { up: false, reply })
            .await
    }

    /// Replace the pending queue with a loaded playlist. Entries that no
    /// longer resolve inside the music root are dropped with a warning.
    /// Returns how many tracks were loaded.
    pub async fn load_queue(&self, tracks: Vec<String>) -> Result<usize> {
        self.request(|reply| EngineCommand::LoadQueue { tracks, reply })
            .await
    }

    /// Consistent snapshot of the local playback session.
    pub async fn playback(&self) -> Result<PlaybackSnapshot> {
        self.request(|reply| EngineCommand::Playback { reply }).await
    }

    /// Start a radio stream, superseding any live decoder.
    pub async fn play_station(&self, name: String, url: String) -> Result<()> {
        self.request(|reply| EngineCommand::PlayStation { name, url, reply })
            .await
    }

    /// Stop the radio stream if one is active.
    pub async fn stop_stream(&self) -> Result<()> {
        self.request(|reply| EngineCommand::StopStream { reply })
            .await
    }

    /// Consistent snapshot of the stream session.
    pub async fn stream(&self) -> Result<StreamSnapshot> {
        self.request(|reply| EngineCommand::Stream { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> EngineCommand,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .map_err(|_| Error::Internal("playback engine unavailable".to_string()))?;
        rx.await
            .map_err(|_| Error::Internal("playback engine unavailable".to_string()))
    }
}

/// Local (file-queue) playback session state.
#[derive(Debug, Default)]
struct LocalSession {
    now_playing: Option<String>,
    is_playing: bool,
    is_paused: bool,
    playback_started: bool,
    last_error: Option<String>,
}

/// The engine task: exclusive owner of all playback state.
struct EngineTask {
    config: Arc<Config>,
    queue: TrackQueue,
    session: LocalSession,
    stream: StreamSnapshot,
    /// The single decoder slot, shared by file and stream playback
    active: Option<ActiveDecoder>,
    /// Monotonic spawn counter; events from older attempts are discarded
    next_attempt: u64,
    event_tx: mpsc::UnboundedSender<PlayerEvent>,
}

impl EngineTask {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<EngineCommand>,
        mut events: mpsc::UnboundedReceiver<PlayerEvent>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    // every handle dropped: daemon is shutting down
                    None => break,
                },
                Some(event) = events.recv() => self.handle_event(event).await,
            }
        }
        self.stop_active().await;
    }

    // ── command handling ────────────────────────────────────────────────

    async fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Enqueue { track, reply } => {
                let result =
                    library::validate_track(&self.config.music_dir, &track).map(|_| {
                        info!(%track, "enqueued");
                        self.queue.enqueue(track)
                    });
                let _ = reply.send(result);
            }
            EngineCommand::RemoveAt { index, reply } => {
                self.queue.remove_at(index);
                let _ = reply.send(());
            }
            EngineCommand::Play { reply } => {
                if !self.session.is_playing && !self.queue.is_empty() {
                    self.clear_active_slot().await;
                    self.advance().await;
                }
                let _ = reply.send(());
            }
            EngineCommand::Next { reply } => {
                if self.local_decoder_active() {
                    self.stop_active().await;
                    self.session.is_playing = false;
                    self.advance().await;
                }
                let _ = reply.send(());
            }
            EngineCommand::Previous { reply } => {
                if self.local_decoder_active() {
                    if let Some(current) = self.session.now_playing.take() {
                        self.queue.push_front(current);
                    }
                    self.stop_active().await;
                    self.session.is_playing = false;
                    self.advance().await;
                }
                let _ = reply.send(());
            }
            EngineCommand::TogglePause { reply } => {
                let result = if self.local_decoder_active() {
                    // one toggle line both directions; the decoder owns the
                    // real pause state, we track it optimistically
                    self.send_control("pause").await;
                    self.session.is_paused = !self.session.is_paused;
                    Ok(self.session.is_paused)
                } else {
                    Err(Error::InvalidState("nothing is playing".to_string()))
                };
                let _ = reply.send(result);
            }
            EngineCommand::AdjustVolume { up, reply } => {
                if self.local_decoder_active() {
                    let line = if up { "volume +10" } else { "volume -10" };
                    self.send_control(line).await;
                }
                let _ = reply.send(());
            }
            EngineCommand::LoadQueue { tracks, reply } => {
                let valid: Vec<String> = tracks
                    .into_iter()
                    .filter(|track| {
                        match library::validate_track(&self.config.music_dir, track) {
                            Ok(_) => true,
                            Err(_) => {
                                warn!(%track, "dropping unresolvable playlist entry");
                                false
                            }
                        }
                    })
                    .collect();
                let count = valid.len();
                self.queue.replace(valid);
                info!(tracks = count, "queue loaded from playlist");
                let _ = reply.send(count);
            }
            EngineCommand::Playback { reply } => {
                let _ = reply.send(self.snapshot());
            }
            EngineCommand::PlayStation { name, url, reply } => {
                self.play_station(name, url).await;
                let _ = reply.send(());
            }
            EngineCommand::StopStream { reply } => {
                if matches!(
                    self.active.as_ref().map(|a| a.kind),
                    Some(DecoderKind::Stream)
                ) {
                    self.stop_active().await;
                }
                self.stream = StreamSnapshot::default();
                let _ = reply.send(());
            }
            EngineCommand::Stream { reply } => {
                let _ = reply.send(self.stream.clone());
            }
        }
    }

    // ── decoder event handling ──────────────────────────────────────────

    async fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Stdout { attempt, line } => {
                if !self.is_current(attempt) {
                    return;
                }
                debug!(%line, "[decoder]");
                if line.contains(&self.config.start_marker) {
                    self.mark_started();
                }
            }
            PlayerEvent::Stderr { attempt, line } => {
                if !self.is_current(attempt) {
                    return;
                }
                match self.active.as_ref().map(|a| a.kind) {
                    Some(DecoderKind::Queue) => {
                        warn!(%line, "decoder stderr");
                        self.session.last_error = Some(line);
                    }
                    _ => debug!(%line, "stream decoder stderr"),
                }
            }
            PlayerEvent::StdoutClosed { attempt } => {
                if !self.is_current(attempt) {
                    return;
                }
                let active = self.active.take().expect("current attempt implies a decoder");
                let kind = active.kind;
                let status = active.reap().await;
                debug!(attempt, ?status, "decoder exited");
                match kind {
                    DecoderKind::Queue => {
                        self.session.is_playing = false;
                        self.advance().await;
                    }
                    DecoderKind::Stream => {
                        info!(station = ?self.stream.station, "stream ended");
                        self.stream = StreamSnapshot::default();
                    }
                }
            }
            PlayerEvent::StartTimeout { attempt } => {
                if !self.is_current(attempt) {
                    return;
                }
                if self.local_decoder_active() && !self.session.playback_started {
                    let track = self.session.now_playing.clone().unwrap_or_default();
                    let message = format!(
                        "No playback started within {} seconds for {}",
                        self.config.start_timeout_secs, track
                    );
                    warn!("{message}");
                    self.session.last_error = Some(message);
                }
            }
        }
    }

    /// Start-marker seen on the current decoder's stdout.
    fn mark_started(&mut self) {
        match self.active.as_ref().map(|a| a.kind) {
            Some(DecoderKind::Queue) => {
                if !self.session.playback_started {
                    self.session.playback_started = true;
                    self.session.last_error = None;
                    info!(track = ?self.session.now_playing, "playback started");
                }
            }
            Some(DecoderKind::Stream) => {
                if self.stream.status != StreamStatus::Playing {
                    self.stream.status = StreamStatus::Playing;
                    info!(station = ?self.stream.station, "stream playing");
                }
            }
            None => {}
        }
    }

    // ── transitions ─────────────────────────────────────────────────────

    /// Pop the next queued track and start its decoder; with an empty queue,
    /// settle into idle. A track whose decoder fails to spawn is recorded in
    /// `last_error` and skipped, so the engine never sticks mid-transition.
    async fn advance(&mut self) {
        loop {
            let Some(track) = self.queue.pop_front() else {
                self.session.now_playing = None;
                self.session.is_playing = false;
                self.session.is_paused = false;
                self.session.playback_started = false;
                info!("queue empty, playback idle");
                return;
            };

            self.session.last_error = None;
            self.session.playback_started = false;
            self.session.is_paused = false;
            self.session.now_playing = Some(track.clone());
            self.session.is_playing = true;

            let target = self.config.music_dir.join(&track);
            self.next_attempt += 1;
            let attempt = self.next_attempt;
            match ActiveDecoder::spawn(
                &self.config.player_command,
                &self.config.file_args,
                &target.to_string_lossy(),
                attempt,
                DecoderKind::Queue,
                self.event_tx.clone(),
            ) {
                Ok(active) => {
                    info!(%track, attempt, "now playing");
                    self.active = Some(active);
                    self.schedule_start_timeout(attempt);
                    return;
                }
                Err(e) => {
                    warn!(%track, error = %e, "failed to start decoder");
                    self.session.last_error =
                        Some(format!("Failed to start decoder for {track}: {e}"));
                    self.session.is_playing = false;
                    // behaves like an immediate exit: try the next track
                }
            }
        }
    }

    /// Tear down any live stream process and start the new station.
    async fn play_station(&mut self, name: String, url: String) {
        self.clear_active_slot().await;
        self.next_attempt += 1;
        let attempt = self.next_attempt;
        match ActiveDecoder::spawn(
            &self.config.player_command,
            &self.config.stream_args,
            &url,
            attempt,
            DecoderKind::Stream,
            self.event_tx.clone(),
        ) {
            Ok(active) => {
                info!(%name, %url, attempt, "stream starting");
                self.active = Some(active);
                self.stream = StreamSnapshot {
                    station: Some(name),
                    status: StreamStatus::Idle,
                };
            }
            Err(e) => {
                warn!(%name, error = %e, "failed to start stream decoder");
                self.stream = StreamSnapshot {
                    station: Some(name),
                    status: StreamStatus::Error,
                };
            }
        }
    }

    /// Enforce the exclusive decoder slot before switching modes: terminate
    /// whatever is live and reset its session. No auto-advance: the killed
    /// mode was superseded, not finished.
    async fn clear_active_slot(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let kind = active.kind;
        active.terminate().await;
        match kind {
            DecoderKind::Queue => {
                info!("file playback superseded");
                self.session.now_playing = None;
                self.session.is_playing = false;
                self.session.is_paused = false;
                self.session.playback_started = false;
            }
            DecoderKind::Stream => {
                info!(station = ?self.stream.station, "stream superseded");
                self.stream = StreamSnapshot::default();
            }
        }
    }

    // ── helpers ─────────────────────────────────────────────────────────

    fn is_current(&self, attempt: u64) -> bool {
        self.active.as_ref().map(|a| a.attempt) == Some(attempt)
    }

    fn local_decoder_active(&self) -> bool {
        matches!(self.active.as_ref().map(|a| a.kind), Some(DecoderKind::Queue))
    }

    async fn send_control(&mut self, line: &str) {
        if let Some(active) = self.active.as_mut() {
            active.send_line(line).await;
        }
    }

    async fn stop_active(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(attempt = active.attempt, "terminating decoder");
            active.terminate().await;
        }
    }

    fn schedule_start_timeout(&self, attempt: u64) {
        let events = self.event_tx.clone();
        let timeout = Duration::from_secs(self.config.start_timeout_secs);
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = events.send(PlayerEvent::StartTimeout { attempt });
        });
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            now_playing: self.session.now_playing.clone(),
            is_playing: self.session.is_playing,
            is_paused: self.session.is_paused,
            playback_started: self.session.playback_started,
            last_error: self.session.last_error.clone(),
            queue: self.queue.to_vec(),
        }
    }
}
