use crate::session::traits::{AudioTransport, LoadId, TransportError};
use crate::session::types::{
    PlaybackMode, Queue, RepeatMode, SessionNotice, SessionSnapshot, SessionState,
};
use crate::{GatewayEndpoint, LikedSongs, StorageError, StreamMode, Track, TrackId};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    TransportError(#[from] TransportError),
    #[error(transparent)]
    StorageError(#[from] StorageError),
    #[error("Session engine is not running")]
    EngineStopped,
}

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

enum Command {
    PlayTrack {
        track: Track,
        playlist: Option<Vec<Track>>,
        reply: Reply<()>,
    },
    TogglePlayPause {
        reply: Reply<()>,
    },
    Next {
        reply: Reply<()>,
    },
    Previous {
        reply: Reply<()>,
    },
    ShufflePlay {
        playlist: Vec<Track>,
        reply: Reply<()>,
    },
    SetRepeatMode(RepeatMode),
    SetShuffle(bool),
    ToggleLike {
        track: Track,
        reply: Reply<bool>,
    },
    IsLiked {
        track_id: TrackId,
        reply: oneshot::Sender<bool>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Seek {
        position: Duration,
        reply: Reply<()>,
    },
    TrackFinished {
        track_id: TrackId,
        load_id: LoadId,
    },
}

/// Cloneable front of a running [`SessionEngine`].
///
/// Every call is queued into the engine mailbox, so commands from the UI
/// and end-of-track events from the transport are applied one at a time in
/// arrival order.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    async fn request<T>(
        &self,
        make_command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();

        self.commands
            .send(make_command(reply))
            .map_err(|_| SessionError::EngineStopped)?;

        response.await.map_err(|_| SessionError::EngineStopped)
    }

    pub async fn play_track(
        &self,
        track: Track,
        playlist: Option<Vec<Track>>,
    ) -> Result<(), SessionError> {
        self.request(|reply| Command::PlayTrack {
            track,
            playlist,
            reply,
        })
        .await?
    }

    pub async fn toggle_play_pause(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::TogglePlayPause { reply })
            .await?
    }

    pub async fn next(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Next { reply }).await?
    }

    pub async fn previous(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Previous { reply }).await?
    }

    pub async fn shuffle_play(&self, playlist: Vec<Track>) -> Result<(), SessionError> {
        self.request(|reply| Command::ShufflePlay { playlist, reply })
            .await?
    }

    pub fn set_repeat_mode(&self, repeat: RepeatMode) -> Result<(), SessionError> {
        self.send(Command::SetRepeatMode(repeat))
    }

    pub fn set_shuffle(&self, shuffle: bool) -> Result<(), SessionError> {
        self.send(Command::SetShuffle(shuffle))
    }

    /// Returns whether the track is liked after the toggle.
    pub async fn toggle_like(&self, track: Track) -> Result<bool, SessionError> {
        self.request(|reply| Command::ToggleLike { track, reply })
            .await?
    }

    pub async fn is_liked(&self, track_id: TrackId) -> Result<bool, SessionError> {
        self.request(|reply| Command::IsLiked { track_id, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// No-op while nothing is loaded.
    pub async fn seek(&self, position: Duration) -> Result<(), SessionError> {
        self.request(|reply| Command::Seek { position, reply })
            .await?
    }

    /// Called by the transport when the source loaded under `load_id` played
    /// to its end.
    pub fn track_finished(
        &self,
        track_id: TrackId,
        load_id: LoadId,
    ) -> Result<(), SessionError> {
        self.send(Command::TrackFinished { track_id, load_id })
    }

    fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .map_err(|_| SessionError::EngineStopped)
    }
}

/// Owns the queue, playback mode and the transport.
pub struct SessionEngine {
    commands: mpsc::UnboundedReceiver<Command>,
    transport: Box<dyn AudioTransport>,
    endpoint: GatewayEndpoint,
    liked_songs: Arc<LikedSongs>,
    liked_ids: HashSet<TrackId>,
    notices: Option<mpsc::UnboundedSender<SessionNotice>>,
    queue: Queue,
    mode: PlaybackMode,
    state: SessionState,
    load_counter: u64,
    loaded: Option<LoadId>,
}

impl SessionEngine {
    pub fn new(
        transport: Box<dyn AudioTransport>,
        endpoint: GatewayEndpoint,
        liked_songs: Arc<LikedSongs>,
        notices: Option<mpsc::UnboundedSender<SessionNotice>>,
    ) -> (Self, SessionHandle) {
        let (sender, commands) = mpsc::unbounded_channel();

        let engine = Self {
            commands,
            transport,
            endpoint,
            liked_songs,
            liked_ids: HashSet::new(),
            notices,
            queue: Queue::default(),
            mode: PlaybackMode::default(),
            state: SessionState::Idle,
            load_counter: 0,
            loaded: None,
        };

        (engine, SessionHandle { commands: sender })
    }

    pub fn spawn(
        transport: Box<dyn AudioTransport>,
        endpoint: GatewayEndpoint,
        liked_songs: Arc<LikedSongs>,
        notices: Option<mpsc::UnboundedSender<SessionNotice>>,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (engine, handle) = Self::new(transport, endpoint, liked_songs, notices);

        (handle, tokio::spawn(engine.run()))
    }

    /// Runs until every handle has been dropped.
    pub async fn run(mut self) {
        match self.liked_songs.list().await {
            Ok(liked) => {
                self.liked_ids = liked.iter().map(|track| track.id().clone()).collect();
            }
            Err(error) => {
                warn!(?error, "Unable to load liked songs");
            }
        }

        info!("Session engine started");

        while let Some(command) = self.commands.recv().await {
            self.handle_command(command).await;
        }

        info!("Session engine stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::PlayTrack {
                track,
                playlist,
                reply,
            } => {
                let _ = reply.send(self.play_track(track, playlist).await);
            }
            Command::TogglePlayPause { reply } => {
                let _ = reply.send(self.toggle_play_pause().await);
            }
            Command::Next { reply } => {
                let index = self.queue.wrapped_next();
                let _ = reply.send(self.skip_to(index).await);
            }
            Command::Previous { reply } => {
                let index = self.queue.wrapped_previous();
                let _ = reply.send(self.skip_to(index).await);
            }
            Command::ShufflePlay { playlist, reply } => {
                let _ = reply.send(self.shuffle_play(playlist).await);
            }
            Command::SetRepeatMode(repeat) => {
                self.mode.repeat = repeat;
            }
            Command::SetShuffle(shuffle) => {
                self.mode.shuffle = shuffle;
            }
            Command::ToggleLike { track, reply } => {
                let _ = reply.send(self.toggle_like(track).await);
            }
            Command::IsLiked { track_id, reply } => {
                let _ = reply.send(self.liked_ids.contains(&track_id));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(SessionSnapshot {
                    state: self.state,
                    queue: self.queue.clone(),
                    mode: self.mode,
                });
            }
            Command::Seek { position, reply } => {
                let _ = reply.send(self.seek(position).await);
            }
            Command::TrackFinished { track_id, load_id } => {
                self.on_track_finished(track_id, load_id).await;
            }
        }
    }

    fn playable_url(&self, track: &Track) -> String {
        match track.local_uri() {
            Some(local_uri) => local_uri.to_string(),
            None => self
                .endpoint
                .stream_url(track.source_url(), StreamMode::Inline),
        }
    }

    /// Queue, index and the loaded source are left alone when the transport
    /// refuses the track.
    async fn load(&mut self, track: &Track) -> Result<(), SessionError> {
        let url = self.playable_url(track);

        self.load_counter += 1;
        let load_id = LoadId(self.load_counter);

        if let Err(error) = self.transport.replace(&url, load_id).await {
            return Err(self.playback_failed(track, error));
        }

        if let Err(error) = self.transport.play().await {
            self.restore_loaded_source().await;
            return Err(self.playback_failed(track, error));
        }

        self.loaded = Some(load_id);

        debug!(track_id = %track.id(), %load_id, %url, "Track loaded");

        Ok(())
    }

    /// Puts the current track back on the transport, paused at its start.
    async fn restore_loaded_source(&mut self) {
        let (track, load_id) = match (self.queue.current_track(), self.loaded) {
            (Some(track), Some(load_id)) => (track.clone(), load_id),
            _ => return,
        };

        let url = self.playable_url(&track);

        if let Err(error) = self.transport.replace(&url, load_id).await {
            warn!(track_id = %track.id(), ?error, "Unable to restore current track");
            self.loaded = None;
            self.state = SessionState::Idle;
        }
    }

    fn playback_failed(&self, track: &Track, error: TransportError) -> SessionError {
        warn!(track_id = %track.id(), ?error, "Unable to play track");
        self.notify(SessionNotice::PlaybackFailed {
            track_id: track.id().clone(),
            reason: error.to_string(),
        });

        error.into()
    }

    async fn seek(&mut self, position: Duration) -> Result<(), SessionError> {
        if self.state == SessionState::Idle {
            return Ok(());
        }

        Ok(self.transport.seek_to(position).await?)
    }

    async fn play_track(
        &mut self,
        track: Track,
        playlist: Option<Vec<Track>>,
    ) -> Result<(), SessionError> {
        self.load(&track).await?;

        match playlist {
            Some(playlist) => {
                let mut queue = Queue::new(playlist);
                match queue.position_of(track.id()) {
                    Some(index) => {
                        queue.set_current(index);
                        self.queue = queue;
                    }
                    None => {
                        warn!(
                            track_id = %track.id(),
                            "Track is not part of the playlist, playing it alone"
                        );
                        self.queue = Queue::single(track);
                    }
                }
            }
            None => match self.queue.position_of(track.id()) {
                Some(index) => self.queue.set_current(index),
                None => self.queue = Queue::single(track),
            },
        }

        self.state = SessionState::Loaded;

        Ok(())
    }

    async fn skip_to(&mut self, index: Option<usize>) -> Result<(), SessionError> {
        let index = match index {
            Some(index) => index,
            None => return Ok(()),
        };

        let track = self.queue.tracks()[index].clone();
        self.load(&track).await?;

        self.queue.set_current(index);
        self.state = SessionState::Loaded;

        Ok(())
    }

    async fn toggle_play_pause(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => Ok(()),
            SessionState::Loaded if self.transport.is_playing() => {
                Ok(self.transport.pause().await?)
            }
            SessionState::Loaded | SessionState::Stopped => {
                self.transport.play().await?;
                self.state = SessionState::Loaded;
                Ok(())
            }
        }
    }

    async fn shuffle_play(&mut self, playlist: Vec<Track>) -> Result<(), SessionError> {
        if playlist.is_empty() {
            return Ok(());
        }

        let index = rand::thread_rng().gen_range(0..playlist.len());
        let track = playlist[index].clone();

        self.play_track(track, Some(playlist)).await?;
        self.mode.shuffle = true;

        Ok(())
    }

    async fn toggle_like(&mut self, track: Track) -> Result<bool, SessionError> {
        let is_liked = self.liked_songs.toggle(&track).await?;

        if is_liked {
            self.liked_ids.insert(track.id().clone());
        } else {
            self.liked_ids.remove(track.id());
        }

        Ok(is_liked)
    }

    async fn on_track_finished(&mut self, track_id: TrackId, load_id: LoadId) {
        let current_id = self.queue.current_track().map(|track| track.id());

        if self.state != SessionState::Loaded
            || self.loaded != Some(load_id)
            || current_id != Some(&track_id)
        {
            debug!(%track_id, %load_id, "Ignoring stale end of track event");
            return;
        }

        if self.mode.repeat == RepeatMode::Track {
            let result = match self.transport.seek_to(Duration::ZERO).await {
                Ok(()) => self.transport.play().await,
                Err(error) => Err(error),
            };

            if let Err(error) = result {
                warn!(%track_id, ?error, "Unable to repeat track");
                self.notify(SessionNotice::PlaybackFailed {
                    track_id,
                    reason: error.to_string(),
                });
            }

            return;
        }

        let next_index = match self.queue.current_index() {
            Some(index) if index + 1 < self.queue.len() => Some(index + 1),
            Some(_) if self.mode.repeat == RepeatMode::All => Some(0),
            _ => None,
        };

        match next_index {
            Some(index) => {
                // Failure is already reported through notices.
                let _ = self.skip_to(Some(index)).await;
            }
            None => {
                info!(%track_id, "Reached end of queue");
                self.state = SessionState::Stopped;
            }
        }
    }

    fn notify(&self, notice: SessionNotice) {
        if let Some(notices) = &self.notices {
            let _ = notices.send(notice);
        }
    }
}
