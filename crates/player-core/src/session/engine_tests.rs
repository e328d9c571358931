use super::engine::{SessionEngine, SessionError, SessionHandle};
use super::traits::{AudioTransport, LoadId, TransportError};
use super::types::{RepeatMode, SessionNotice, SessionState};
use crate::track::make_track;
use crate::{
    GatewayEndpoint, InMemoryStorage, KeyValueStorage, LikedSongs, Track, LIKED_SONGS_KEY,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
enum TransportCall {
    Replace(String),
    Play,
    Pause,
    Seek(Duration),
}

#[derive(Default)]
struct TransportLog {
    calls: Vec<TransportCall>,
    playing: bool,
    loaded: Option<(String, LoadId)>,
    broken_urls: HashSet<String>,
    unplayable_urls: HashSet<String>,
}

struct TransportMock {
    log: Arc<Mutex<TransportLog>>,
}

#[async_trait]
impl AudioTransport for TransportMock {
    async fn replace(&mut self, url: &str, load_id: LoadId) -> Result<(), TransportError> {
        let mut log = self.log.lock().unwrap();

        if log.broken_urls.contains(url) {
            return Err(TransportError::LoadFailed {
                url: url.to_string(),
                reason: "network error".into(),
            });
        }

        log.playing = false;
        log.loaded = Some((url.to_string(), load_id));
        log.calls.push(TransportCall::Replace(url.to_string()));
        Ok(())
    }

    async fn play(&mut self) -> Result<(), TransportError> {
        let mut log = self.log.lock().unwrap();

        let is_unplayable = match &log.loaded {
            Some((url, _)) => log.unplayable_urls.contains(url),
            None => false,
        };
        if is_unplayable {
            return Err(TransportError::CommandFailed("decoder error".into()));
        }

        log.playing = true;
        log.calls.push(TransportCall::Play);
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), TransportError> {
        let mut log = self.log.lock().unwrap();
        log.playing = false;
        log.calls.push(TransportCall::Pause);
        Ok(())
    }

    async fn seek_to(&mut self, position: Duration) -> Result<(), TransportError> {
        self.log
            .lock()
            .unwrap()
            .calls
            .push(TransportCall::Seek(position));
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.log.lock().unwrap().playing
    }
}

struct Fixture {
    handle: SessionHandle,
    log: Arc<Mutex<TransportLog>>,
    notices: mpsc::UnboundedReceiver<SessionNotice>,
    storage: Arc<InMemoryStorage>,
}

impl Fixture {
    fn calls(&self) -> Vec<TransportCall> {
        self.log.lock().unwrap().calls.clone()
    }

    fn clear_calls(&self) {
        self.log.lock().unwrap().calls.clear();
    }

    fn break_url(&self, url: &str) {
        self.log.lock().unwrap().broken_urls.insert(url.to_string());
    }

    fn make_unplayable(&self, url: &str) {
        self.log
            .lock()
            .unwrap()
            .unplayable_urls
            .insert(url.to_string());
    }

    fn is_playing(&self) -> bool {
        self.log.lock().unwrap().playing
    }

    fn loaded(&self) -> (String, LoadId) {
        self.log.lock().unwrap().loaded.clone().unwrap()
    }

    /// Reports the end of whatever the transport currently holds.
    fn finish(&self, track: &Track) {
        let (_, load_id) = self.loaded();
        self.handle
            .track_finished(track.id().clone(), load_id)
            .unwrap();
    }

    async fn current_index(&self) -> Option<usize> {
        self.handle.snapshot().await.unwrap().queue.current_index()
    }
}

fn endpoint() -> GatewayEndpoint {
    GatewayEndpoint::parse("http://gateway.local:3001").unwrap()
}

fn stream_url(track: &Track) -> String {
    endpoint().stream_url(track.source_url(), crate::StreamMode::Inline)
}

fn start_session() -> Fixture {
    let storage = Arc::new(InMemoryStorage::new());
    start_session_with_storage(storage)
}

fn start_session_with_storage(storage: Arc<InMemoryStorage>) -> Fixture {
    let log = Arc::new(Mutex::new(TransportLog::default()));
    let (notices_sender, notices) = mpsc::unbounded_channel();

    let (handle, _) = SessionEngine::spawn(
        Box::new(TransportMock {
            log: Arc::clone(&log),
        }),
        endpoint(),
        Arc::new(LikedSongs::new(storage.clone())),
        Some(notices_sender),
    );

    Fixture {
        handle,
        log,
        notices,
        storage,
    }
}

fn playlist() -> Vec<Track> {
    vec![make_track("a"), make_track("b"), make_track("c")]
}

#[actix_rt::test]
async fn test_play_track_with_playlist_replaces_queue() {
    let session = start_session();
    let tracks = playlist();

    session
        .handle
        .play_track(tracks[1].clone(), Some(tracks.clone()))
        .await
        .unwrap();

    let snapshot = session.handle.snapshot().await.unwrap();
    assert_eq!(SessionState::Loaded, snapshot.state);
    assert_eq!(tracks, snapshot.queue.tracks());
    assert_eq!(Some(1), snapshot.queue.current_index());
    assert_eq!(
        vec![TransportCall::Replace(stream_url(&tracks[1])), TransportCall::Play],
        session.calls()
    );
}

#[actix_rt::test]
async fn test_play_track_prefers_local_file() {
    let session = start_session();
    let track = make_track("a").with_local_uri("file:///music/a.mp3".into());

    session.handle.play_track(track, None).await.unwrap();

    assert_eq!(
        TransportCall::Replace("file:///music/a.mp3".into()),
        session.calls()[0]
    );
}

#[actix_rt::test]
async fn test_play_track_without_playlist() {
    let session = start_session();
    let tracks = playlist();

    session
        .handle
        .play_track(tracks[0].clone(), Some(tracks.clone()))
        .await
        .unwrap();

    // Member of the current queue: the queue is reused.
    session.handle.play_track(tracks[2].clone(), None).await.unwrap();
    let snapshot = session.handle.snapshot().await.unwrap();
    assert_eq!(3, snapshot.queue.len());
    assert_eq!(Some(2), snapshot.queue.current_index());

    // Unknown track: the queue becomes just that track.
    session.handle.play_track(make_track("z"), None).await.unwrap();
    let snapshot = session.handle.snapshot().await.unwrap();
    assert_eq!(vec![make_track("z")], snapshot.queue.tracks());
    assert_eq!(Some(0), snapshot.queue.current_index());
}

#[actix_rt::test]
async fn test_play_track_missing_from_playlist_plays_alone() {
    let session = start_session();

    session
        .handle
        .play_track(make_track("z"), Some(playlist()))
        .await
        .unwrap();

    let snapshot = session.handle.snapshot().await.unwrap();
    assert_eq!(vec![make_track("z")], snapshot.queue.tracks());
    assert_eq!(Some(0), snapshot.queue.current_index());
}

#[actix_rt::test]
async fn test_manual_skip_wraps() {
    let session = start_session();
    let tracks = playlist();

    session
        .handle
        .play_track(tracks[2].clone(), Some(tracks.clone()))
        .await
        .unwrap();

    session.handle.next().await.unwrap();
    assert_eq!(Some(0), session.current_index().await);

    session.handle.previous().await.unwrap();
    assert_eq!(Some(2), session.current_index().await);

    session.handle.previous().await.unwrap();
    assert_eq!(Some(1), session.current_index().await);
}

#[actix_rt::test]
async fn test_skip_with_empty_queue_is_noop() {
    let session = start_session();

    session.handle.next().await.unwrap();
    session.handle.previous().await.unwrap();

    let snapshot = session.handle.snapshot().await.unwrap();
    assert_eq!(SessionState::Idle, snapshot.state);
    assert!(session.calls().is_empty());
}

#[actix_rt::test]
async fn test_toggle_play_pause() {
    let session = start_session();

    session.handle.toggle_play_pause().await.unwrap();
    assert!(session.calls().is_empty());

    session.handle.play_track(make_track("a"), None).await.unwrap();
    session.clear_calls();

    session.handle.toggle_play_pause().await.unwrap();
    session.handle.toggle_play_pause().await.unwrap();

    assert_eq!(
        vec![TransportCall::Pause, TransportCall::Play],
        session.calls()
    );
}

#[actix_rt::test]
async fn test_repeat_track_restarts_same_track() {
    let session = start_session();
    let tracks = playlist();

    session
        .handle
        .play_track(tracks[1].clone(), Some(tracks.clone()))
        .await
        .unwrap();
    session.handle.set_repeat_mode(RepeatMode::Track).unwrap();
    session.clear_calls();

    session.finish(&tracks[1]);

    assert_eq!(Some(1), session.current_index().await);
    assert_eq!(
        vec![TransportCall::Seek(Duration::ZERO), TransportCall::Play],
        session.calls()
    );
}

#[actix_rt::test]
async fn test_auto_advance_moves_to_next_track() {
    let session = start_session();
    let tracks = playlist();

    session
        .handle
        .play_track(tracks[0].clone(), Some(tracks.clone()))
        .await
        .unwrap();
    session.clear_calls();

    session.finish(&tracks[0]);

    assert_eq!(Some(1), session.current_index().await);
    assert_eq!(
        vec![TransportCall::Replace(stream_url(&tracks[1])), TransportCall::Play],
        session.calls()
    );
}

#[actix_rt::test]
async fn test_repeat_all_wraps_at_end() {
    let session = start_session();
    let tracks = playlist();

    session
        .handle
        .play_track(tracks[2].clone(), Some(tracks.clone()))
        .await
        .unwrap();
    session.handle.set_repeat_mode(RepeatMode::All).unwrap();

    session.finish(&tracks[2]);

    let snapshot = session.handle.snapshot().await.unwrap();
    assert_eq!(Some(0), snapshot.queue.current_index());
    assert_eq!(SessionState::Loaded, snapshot.state);
}

#[actix_rt::test]
async fn test_repeat_off_stops_at_end() {
    let session = start_session();
    let tracks = playlist();

    session
        .handle
        .play_track(tracks[2].clone(), Some(tracks.clone()))
        .await
        .unwrap();
    session.clear_calls();

    session.finish(&tracks[2]);

    let snapshot = session.handle.snapshot().await.unwrap();
    assert_eq!(Some(2), snapshot.queue.current_index());
    assert_eq!(SessionState::Stopped, snapshot.state);
    assert!(session.calls().is_empty());

    // A duplicate event for the stopped track changes nothing.
    session.finish(&tracks[2]);
    assert_eq!(Some(2), session.current_index().await);

    session.handle.toggle_play_pause().await.unwrap();
    let snapshot = session.handle.snapshot().await.unwrap();
    assert_eq!(SessionState::Loaded, snapshot.state);
}

#[actix_rt::test]
async fn test_skip_racing_end_of_track_advances_once() {
    let session = start_session();
    let tracks = playlist();

    session
        .handle
        .play_track(tracks[0].clone(), Some(tracks.clone()))
        .await
        .unwrap();

    let (_, first_load) = session.loaded();

    // The user skipped before the end-of-track event for "a" was processed.
    session.handle.next().await.unwrap();
    session
        .handle
        .track_finished(tracks[0].id().clone(), first_load)
        .unwrap();

    assert_eq!(Some(1), session.current_index().await);
}

#[actix_rt::test]
async fn test_load_failure_keeps_previous_state() {
    let mut session = start_session();
    let tracks = playlist();

    session
        .handle
        .play_track(tracks[0].clone(), Some(tracks.clone()))
        .await
        .unwrap();
    session.break_url(&stream_url(&tracks[1]));

    let result = session.handle.next().await;
    assert!(matches!(
        result,
        Err(SessionError::TransportError(TransportError::LoadFailed { .. }))
    ));

    let snapshot = session.handle.snapshot().await.unwrap();
    assert_eq!(Some(0), snapshot.queue.current_index());
    assert_eq!(tracks, snapshot.queue.tracks());

    let result = session
        .handle
        .play_track(tracks[1].clone(), Some(vec![tracks[1].clone()]))
        .await;
    assert!(result.is_err());
    assert_eq!(3, session.handle.snapshot().await.unwrap().queue.len());

    match session.notices.recv().await {
        Some(SessionNotice::PlaybackFailed { track_id, .. }) => {
            assert_eq!(tracks[1].id(), &track_id);
        }
        other => panic!("Unexpected notice: {:?}", other),
    }
}

#[actix_rt::test]
async fn test_shuffle_play_only_picks_entry_point() {
    let session = start_session();
    let tracks = playlist();

    session.handle.shuffle_play(vec![]).await.unwrap();
    assert_eq!(SessionState::Idle, session.handle.snapshot().await.unwrap().state);

    session.handle.shuffle_play(tracks.clone()).await.unwrap();

    let snapshot = session.handle.snapshot().await.unwrap();
    let start = snapshot.queue.current_index().unwrap();
    assert!(snapshot.mode.shuffle);
    assert_eq!(tracks, snapshot.queue.tracks());
    assert_eq!(snapshot.current_track(), Some(&tracks[start]));

    // Traversal after a shuffled start keeps queue order.
    session.handle.next().await.unwrap();
    assert_eq!(Some((start + 1) % 3), session.current_index().await);
}

#[actix_rt::test]
async fn test_toggle_like_is_persisted() {
    let session = start_session();
    let track = make_track("a");

    assert!(!session.handle.is_liked(track.id().clone()).await.unwrap());
    assert!(session.handle.toggle_like(track.clone()).await.unwrap());
    assert!(session.handle.is_liked(track.id().clone()).await.unwrap());

    let raw = session.storage.get(LIKED_SONGS_KEY).await.unwrap().unwrap();
    let persisted: Vec<Track> = serde_json::from_str(&raw).unwrap();
    assert_eq!(vec![track.clone()], persisted);

    assert!(!session.handle.toggle_like(track.clone()).await.unwrap());
    assert!(!session.handle.is_liked(track.id().clone()).await.unwrap());
}

#[actix_rt::test]
async fn test_liked_songs_are_loaded_on_start() {
    let storage = Arc::new(InMemoryStorage::new());
    LikedSongs::new(storage.clone())
        .toggle(&make_track("a"))
        .await
        .unwrap();

    let session = start_session_with_storage(storage);

    assert!(session.handle.is_liked("a".into()).await.unwrap());
    assert!(!session.handle.is_liked("b".into()).await.unwrap());
}

#[actix_rt::test]
async fn test_end_of_previous_load_is_ignored_after_reload() {
    let session = start_session();
    let track = make_track("a");

    session.handle.play_track(track.clone(), None).await.unwrap();
    let (_, first_load) = session.loaded();

    // Single-track queue: next wraps around and loads "a" again.
    session.handle.next().await.unwrap();
    session
        .handle
        .track_finished(track.id().clone(), first_load)
        .unwrap();

    let snapshot = session.handle.snapshot().await.unwrap();
    assert_eq!(SessionState::Loaded, snapshot.state);
    assert!(session.is_playing());

    session.clear_calls();
    session.handle.toggle_play_pause().await.unwrap();
    assert_eq!(vec![TransportCall::Pause], session.calls());

    // The current load still ends normally.
    session.finish(&track);
    let snapshot = session.handle.snapshot().await.unwrap();
    assert_eq!(SessionState::Stopped, snapshot.state);
}

#[actix_rt::test]
async fn test_seek() {
    let session = start_session();

    session.handle.seek(Duration::from_secs(30)).await.unwrap();
    assert!(session.calls().is_empty());

    session.handle.play_track(make_track("a"), None).await.unwrap();
    session.clear_calls();

    session.handle.seek(Duration::from_secs(30)).await.unwrap();
    assert_eq!(
        vec![TransportCall::Seek(Duration::from_secs(30))],
        session.calls()
    );

    // The last track of a finished queue can still be scrubbed.
    session.finish(&make_track("a"));
    session.handle.seek(Duration::from_secs(5)).await.unwrap();
    assert_eq!(
        Some(&TransportCall::Seek(Duration::from_secs(5))),
        session.calls().last()
    );
}

#[actix_rt::test]
async fn test_play_failure_restores_current_track() {
    let mut session = start_session();
    let tracks = playlist();

    session
        .handle
        .play_track(tracks[0].clone(), Some(tracks.clone()))
        .await
        .unwrap();
    let first_load = session.loaded();
    session.make_unplayable(&stream_url(&tracks[1]));
    session.clear_calls();

    let result = session.handle.next().await;
    assert!(matches!(
        result,
        Err(SessionError::TransportError(TransportError::CommandFailed(_)))
    ));

    assert_eq!(
        vec![
            TransportCall::Replace(stream_url(&tracks[1])),
            TransportCall::Replace(stream_url(&tracks[0])),
        ],
        session.calls()
    );
    assert_eq!(first_load, session.loaded());
    assert_eq!(Some(0), session.current_index().await);
    assert!(matches!(
        session.notices.recv().await,
        Some(SessionNotice::PlaybackFailed { .. })
    ));

    // The restored load still counts: its end tries the next track again.
    session.clear_calls();
    session.finish(&tracks[0]);
    assert_eq!(Some(0), session.current_index().await);
    assert_eq!(
        Some(&TransportCall::Replace(stream_url(&tracks[1]))),
        session.calls().first()
    );
}
