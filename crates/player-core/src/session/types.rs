use crate::{Track, TrackId};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    #[default]
    Off,
    Track,
    All,
}

/// Repeat and shuffle are independent. Shuffle only picks the entry point of
/// a shuffled start; traversal always follows queue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackMode {
    pub repeat: RepeatMode,
    pub shuffle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has been loaded into the transport yet.
    Idle,
    /// A track is loaded; the transport knows whether it is playing.
    Loaded,
    /// Queue ran out; the last track stays loaded but is not playing.
    Stopped,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    tracks: Vec<Track>,
    current: Option<usize>,
}

impl Queue {
    /// Later duplicates of an id are dropped.
    pub(crate) fn new(tracks: Vec<Track>) -> Self {
        let mut seen = HashSet::new();
        let tracks = tracks
            .into_iter()
            .filter(|track| seen.insert(track.id().clone()))
            .collect();

        Self {
            tracks,
            current: None,
        }
    }

    pub(crate) fn single(track: Track) -> Self {
        Self {
            tracks: vec![track],
            current: Some(0),
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|index| self.tracks.get(index))
    }

    pub(crate) fn position_of(&self, track_id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|track| track.id() == track_id)
    }

    pub(crate) fn set_current(&mut self, index: usize) {
        debug_assert!(index < self.tracks.len());
        self.current = Some(index);
    }

    /// Manual skips wrap around in both directions.
    pub(crate) fn wrapped_next(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }

        Some(match self.current {
            Some(index) => (index + 1) % self.tracks.len(),
            None => 0,
        })
    }

    pub(crate) fn wrapped_previous(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }

        Some(match self.current {
            Some(0) | None => self.tracks.len() - 1,
            Some(index) => index - 1,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub queue: Queue,
    pub mode: PlaybackMode,
}

impl SessionSnapshot {
    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current_track()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    PlaybackFailed { track_id: TrackId, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::make_track;

    #[test]
    fn test_queue_drops_duplicate_ids() {
        let queue = Queue::new(vec![make_track("a"), make_track("b"), make_track("a")]);

        assert_eq!(2, queue.len());
        assert_eq!(None, queue.current_index());
    }

    #[test]
    fn test_wrapping_indices() {
        let mut queue = Queue::new(vec![make_track("a"), make_track("b"), make_track("c")]);

        queue.set_current(2);
        assert_eq!(Some(0), queue.wrapped_next());
        assert_eq!(Some(1), queue.wrapped_previous());

        queue.set_current(0);
        assert_eq!(Some(1), queue.wrapped_next());
        assert_eq!(Some(2), queue.wrapped_previous());

        assert_eq!(None, Queue::default().wrapped_next());
        assert_eq!(None, Queue::default().wrapped_previous());
    }
}
