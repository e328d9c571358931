mod downloads;
mod gateway_client;
mod liked_songs;
mod recent_searches;
mod session;
mod storage;
mod track;

pub use downloads::*;
pub use gateway_client::*;
pub use liked_songs::*;
pub use recent_searches::*;
pub use session::*;
pub use storage::*;
pub use track::*;

use serde::{Deserialize, Serialize};
use std::ops::Deref;

// TrackId
#[derive(Eq, PartialEq, Clone, Hash, Debug, Serialize, Deserialize)]
pub struct TrackId(pub(crate) String);

impl Deref for TrackId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        TrackId(value.to_string())
    }
}

impl From<String> for TrackId {
    fn from(value: String) -> Self {
        TrackId(value)
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
