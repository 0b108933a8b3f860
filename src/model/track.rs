//! Track descriptors and playlist index arithmetic

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::session::SessionError;

/// Matches web URLs the way the platform's web-url pattern does: optional scheme,
/// a dotted host name (or IPv4 literal), optional port, then an optional path.
static WEB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:https?|rtsp)://)?(?:[a-z0-9](?:[a-z0-9-]{0,62}[a-z0-9])?\.)+[a-z]{2,63}(?::\d{1,5})?(?:[/?#]\S*)?$|^(?i)(?:(?:https?|rtsp)://)?(?:\d{1,3}\.){3}\d{1,3}(?::\d{1,5})?(?:[/?#]\S*)?$",
    )
    .expect("web url pattern is valid")
});

pub fn is_web_url(candidate: &str) -> bool {
    !candidate.is_empty() && WEB_URL.is_match(candidate)
}

/// One playable item of an artist's top tracks
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub artist_name: String,
    pub track_name: String,
    pub album_name: String,
    #[serde(default)]
    pub list_image_url: String,
    #[serde(default)]
    pub play_image_url: String,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl Track {
    /// The preview URL, if it is present and well formed.
    pub fn playable_url(&self) -> Option<&str> {
        self.audio_url.as_deref().filter(|url| is_web_url(url))
    }

    /// The list thumbnail, if it can be fetched.
    pub fn thumbnail_url(&self) -> Option<&str> {
        Some(self.list_image_url.as_str()).filter(|url| is_web_url(url))
    }

    pub fn share_text(&self, hashtag: &str) -> Option<String> {
        self.audio_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| format!("{}{}", url, hashtag))
    }
}

/// Ordered, non-empty list of tracks handed to a session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Result<Self, SessionError> {
        if tracks.is_empty() {
            return Err(SessionError::EmptyPlaylist);
        }
        Ok(Self { tracks })
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let tracks: Vec<Track> = serde_json::from_str(json)?;
        Ok(Self::new(tracks)?)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn next_index(&self, index: usize) -> usize {
        if index + 1 >= self.tracks.len() { 0 } else { index + 1 }
    }

    pub fn previous_index(&self, index: usize) -> usize {
        if index == 0 { self.tracks.len() - 1 } else { index - 1 }
    }
}
