//! Clients for the sibling services that own user relationships.
//!
//! Playlists, liked songs and followed artists live in their own services;
//! this service only forwards requests to them.

mod client;
mod path;

use std::fmt;

pub use client::{DownstreamClient, DownstreamError, DownstreamResponse, HttpDownstreamClient};
pub use path::{InvalidPathSegment, ResourcePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownstreamService {
    Song,
    Playlist,
    Artist,
}

impl DownstreamService {
    /// Human readable name, as used in error messages sent to clients.
    pub fn display_name(&self) -> &'static str {
        match self {
            DownstreamService::Song => "Song Service",
            DownstreamService::Playlist => "Playlist Service",
            DownstreamService::Artist => "Artist Service",
        }
    }

    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            DownstreamService::Song => "song",
            DownstreamService::Playlist => "playlist",
            DownstreamService::Artist => "artist",
        }
    }
}

impl fmt::Display for DownstreamService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
