//! Path building for downstream resources.

use std::fmt;
use thiserror::Error;

/// A segment that can't be placed in a downstream path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid path segment {0:?}")]
pub struct InvalidPathSegment(pub String);

/// A path below a downstream service base URL, such as
/// `/users/12/playlists/7/songs`.
///
/// Every segment is percent-encoded when appended, so identifiers containing
/// `/`, spaces or other reserved characters can't change the shape of the path.
/// Empty, `.` and `..` segments are refused: URL parsing would drop or
/// collapse them even when encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// `/users/{user_id}`, the root of every per-user resource.
    pub fn user(user_id: &str) -> Result<Self, InvalidPathSegment> {
        ResourcePath(String::new())
            .segment("users")?
            .segment(user_id)
    }

    pub fn segment(mut self, segment: &str) -> Result<Self, InvalidPathSegment> {
        if matches!(segment, "" | "." | "..") {
            return Err(InvalidPathSegment(segment.to_string()));
        }
        self.0.push('/');
        self.0.push_str(&urlencoding::encode(segment));
        Ok(self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins this path onto a base URL, ignoring trailing slashes on the base.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
