//! User accounts and the user-scoped relationships kept by sibling services.

use axum::http::StatusCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::user_models::{User, UserPayload};
use super::user_store::UserStore;
use crate::downstream::{
    DownstreamClient, DownstreamError, DownstreamResponse, InvalidPathSegment, ResourcePath,
};
use crate::server::metrics::record_user_store_error;

const PLAYLISTS: &str = "playlists";
const SONGS: &str = "songs";
const ARTISTS: &str = "artists";

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("Invalid user ID format")]
    InvalidUserId,

    #[error("User not found")]
    UserNotFound,

    /// A relationship id that can't address a downstream resource.
    #[error("Invalid identifier")]
    InvalidIdentifier(#[from] InvalidPathSegment),

    #[error("Error parsing user data")]
    InvalidUserData(#[source] serde_json::Error),

    /// A downstream service answered, but not with the expected status.
    #[error("{context}: {}", .status.as_u16())]
    DownstreamStatus {
        context: &'static str,
        status: StatusCode,
    },

    #[error("Error communicating with {}", .0.service())]
    DownstreamUnavailable(#[source] DownstreamError),

    #[error("Internal server error")]
    Store(#[from] anyhow::Error),
}

impl UserServiceError {
    /// The HTTP status this error is reported with.
    ///
    /// Forwarded statuses are kept even when they carry no body (204, 304),
    /// in which case clients get the status without the message.
    pub fn status(&self) -> StatusCode {
        match self {
            UserServiceError::InvalidUserId
            | UserServiceError::InvalidIdentifier(_)
            | UserServiceError::InvalidUserData(_) => StatusCode::BAD_REQUEST,
            UserServiceError::UserNotFound => StatusCode::NOT_FOUND,
            UserServiceError::DownstreamStatus { status, .. } => *status,
            UserServiceError::DownstreamUnavailable(_) | UserServiceError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type UserServiceResult<T> = Result<T, UserServiceError>;

/// The three sibling services user relationships are forwarded to.
#[derive(Clone)]
pub struct DownstreamClients {
    pub songs: Arc<dyn DownstreamClient>,
    pub playlists: Arc<dyn DownstreamClient>,
    pub artists: Arc<dyn DownstreamClient>,
}

/// Logs and counts a failed store operation before turning it into a
/// [`UserServiceError::Store`].
fn checked<T>(operation: &'static str, result: anyhow::Result<T>) -> UserServiceResult<T> {
    result.map_err(|err| {
        error!("User store {} failed: {:#}", operation, err);
        record_user_store_error(operation);
        UserServiceError::Store(err)
    })
}

fn parse_user_id(user_id: &str) -> UserServiceResult<i64> {
    user_id
        .parse::<i64>()
        .map_err(|_| UserServiceError::InvalidUserId)
}

pub struct UserService {
    user_store: Arc<dyn UserStore>,
    downstreams: DownstreamClients,
}

impl UserService {
    pub fn new(user_store: Arc<dyn UserStore>, downstreams: DownstreamClients) -> Self {
        Self {
            user_store,
            downstreams,
        }
    }

    pub fn list_users(&self) -> UserServiceResult<Vec<User>> {
        checked("get_all_users", self.user_store.get_all_users())
    }

    pub fn get_user(&self, user_id: &str) -> UserServiceResult<User> {
        let user_id = parse_user_id(user_id)?;
        checked("get_user", self.user_store.get_user(user_id))?
            .ok_or(UserServiceError::UserNotFound)
    }

    /// Creates a user from a raw JSON body. The store assigns the id.
    pub fn create_user(&self, user_details: &str) -> UserServiceResult<User> {
        let payload = UserPayload::parse(user_details).map_err(|err| {
            debug!("Rejecting user data: {}", err);
            UserServiceError::InvalidUserData(err)
        })?;
        let user = checked("save_user", self.user_store.save_user(payload.into_new_user()))?;
        info!("Created user {:?}", user.id);
        Ok(user)
    }

    /// Overwrites username and email of an existing user.
    ///
    /// The id is checked first, then the user's existence, then the body.
    pub fn update_user(&self, user_id: &str, user_details: &str) -> UserServiceResult<User> {
        let user_id = parse_user_id(user_id)?;
        let mut user = checked("get_user", self.user_store.get_user(user_id))?
            .ok_or(UserServiceError::UserNotFound)?;
        let payload = UserPayload::parse(user_details).map_err(|err| {
            debug!("Rejecting user data for user {}: {}", user_id, err);
            UserServiceError::InvalidUserData(err)
        })?;
        payload.apply_to(&mut user);
        checked("save_user", self.user_store.save_user(user))
    }

    /// Deletes a user. Deleting a user that doesn't exist succeeds.
    pub fn delete_user(&self, user_id: &str) -> UserServiceResult<()> {
        let user_id = parse_user_id(user_id)?;
        checked("delete_user", self.user_store.delete_user(user_id))?;
        info!("Deleted user {}", user_id);
        Ok(())
    }

    // Playlists

    pub async fn get_user_playlists(&self, user_id: &str) -> UserServiceResult<DownstreamResponse> {
        let path = ResourcePath::user(user_id)?.segment(PLAYLISTS)?;
        relay_listing(
            self.downstreams.playlists.as_ref(),
            &path,
            "Error retrieving user playlists",
        )
        .await
    }

    pub async fn add_user_playlist(
        &self,
        user_id: &str,
        playlist_id: &str,
    ) -> UserServiceResult<&'static str> {
        let path = ResourcePath::user(user_id)?
            .segment(PLAYLISTS)?
            .segment(playlist_id)?;
        forward_add(
            self.downstreams.playlists.as_ref(),
            &path,
            "Playlist added to user's playlists",
            "Error adding playlist",
        )
        .await
    }

    pub async fn remove_user_playlist(
        &self,
        user_id: &str,
        playlist_id: &str,
    ) -> UserServiceResult<()> {
        let path = ResourcePath::user(user_id)?
            .segment(PLAYLISTS)?
            .segment(playlist_id)?;
        forward_remove(
            self.downstreams.playlists.as_ref(),
            &path,
            "Error removing playlist",
        )
        .await
    }

    pub async fn get_playlist_songs(
        &self,
        user_id: &str,
        playlist_id: &str,
    ) -> UserServiceResult<DownstreamResponse> {
        let path = ResourcePath::user(user_id)?
            .segment(PLAYLISTS)?
            .segment(playlist_id)?
            .segment(SONGS)?;
        relay_listing(
            self.downstreams.playlists.as_ref(),
            &path,
            "Error retrieving playlist songs",
        )
        .await
    }

    pub async fn add_song_to_playlist(
        &self,
        user_id: &str,
        playlist_id: &str,
        song_id: &str,
    ) -> UserServiceResult<&'static str> {
        let path = ResourcePath::user(user_id)?
            .segment(PLAYLISTS)?
            .segment(playlist_id)?
            .segment(SONGS)?
            .segment(song_id)?;
        forward_add(
            self.downstreams.playlists.as_ref(),
            &path,
            "Song added to playlist",
            "Error adding song",
        )
        .await
    }

    pub async fn remove_song_from_playlist(
        &self,
        user_id: &str,
        playlist_id: &str,
        song_id: &str,
    ) -> UserServiceResult<()> {
        let path = ResourcePath::user(user_id)?
            .segment(PLAYLISTS)?
            .segment(playlist_id)?
            .segment(SONGS)?
            .segment(song_id)?;
        forward_remove(
            self.downstreams.playlists.as_ref(),
            &path,
            "Error removing song from playlist",
        )
        .await
    }

    // Songs

    pub async fn get_user_songs(&self, user_id: &str) -> UserServiceResult<DownstreamResponse> {
        let path = ResourcePath::user(user_id)?.segment(SONGS)?;
        relay_listing(
            self.downstreams.songs.as_ref(),
            &path,
            "Error retrieving user songs",
        )
        .await
    }

    pub async fn add_user_song(
        &self,
        user_id: &str,
        song_id: &str,
    ) -> UserServiceResult<&'static str> {
        let path = ResourcePath::user(user_id)?.segment(SONGS)?.segment(song_id)?;
        forward_add(
            self.downstreams.songs.as_ref(),
            &path,
            "Song added to user's playlist",
            "Error adding song",
        )
        .await
    }

    pub async fn remove_user_song(&self, user_id: &str, song_id: &str) -> UserServiceResult<()> {
        let path = ResourcePath::user(user_id)?.segment(SONGS)?.segment(song_id)?;
        forward_remove(self.downstreams.songs.as_ref(), &path, "Error removing song").await
    }

    // Artists

    pub async fn get_user_artists(&self, user_id: &str) -> UserServiceResult<DownstreamResponse> {
        let path = ResourcePath::user(user_id)?.segment(ARTISTS)?;
        relay_listing(
            self.downstreams.artists.as_ref(),
            &path,
            "Error retrieving user artists",
        )
        .await
    }

    pub async fn add_user_artist(
        &self,
        user_id: &str,
        artist_id: &str,
    ) -> UserServiceResult<&'static str> {
        let path = ResourcePath::user(user_id)?
            .segment(ARTISTS)?
            .segment(artist_id)?;
        forward_add(
            self.downstreams.artists.as_ref(),
            &path,
            "Artist added to user's profile",
            "Error adding artist",
        )
        .await
    }

    pub async fn remove_user_artist(
        &self,
        user_id: &str,
        artist_id: &str,
    ) -> UserServiceResult<()> {
        let path = ResourcePath::user(user_id)?
            .segment(ARTISTS)?
            .segment(artist_id)?;
        forward_remove(
            self.downstreams.artists.as_ref(),
            &path,
            "Error removing artist from user",
        )
        .await
    }
}

/// GET, relaying the whole response (body and content type) only on 200.
async fn relay_listing(
    client: &dyn DownstreamClient,
    path: &ResourcePath,
    failure_context: &'static str,
) -> UserServiceResult<DownstreamResponse> {
    let response = client
        .get(path)
        .await
        .map_err(UserServiceError::DownstreamUnavailable)?;
    if response.status == StatusCode::OK {
        Ok(response)
    } else {
        warn!("{} GET {} answered {}", client.service(), path, response.status);
        Err(UserServiceError::DownstreamStatus {
            context: failure_context,
            status: response.status,
        })
    }
}

/// POST with an empty body, succeeding only on 201.
async fn forward_add(
    client: &dyn DownstreamClient,
    path: &ResourcePath,
    success_message: &'static str,
    failure_context: &'static str,
) -> UserServiceResult<&'static str> {
    let response = client
        .post(path)
        .await
        .map_err(UserServiceError::DownstreamUnavailable)?;
    if response.status == StatusCode::CREATED {
        Ok(success_message)
    } else {
        warn!("{} POST {} answered {}", client.service(), path, response.status);
        Err(UserServiceError::DownstreamStatus {
            context: failure_context,
            status: response.status,
        })
    }
}

/// DELETE, succeeding on any 2xx. The downstream body is discarded.
async fn forward_remove(
    client: &dyn DownstreamClient,
    path: &ResourcePath,
    failure_context: &'static str,
) -> UserServiceResult<()> {
    let response = client
        .delete(path)
        .await
        .map_err(UserServiceError::DownstreamUnavailable)?;
    if response.status.is_success() {
        Ok(())
    } else {
        warn!(
            "{} DELETE {} answered {}",
            client.service(),
            path,
            response.status
        );
        Err(UserServiceError::DownstreamStatus {
            context: failure_context,
            status: response.status,
        })
    }
}
