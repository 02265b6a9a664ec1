//! `/v1/users` routes.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::state::{GuardedUserService, ServerState};
use crate::downstream::DownstreamResponse;
use crate::user::{UserServiceError, UserServiceResult};

/// Statuses whose responses can't carry a body.
fn is_bodyless(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT | StatusCode::NOT_MODIFIED
    ) || status.is_informational()
}

impl IntoResponse for UserServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if is_bodyless(status) {
            return status.into_response();
        }
        (status, self.to_string()).into_response()
    }
}

const DEFAULT_LISTING_CONTENT_TYPE: &str = "application/json";

/// A downstream listing, passed through byte for byte with its content type.
struct RelayedListing(DownstreamResponse);

impl IntoResponse for RelayedListing {
    fn into_response(self) -> Response {
        let DownstreamResponse {
            content_type, body, ..
        } = self.0;
        let content_type =
            content_type.unwrap_or_else(|| DEFAULT_LISTING_CONTENT_TYPE.to_string());
        (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
    }
}

fn relayed(result: UserServiceResult<DownstreamResponse>) -> Response {
    match result {
        Ok(listing) => RelayedListing(listing).into_response(),
        Err(err) => err.into_response(),
    }
}

fn added(result: UserServiceResult<&'static str>) -> Response {
    match result {
        Ok(message) => (StatusCode::CREATED, message).into_response(),
        Err(err) => err.into_response(),
    }
}

fn removed(result: UserServiceResult<()>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn list_users(State(user_service): State<GuardedUserService>) -> Response {
    match user_service.list_users() {
        Ok(users) => Json(users).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_user(
    State(user_service): State<GuardedUserService>,
    Path(user_id): Path<String>,
) -> Response {
    match user_service.get_user(&user_id) {
        Ok(user) => Json(user).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn create_user(State(user_service): State<GuardedUserService>, body: String) -> Response {
    match user_service.create_user(&body) {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn update_user(
    State(user_service): State<GuardedUserService>,
    Path(user_id): Path<String>,
    body: String,
) -> Response {
    match user_service.update_user(&user_id, &body) {
        Ok(user) => Json(user).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn delete_user(
    State(user_service): State<GuardedUserService>,
    Path(user_id): Path<String>,
) -> Response {
    match user_service.delete_user(&user_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        // Bad ids get a bare 400 on delete
        Err(UserServiceError::InvalidUserId) => StatusCode::BAD_REQUEST.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_user_playlists(
    State(user_service): State<GuardedUserService>,
    Path(user_id): Path<String>,
) -> Response {
    relayed(user_service.get_user_playlists(&user_id).await)
}

async fn add_user_playlist(
    State(user_service): State<GuardedUserService>,
    Path((user_id, playlist_id)): Path<(String, String)>,
) -> Response {
    added(user_service.add_user_playlist(&user_id, &playlist_id).await)
}

async fn remove_user_playlist(
    State(user_service): State<GuardedUserService>,
    Path((user_id, playlist_id)): Path<(String, String)>,
) -> Response {
    removed(
        user_service
            .remove_user_playlist(&user_id, &playlist_id)
            .await,
    )
}

async fn get_playlist_songs(
    State(user_service): State<GuardedUserService>,
    Path((user_id, playlist_id)): Path<(String, String)>,
) -> Response {
    relayed(user_service.get_playlist_songs(&user_id, &playlist_id).await)
}

async fn add_song_to_playlist(
    State(user_service): State<GuardedUserService>,
    Path((user_id, playlist_id, song_id)): Path<(String, String, String)>,
) -> Response {
    added(
        user_service
            .add_song_to_playlist(&user_id, &playlist_id, &song_id)
            .await,
    )
}

async fn remove_song_from_playlist(
    State(user_service): State<GuardedUserService>,
    Path((user_id, playlist_id, song_id)): Path<(String, String, String)>,
) -> Response {
    removed(
        user_service
            .remove_song_from_playlist(&user_id, &playlist_id, &song_id)
            .await,
    )
}

async fn get_user_songs(
    State(user_service): State<GuardedUserService>,
    Path(user_id): Path<String>,
) -> Response {
    relayed(user_service.get_user_songs(&user_id).await)
}

async fn add_user_song(
    State(user_service): State<GuardedUserService>,
    Path((user_id, song_id)): Path<(String, String)>,
) -> Response {
    added(user_service.add_user_song(&user_id, &song_id).await)
}

async fn remove_user_song(
    State(user_service): State<GuardedUserService>,
    Path((user_id, song_id)): Path<(String, String)>,
) -> Response {
    removed(user_service.remove_user_song(&user_id, &song_id).await)
}

async fn get_user_artists(
    State(user_service): State<GuardedUserService>,
    Path(user_id): Path<String>,
) -> Response {
    relayed(user_service.get_user_artists(&user_id).await)
}

async fn add_user_artist(
    State(user_service): State<GuardedUserService>,
    Path((user_id, artist_id)): Path<(String, String)>,
) -> Response {
    added(user_service.add_user_artist(&user_id, &artist_id).await)
}

async fn remove_user_artist(
    State(user_service): State<GuardedUserService>,
    Path((user_id, artist_id)): Path<(String, String)>,
) -> Response {
    removed(user_service.remove_user_artist(&user_id, &artist_id).await)
}

pub fn user_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/{user_id}/playlists", get(get_user_playlists))
        .route(
            "/{user_id}/playlists/{playlist_id}",
            post(add_user_playlist).delete(remove_user_playlist),
        )
        .route(
            "/{user_id}/playlists/{playlist_id}/songs",
            get(get_playlist_songs),
        )
        .route(
            "/{user_id}/playlists/{playlist_id}/songs/{song_id}",
            post(add_song_to_playlist).delete(remove_song_from_playlist),
        )
        .route("/{user_id}/songs", get(get_user_songs))
        .route(
            "/{user_id}/songs/{song_id}",
            post(add_user_song).delete(remove_user_song),
        )
        .route("/{user_id}/artists", get(get_user_artists))
        .route(
            "/{user_id}/artists/{artist_id}",
            post(add_user_artist).delete(remove_user_artist),
        )
}
