//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per user service endpoint.
//! When API routes change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/users{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Response {
        request.send().await.expect("Request failed")
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn list_users(&self) -> Response {
        self.send(self.client.get(self.url(""))).await
    }

    pub async fn get_user(&self, user_id: &str) -> Response {
        self.send(self.client.get(self.url(&format!("/{}", user_id))))
            .await
    }

    pub async fn create_user(&self, username: &str, email: &str) -> Response {
        self.create_user_raw(&json!({"username": username, "email": email}).to_string())
            .await
    }

    pub async fn create_user_raw(&self, body: &str) -> Response {
        self.send(
            self.client
                .post(self.url(""))
                .header("content-type", "application/json")
                .body(body.to_string()),
        )
        .await
    }

    pub async fn update_user(&self, user_id: &str, body: &str) -> Response {
        self.send(
            self.client
                .put(self.url(&format!("/{}", user_id)))
                .header("content-type", "application/json")
                .body(body.to_string()),
        )
        .await
    }

    pub async fn delete_user(&self, user_id: &str) -> Response {
        self.send(self.client.delete(self.url(&format!("/{}", user_id))))
            .await
    }

    // ========================================================================
    // Playlists
    // ========================================================================

    pub async fn get_user_playlists(&self, user_id: &str) -> Response {
        self.send(
            self.client
                .get(self.url(&format!("/{}/playlists", user_id))),
        )
        .await
    }

    pub async fn add_user_playlist(&self, user_id: &str, playlist_id: &str) -> Response {
        self.send(
            self.client
                .post(self.url(&format!("/{}/playlists/{}", user_id, playlist_id))),
        )
        .await
    }

    pub async fn remove_user_playlist(&self, user_id: &str, playlist_id: &str) -> Response {
        self.send(
            self.client
                .delete(self.url(&format!("/{}/playlists/{}", user_id, playlist_id))),
        )
        .await
    }

    pub async fn get_playlist_songs(&self, user_id: &str, playlist_id: &str) -> Response {
        self.send(
            self.client
                .get(self.url(&format!("/{}/playlists/{}/songs", user_id, playlist_id))),
        )
        .await
    }

    pub async fn add_song_to_playlist(
        &self,
        user_id: &str,
        playlist_id: &str,
        song_id: &str,
    ) -> Response {
        self.send(self.client.post(self.url(&format!(
            "/{}/playlists/{}/songs/{}",
            user_id, playlist_id, song_id
        ))))
        .await
    }

    pub async fn remove_song_from_playlist(
        &self,
        user_id: &str,
        playlist_id: &str,
        song_id: &str,
    ) -> Response {
        self.send(self.client.delete(self.url(&format!(
            "/{}/playlists/{}/songs/{}",
            user_id, playlist_id, song_id
        ))))
        .await
    }

    // ========================================================================
    // Songs
    // ========================================================================

    pub async fn get_user_songs(&self, user_id: &str) -> Response {
        self.send(self.client.get(self.url(&format!("/{}/songs", user_id))))
            .await
    }

    pub async fn add_user_song(&self, user_id: &str, song_id: &str) -> Response {
        self.send(
            self.client
                .post(self.url(&format!("/{}/songs/{}", user_id, song_id))),
        )
        .await
    }

    pub async fn remove_user_song(&self, user_id: &str, song_id: &str) -> Response {
        self.send(
            self.client
                .delete(self.url(&format!("/{}/songs/{}", user_id, song_id))),
        )
        .await
    }

    // ========================================================================
    // Artists
    // ========================================================================

    pub async fn get_user_artists(&self, user_id: &str) -> Response {
        self.send(self.client.get(self.url(&format!("/{}/artists", user_id))))
            .await
    }

    pub async fn add_user_artist(&self, user_id: &str, artist_id: &str) -> Response {
        self.send(
            self.client
                .post(self.url(&format!("/{}/artists/{}", user_id, artist_id))),
        )
        .await
    }

    pub async fn remove_user_artist(&self, user_id: &str, artist_id: &str) -> Response {
        self.send(
            self.client
                .delete(self.url(&format!("/{}/artists/{}", user_id, artist_id))),
        )
        .await
    }
}
