//! Shared constants for end-to-end tests

// ============================================================================
// Timeouts
// ============================================================================

/// How long to wait for a spawned server to answer `GET /`
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness probes
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Timeout for requests made by the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Timeout the user service uses for downstream requests in tests
pub const DOWNSTREAM_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// Test Data
// ============================================================================

pub const ALICE_USERNAME: &str = "alice";
pub const ALICE_EMAIL: &str = "a@x.com";
pub const BOB_USERNAME: &str = "bob";
pub const BOB_EMAIL: &str = "b@x.com";

pub const PLAYLIST_1_ID: &str = "playlist-1";
pub const SONG_1_ID: &str = "song-1";
pub const ARTIST_1_ID: &str = "artist-1";
