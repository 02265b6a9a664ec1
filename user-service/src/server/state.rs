use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use crate::user::UserService;

use super::ServerConfig;

pub type GuardedUserService = Arc<UserService>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub user_service: GuardedUserService,
}

impl ServerState {
    pub fn new(config: ServerConfig, user_service: GuardedUserService) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            user_service,
        }
    }
}

impl FromRef<ServerState> for GuardedUserService {
    fn from_ref(input: &ServerState) -> Self {
        input.user_service.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
