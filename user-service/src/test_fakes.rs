//! In-memory stand-ins for the user store and the downstream services.

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::http::StatusCode;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::downstream::{
    DownstreamClient, DownstreamError, DownstreamResponse, DownstreamService, ResourcePath,
};
use crate::user::{User, UserStore};

#[derive(Default)]
struct InMemoryUsers {
    users: BTreeMap<i64, User>,
    last_id: i64,
    fail_next: bool,
}

#[derive(Default)]
pub struct InMemoryUserStore {
    inner: Mutex<InMemoryUsers>,
}

impl InMemoryUserStore {
    pub fn insert(&self, user: User) {
        let mut inner = self.inner.lock().unwrap();
        let id = user.id.expect("inserted users need an id");
        inner.last_id = inner.last_id.max(id);
        inner.users.insert(id, user);
    }

    /// Makes the next store call fail as if the database were unavailable.
    pub fn fail_next_operation(&self) {
        self.inner.lock().unwrap().fail_next = true;
    }

    fn check_failure(inner: &mut InMemoryUsers) -> Result<()> {
        if std::mem::take(&mut inner.fail_next) {
            bail!("disk I/O error");
        }
        Ok(())
    }
}

impl UserStore for InMemoryUserStore {
    fn get_all_users(&self) -> Result<Vec<User>> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        Ok(inner.users.values().cloned().collect())
    }

    fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        Ok(inner.users.get(&user_id).cloned())
    }

    fn save_user(&self, mut user: User) -> Result<User> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        let id = match user.id {
            Some(id) => id,
            None => inner.last_id + 1,
        };
        inner.last_id = inner.last_id.max(id);
        user.id = Some(id);
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    fn delete_user(&self, user_id: i64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        inner.users.remove(&user_id);
        Ok(())
    }
}

/// Answers every request with the same scripted reply and records what it got.
pub struct FakeDownstream {
    service: DownstreamService,
    reply: Mutex<Option<DownstreamResponse>>,
    calls: Mutex<Vec<(&'static str, String)>>,
}

impl FakeDownstream {
    pub fn replying(
        service: DownstreamService,
        status: StatusCode,
        body: &str,
    ) -> Arc<FakeDownstream> {
        Arc::new(FakeDownstream {
            service,
            reply: Mutex::new(Some(DownstreamResponse::new(status, body.to_string()))),
            calls: Mutex::new(vec![]),
        })
    }

    pub fn set_reply(&self, status: StatusCode, body: &str) {
        self.set_response(DownstreamResponse::new(status, body.to_string()));
    }

    pub fn set_response(&self, response: DownstreamResponse) {
        *self.reply.lock().unwrap() = Some(response);
    }

    /// Every following request fails at the transport level.
    pub fn set_unreachable(&self) {
        *self.reply.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<(&'static str, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(
        &self,
        method: &'static str,
        path: &ResourcePath,
    ) -> Result<DownstreamResponse, DownstreamError> {
        self.calls
            .lock()
            .unwrap()
            .push((method, path.as_str().to_string()));
        match self.reply.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => Err(DownstreamError::Transport {
                service: self.service,
                method,
                url: path.to_url("http://unreachable"),
                message: "connection refused".to_string(),
            }),
        }
    }
}

#[async_trait]
impl DownstreamClient for FakeDownstream {
    fn service(&self) -> DownstreamService {
        self.service
    }

    async fn get(&self, path: &ResourcePath) -> Result<DownstreamResponse, DownstreamError> {
        self.answer("GET", path)
    }

    async fn post(&self, path: &ResourcePath) -> Result<DownstreamResponse, DownstreamError> {
        self.answer("POST", path)
    }

    async fn delete(&self, path: &ResourcePath) -> Result<DownstreamResponse, DownstreamError> {
        self.answer("DELETE", path)
    }
}
