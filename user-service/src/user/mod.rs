mod sqlite_user_store;
mod user_models;
mod user_service;
mod user_store;

pub use sqlite_user_store::SqliteUserStore;
pub use user_models::{User, UserPayload};
pub use user_service::{DownstreamClients, UserService, UserServiceError, UserServiceResult};
pub use user_store::UserStore;
