use super::user_models::User;
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Returns every stored user, ordered by id.
    /// Returns Err if there is a database error.
    fn get_all_users(&self) -> Result<Vec<User>>;

    /// Returns the user with the given id.
    /// Returns Ok(None) if the user does not exist.
    /// Returns Err if there is a database error.
    fn get_user(&self, user_id: i64) -> Result<Option<User>>;

    /// Persists a user and returns the stored record.
    /// A user without id is inserted and receives a fresh id, a user with an
    /// id replaces the record stored under that id (inserting it if missing).
    fn save_user(&self, user: User) -> Result<User>;

    /// Deletes the user with the given id.
    /// Deleting a user that does not exist is not an error.
    fn delete_user(&self, user_id: i64) -> Result<()>;
}
