use serde::{Deserialize, Serialize};

/// A user account as stored and as returned to clients.
///
/// Every field but the id may be missing: accounts are created from whatever
/// the client sends, without required-field validation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct User {
    /// Assigned by the store on first save, `None` only for not-yet-saved users.
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Body accepted when creating or updating a user.
///
/// A client-provided `id` is tolerated but never honored, the store owns ids.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct UserPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl UserPayload {
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// A new, unsaved user carrying the payload's fields.
    pub fn into_new_user(self) -> User {
        User {
            id: None,
            username: self.username,
            email: self.email,
            role: self.role,
        }
    }

    /// Applies the mutable fields onto an existing user.
    ///
    /// Only username and email are overwritten; id and role are left as they are.
    pub fn apply_to(self, user: &mut User) {
        user.username = self.username;
        user.email = self.email;
    }
}
