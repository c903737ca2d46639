use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::{
    error::{AppError, AppResult},
    vector,
};

// Row as read from the users table, vec still in its stored text form
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub vec: Option<String>,
}

// User as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub vec: Option<Vec<Value>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let vec = vector::decode(row.vec.as_deref());
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            vec,
        }
    }
}

/// Create/update payload. Every field is optional so that a partial or
/// malformed body still reaches validation instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub vec: Option<Value>,
}

impl UserInput {
    /// Parse a raw request body; anything unreadable becomes the empty payload.
    pub fn from_body(body: &[u8]) -> Self {
        let parsed = match serde_json::from_slice::<Value>(body) {
            Ok(object @ Value::Object(_)) => serde_json::from_value(object),
            Ok(other) => {
                tracing::debug!("Request body is not a JSON object, treated as empty: {}", other);
                return UserInput::default();
            }
            Err(e) => Err(e),
        };

        parsed.unwrap_or_else(|e| {
            tracing::debug!("Unreadable request body treated as empty: {}", e);
            UserInput::default()
        })
    }

    /// Validate required fields and encode the vector for storage.
    pub fn into_new_user(self) -> AppResult<NewUser> {
        let name = self.name.filter(|name| !name.is_empty());
        let email = self.email.filter(|email| !email.is_empty());

        let (Some(name), Some(email)) = (name, email) else {
            return Err(AppError::validation("Missing name or email"));
        };

        let vec = vector::encode(self.vec.as_ref())?;

        Ok(NewUser { name, email, vec })
    }
}

// Validated values ready to be bound to a write statement
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub vec: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub success: bool,
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
