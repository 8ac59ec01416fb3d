//! Persisted login sessions for customers and operators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Email;

/// The signed-in customer, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub email: Email,
    pub name: String,
}

/// The signed-in operator of the back-office console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub username: String,
    pub started_at: DateTime<Utc>,
}
