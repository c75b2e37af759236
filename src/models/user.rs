use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub national_id: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
}

/// Identity fields shared by every account, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub national_id: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Editable identity fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserChanges {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub national_id: Option<String>,
}

/// A user with whichever role profile it owns.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<super::doctor::Doctor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<super::patient::Patient>,
}
