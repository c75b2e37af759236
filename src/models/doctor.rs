use serde::{Deserialize, Serialize};

use super::user::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub user_id: i64,
    pub specialty: String,
    pub phone: String,
}

/// Doctor joined with the identity fields of its user.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorProfile {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub user: User,
}
