use serde::{Deserialize, Serialize};

use super::user::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub user_id: i64,
    pub blood_type: String,
    pub address: String,
    pub phone: String,
    pub insurance: String,
}

/// Patient joined with the identity fields of its user.
#[derive(Debug, Clone, Serialize)]
pub struct PatientProfile {
    #[serde(flatten)]
    pub patient: Patient,
    pub user: User,
}
