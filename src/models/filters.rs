use super::enums::{AppointmentStatus, UserRole};

#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Default, Clone)]
pub struct SummaryFilter {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub medical_record_id: Option<i64>,
    pub appointment_id: Option<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub role: Option<UserRole>,
}
