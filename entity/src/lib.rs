//! sea-orm entities for the HR schema.

pub mod attendance;
pub mod compliance_records;
pub mod departments;
pub mod documents;
pub mod employees;
pub mod leave_requests;
pub mod sessions;
pub mod users;
