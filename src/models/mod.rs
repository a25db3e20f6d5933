pub mod attendance_records;
pub mod attendance_sessions;
pub mod reports;
