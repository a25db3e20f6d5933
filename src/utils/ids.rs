use uuid::Uuid;

use crate::errors::{AttendanceError, Result};

// 外部标识以 UUID 文本形式存储
pub fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| AttendanceError::database_operation(format!("无效的标识 '{value}': {e}")))
}

pub fn parse_uuid_opt(value: Option<&str>) -> Result<Option<Uuid>> {
    value.map(parse_uuid).transpose()
}
