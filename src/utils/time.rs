use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::{AttendanceError, Result};

/// 当前 UTC 日期，用于“不得晚于今天”的校验
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// 数据库中的时间戳统一为秒
pub fn from_timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| AttendanceError::database_operation(format!("无效的时间戳: {secs}")))
}

pub fn from_timestamp_opt(secs: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    secs.map(from_timestamp).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_timestamp_converts() {
        let at = from_timestamp(1_700_000_000).unwrap();
        assert_eq!(at.timestamp(), 1_700_000_000);
        assert_eq!(from_timestamp_opt(None).unwrap(), None);
    }

    #[test]
    fn test_out_of_range_timestamp_is_an_error() {
        let err = from_timestamp(i64::MAX).unwrap_err();
        assert!(matches!(err, AttendanceError::DatabaseOperation(_)));

        let err = from_timestamp_opt(Some(i64::MIN)).unwrap_err();
        assert!(matches!(err, AttendanceError::DatabaseOperation(_)));
    }
}
