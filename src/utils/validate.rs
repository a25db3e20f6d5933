use chrono::NaiveDate;

use crate::errors::{AttendanceError, Result};

/// 日期不得晚于今天
pub fn validate_not_future(date: NaiveDate, today: NaiveDate) -> Result<()> {
    if date > today {
        return Err(AttendanceError::validation(format!(
            "date {date} is in the future (today is {today})"
        )));
    }
    Ok(())
}

/// 闭区间 [start, end]，start 不得晚于 end
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(AttendanceError::validation(format!(
            "range start {start} is after end {end}"
        )));
    }
    Ok(())
}

pub fn validate_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AttendanceError::validation(format!(
            "{field} must not be blank"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_today_is_not_future() {
        assert!(validate_not_future(day(10), day(10)).is_ok());
        assert!(validate_not_future(day(9), day(10)).is_ok());
        assert!(validate_not_future(day(11), day(10)).is_err());
    }

    #[test]
    fn test_single_day_range_is_valid() {
        assert!(validate_date_range(day(5), day(5)).is_ok());
        assert!(validate_date_range(day(6), day(5)).is_err());
    }

    #[test]
    fn test_blank_values() {
        assert!(validate_not_blank("reason", "incomplete").is_ok());
        let err = validate_not_blank("reason", " \t").unwrap_err();
        assert!(err.message().contains("reason"));
    }
}
