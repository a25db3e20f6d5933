//! 出勤率计算
//!
//! 纯函数，无副作用、无状态。

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::attendance_records::entities::{AttendanceRecord, AttendanceStatus};
use crate::models::reports::responses::AttendanceRate;

/// 统计出勤率，`rate_percent = present / total * 100`，保留两位小数
pub fn rate(records: &[AttendanceRecord]) -> AttendanceRate {
    tally(records.iter())
}

/// 仅统计闭区间 [start, end] 内的记录
pub fn rate_for_range(
    records: &[AttendanceRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> AttendanceRate {
    tally(records.iter().filter(|r| r.date >= start && r.date <= end))
}

/// 单个学生的出勤比例（0.0 ~ 1.0）
pub fn student_rate(records: &[AttendanceRecord], student_id: Uuid) -> f64 {
    let (present, total) = records
        .iter()
        .filter(|r| r.student_id == student_id)
        .fold((0u32, 0u32), |(present, total), r| {
            let present = present + u32::from(r.status == AttendanceStatus::Present);
            (present, total + 1)
        });

    if total == 0 {
        return 0.0;
    }
    present as f64 / total as f64
}

fn tally<'a>(records: impl Iterator<Item = &'a AttendanceRecord>) -> AttendanceRate {
    let mut result = AttendanceRate::default();

    for record in records {
        result.total += 1;
        match record.status {
            AttendanceStatus::Present => result.present += 1,
            AttendanceStatus::Absent => result.absent += 1,
            AttendanceStatus::Late => result.late += 1,
            AttendanceStatus::Excused => result.excused += 1,
        }
    }

    if result.total > 0 {
        // 保留两位小数
        result.rate_percent =
            (result.present as f64 / result.total as f64 * 100.0 * 100.0).round() / 100.0;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance_records::entities::RecordProvenance;
    use chrono::Utc;

    fn record(student_id: Uuid, day: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: 0,
            student_id,
            class_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            status,
            provenance: RecordProvenance::Marked {
                marked_by: Uuid::nil(),
            },
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        assert_eq!(
            rate(&[]),
            AttendanceRate {
                rate_percent: 0.0,
                total: 0,
                present: 0,
                absent: 0,
                late: 0,
                excused: 0,
            }
        );
    }

    #[test]
    fn test_three_present_one_absent() {
        let s = Uuid::new_v4();
        let records = vec![
            record(s, 1, AttendanceStatus::Present),
            record(s, 2, AttendanceStatus::Present),
            record(s, 3, AttendanceStatus::Present),
            record(s, 4, AttendanceStatus::Absent),
        ];
        assert_eq!(
            rate(&records),
            AttendanceRate {
                rate_percent: 75.0,
                total: 4,
                present: 3,
                absent: 1,
                late: 0,
                excused: 0,
            }
        );
    }

    #[test]
    fn test_rate_rounds_to_two_decimals() {
        let s = Uuid::new_v4();
        let records = vec![
            record(s, 1, AttendanceStatus::Present),
            record(s, 2, AttendanceStatus::Late),
            record(s, 3, AttendanceStatus::Excused),
        ];
        let result = rate(&records);
        assert_eq!(result.rate_percent, 33.33);
        assert_eq!(result.late, 1);
        assert_eq!(result.excused, 1);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let s = Uuid::new_v4();
        let records = vec![
            record(s, 1, AttendanceStatus::Absent),
            record(s, 2, AttendanceStatus::Present),
            record(s, 5, AttendanceStatus::Present),
            record(s, 6, AttendanceStatus::Absent),
        ];
        let start = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();

        let result = rate_for_range(&records, start, end);
        assert_eq!(result.total, 2);
        assert_eq!(result.rate_percent, 100.0);
    }

    #[test]
    fn test_student_rate_is_a_fraction_for_one_student() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let records = vec![
            record(alice, 1, AttendanceStatus::Present),
            record(alice, 2, AttendanceStatus::Absent),
            record(bob, 1, AttendanceStatus::Absent),
        ];
        assert_eq!(student_rate(&records, alice), 0.5);
        assert_eq!(student_rate(&records, bob), 0.0);
        assert_eq!(student_rate(&records, Uuid::new_v4()), 0.0);
    }
}
