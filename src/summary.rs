use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::model::{
    attendance::{Attendance, AttendanceListItem, AttendanceStatus},
    employee::Employee,
};

pub const RECENT_ATTENDANCE_LIMIT: usize = 10;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub present: i64,
    pub absent: i64,
}

impl StatusCounts {
    pub fn total(&self) -> i64 {
        self.present + self.absent
    }

    pub fn tally(statuses: impl IntoIterator<Item = AttendanceStatus>) -> Self {
        statuses.into_iter().fold(Self::default(), |mut counts, status| {
            match status {
                AttendanceStatus::Present => counts.present += 1,
                AttendanceStatus::Absent => counts.absent += 1,
            }
            counts
        })
    }

    /// From `(status, count)` rows of a `GROUP BY status` query. Unknown
    /// status strings are skipped.
    pub fn from_groups(groups: impl IntoIterator<Item = (String, i64)>) -> Self {
        groups
            .into_iter()
            .fold(Self::default(), |mut counts, (status, n)| {
                match AttendanceStatus::from_str(&status) {
                    Ok(AttendanceStatus::Present) => counts.present += n,
                    Ok(AttendanceStatus::Absent) => counts.absent += n,
                    Err(_) => {}
                }
                counts
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeAttendanceSummary {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "EMP001")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
    #[schema(example = "john.doe@example.com")]
    pub email: String,
    #[schema(example = "IT")]
    pub department: String,
    #[schema(example = 20)]
    pub total_present_days: i64,
    #[schema(example = 2)]
    pub total_absent_days: i64,
    #[schema(example = 22)]
    pub total_records: i64,
}

impl EmployeeAttendanceSummary {
    pub fn new(employee: Employee, counts: StatusCounts) -> Self {
        Self {
            id: employee.id,
            employee_id: employee.employee_id,
            full_name: employee.full_name,
            email: employee.email,
            department: employee.department,
            total_present_days: counts.present,
            total_absent_days: counts.absent,
            total_records: counts.total(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TodayAttendance {
    pub present: i64,
    pub absent: i64,
    pub total: i64,
}

impl From<StatusCounts> for TodayAttendance {
    fn from(counts: StatusCounts) -> Self {
        Self {
            present: counts.present,
            absent: counts.absent,
            total: counts.total(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow, ToSchema)]
pub struct DepartmentCount {
    #[schema(example = "IT")]
    pub department: String,
    #[schema(example = 2)]
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Dashboard {
    pub total_employees: i64,
    pub total_attendance_records: i64,
    pub today_attendance: TodayAttendance,
    pub recent_attendance: Vec<AttendanceListItem>,
    pub department_stats: Vec<DepartmentCount>,
}

/// Employees per department, largest first, ties by department name.
pub fn department_stats<'a>(departments: impl IntoIterator<Item = &'a str>) -> Vec<DepartmentCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for department in departments {
        *counts.entry(department).or_default() += 1;
    }

    let mut stats: Vec<DepartmentCount> = counts
        .into_iter()
        .map(|(department, count)| DepartmentCount {
            department: department.to_string(),
            count,
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.department.cmp(&b.department)));
    stats
}

/// The `limit` newest records by date, then creation time.
pub fn most_recent(mut records: Vec<Attendance>, limit: usize) -> Vec<AttendanceListItem> {
    records.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    records
        .into_iter()
        .take(limit)
        .map(AttendanceListItem::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    #[test]
    fn tally_counts_each_status() {
        use AttendanceStatus::*;
        let counts = StatusCounts::tally([Present, Absent, Present]);
        assert_eq!(counts, StatusCounts { present: 2, absent: 1 });
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn from_groups_skips_unknown_status() {
        let counts = StatusCounts::from_groups([
            ("Present".to_string(), 4),
            ("Absent".to_string(), 1),
            ("Late".to_string(), 9),
        ]);
        assert_eq!(TodayAttendance::from(counts), TodayAttendance { present: 4, absent: 1, total: 5 });
    }

    #[test]
    fn department_stats_orders_by_count_desc() {
        let stats = department_stats(["HR", "IT", "IT", "Ops"]);
        assert_eq!(
            stats,
            vec![
                DepartmentCount { department: "IT".into(), count: 2 },
                DepartmentCount { department: "HR".into(), count: 1 },
                DepartmentCount { department: "Ops".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn most_recent_breaks_date_ties_by_creation_time() {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let records: Vec<Attendance> = (0..12u64)
            .map(|i| Attendance {
                id: i + 1,
                employee: i + 1,
                employee_code: format!("E{i}"),
                employee_name: "X".into(),
                department: "IT".into(),
                date: if i == 0 { day + Duration::days(1) } else { day },
                status: AttendanceStatus::Present,
                created_at: base + Duration::minutes(i as i64),
                updated_at: base,
            })
            .collect();

        let recent = most_recent(records, RECENT_ATTENDANCE_LIMIT);
        let ids: Vec<u64> = recent.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 12, 11, 10, 9, 8, 7, 6, 5, 4]);
    }
}
