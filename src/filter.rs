//! Query-string filters for the employee and attendance listings.
//!
//! Filters are parsed once from the raw query and then either evaluated as
//! predicates (in-memory store) or rendered to SQL (MySQL store).

use chrono::NaiveDate;
use serde::Deserialize;
use std::cmp::Ordering;
use utoipa::IntoParams;

use crate::model::{attendance::Attendance, employee::Employee};
use crate::validation::attendance::DATE_FORMAT;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// Case-insensitive substring of the department
    pub department: Option<String>,
    /// Case-insensitive substring of full name, employee ID or email
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Exact external employee ID
    pub employee_id: Option<String>,
    /// Exact employee surrogate key
    pub employee: Option<String>,
    /// Inclusive lower date bound (YYYY-MM-DD), ignored when malformed
    pub date_from: Option<String>,
    /// Inclusive upper date bound (YYYY-MM-DD), ignored when malformed
    pub date_to: Option<String>,
    /// Present or Absent
    pub status: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    pub search: Option<String>,
}

impl From<&EmployeeQuery> for EmployeeFilter {
    fn from(query: &EmployeeQuery) -> Self {
        Self {
            department: non_empty(&query.department),
            search: non_empty(&query.search),
        }
    }
}

impl EmployeeFilter {
    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(department) = &self.department {
            if !contains_ci(&employee.department, department) {
                return false;
            }
        }

        if let Some(search) = &self.search {
            return contains_ci(&employee.full_name, search)
                || contains_ci(&employee.employee_id, search)
                || contains_ci(&employee.email, search);
        }

        true
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub employee_code: Option<String>,
    pub employee: Option<u64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<String>,
}

impl From<&AttendanceQuery> for AttendanceFilter {
    // Unparseable bounds and employee keys are dropped, not rejected.
    fn from(query: &AttendanceQuery) -> Self {
        Self {
            employee_code: non_empty(&query.employee_id),
            employee: non_empty(&query.employee).and_then(|raw| raw.parse().ok()),
            date_from: parse_date(&query.date_from),
            date_to: parse_date(&query.date_to),
            status: non_empty(&query.status),
        }
    }
}

impl AttendanceFilter {
    pub fn matches(&self, record: &Attendance) -> bool {
        self.employee_code
            .as_ref()
            .is_none_or(|code| record.employee_code == *code)
            && self.employee.is_none_or(|id| record.employee == id)
            && self.date_from.is_none_or(|from| record.date >= from)
            && self.date_to.is_none_or(|to| record.date <= to)
            && self
                .status
                .as_ref()
                .is_none_or(|status| record.status.as_ref() == status)
    }
}

/// Employee listing order: external ID ascending.
pub fn employee_order(a: &Employee, b: &Employee) -> Ordering {
    a.employee_id.cmp(&b.employee_id)
}

/// Attendance listing order: newest date first, then external employee ID.
pub fn attendance_order(a: &Attendance, b: &Attendance) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| a.employee_code.cmp(&b.employee_code))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

fn parse_date(value: &Option<String>) -> Option<NaiveDate> {
    non_empty(value).and_then(|raw| NaiveDate::parse_from_str(&raw, DATE_FORMAT).ok())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;
    use chrono::{TimeZone, Utc};

    fn employee(employee_id: &str, full_name: &str, email: &str, department: &str) -> Employee {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Employee {
            id: 1,
            employee_id: employee_id.into(),
            full_name: full_name.into(),
            email: email.into(),
            department: department.into(),
            created_at: at,
            updated_at: at,
        }
    }

    fn record(employee: u64, code: &str, date: &str, status: AttendanceStatus) -> Attendance {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Attendance {
            id: 1,
            employee,
            employee_code: code.into(),
            employee_name: "Someone".into(),
            department: "IT".into(),
            date: NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap(),
            status,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn department_is_case_insensitive_substring() {
        let filter = EmployeeFilter::from(&EmployeeQuery {
            department: Some("engine".into()),
            search: None,
        });

        assert!(filter.matches(&employee("E1", "A", "a@x.io", "Engineering")));
        assert!(!filter.matches(&employee("E2", "B", "b@x.io", "HR")));
    }

    #[test]
    fn search_matches_name_or_id_or_email() {
        let filter = EmployeeFilter::from(&EmployeeQuery {
            department: None,
            search: Some("DOE".into()),
        });

        assert!(filter.matches(&employee("E1", "John Doe", "j@x.io", "IT")));
        assert!(filter.matches(&employee("DOE7", "Ann", "a@x.io", "IT")));
        assert!(filter.matches(&employee("E3", "Ann", "jane.doe@x.io", "IT")));
        assert!(!filter.matches(&employee("E4", "Ann", "ann@x.io", "IT")));
    }

    #[test]
    fn department_and_search_combine_with_and() {
        let filter = EmployeeFilter::from(&EmployeeQuery {
            department: Some("it".into()),
            search: Some("ann".into()),
        });

        assert!(filter.matches(&employee("E1", "Ann", "a@x.io", "IT")));
        assert!(!filter.matches(&employee("E2", "Ann", "a@x.io", "HR")));
        assert!(!filter.matches(&employee("E3", "Bob", "b@x.io", "IT")));
    }

    #[test]
    fn malformed_date_bounds_are_ignored() {
        let filter = AttendanceFilter::from(&AttendanceQuery {
            date_from: Some("not-a-date".into()),
            date_to: Some("2026-13-40".into()),
            ..Default::default()
        });

        assert_eq!(filter, AttendanceFilter::default());
        assert!(filter.matches(&record(1, "E1", "1999-01-01", AttendanceStatus::Absent)));
    }

    #[test]
    fn non_numeric_employee_reference_is_ignored() {
        let filter = AttendanceFilter::from(&AttendanceQuery {
            employee: Some("abc".into()),
            ..Default::default()
        });

        assert_eq!(filter.employee, None);
    }

    #[test]
    fn attendance_conditions_are_conjunctive_and_inclusive() {
        let filter = AttendanceFilter::from(&AttendanceQuery {
            employee_id: Some("E1".into()),
            employee: Some("1".into()),
            date_from: Some("2026-01-01".into()),
            date_to: Some("2026-01-31".into()),
            status: Some("Present".into()),
        });

        assert!(filter.matches(&record(1, "E1", "2026-01-01", AttendanceStatus::Present)));
        assert!(filter.matches(&record(1, "E1", "2026-01-31", AttendanceStatus::Present)));
        assert!(!filter.matches(&record(1, "E1", "2026-02-01", AttendanceStatus::Present)));
        assert!(!filter.matches(&record(1, "E1", "2026-01-10", AttendanceStatus::Absent)));
        assert!(!filter.matches(&record(2, "E1", "2026-01-10", AttendanceStatus::Present)));
        assert!(!filter.matches(&record(1, "E2", "2026-01-10", AttendanceStatus::Present)));
    }

    #[test]
    fn attendance_sorts_by_date_desc_then_employee_code() {
        let mut records = vec![
            record(2, "E2", "2026-01-01", AttendanceStatus::Present),
            record(1, "E1", "2026-01-01", AttendanceStatus::Present),
            record(1, "E1", "2026-01-05", AttendanceStatus::Absent),
        ];
        records.sort_by(attendance_order);

        let keys: Vec<_> = records
            .iter()
            .map(|r| (r.date.to_string(), r.employee_code.clone()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2026-01-05".to_string(), "E1".to_string()),
                ("2026-01-01".to_string(), "E1".to_string()),
                ("2026-01-01".to_string(), "E2".to_string()),
            ]
        );
    }
}
