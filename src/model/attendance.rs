use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// Attendance row joined with the owning employee's identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Attendance {
    pub id: u64,
    /// Surrogate key of the employee.
    pub employee: u64,
    /// External `employee_id` of the employee.
    pub employee_code: String,
    pub employee_name: String,
    pub department: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.employee_code, self.date, self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub employee: u64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Full projection returned by create, retrieve and update.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttendanceDetail {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee: u64,
    #[schema(example = "EMP001")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(example = "2026-01-01T09:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-01-01T09:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<Attendance> for AttendanceDetail {
    fn from(record: Attendance) -> Self {
        Self {
            id: record.id,
            employee: record.employee,
            employee_id: record.employee_code,
            employee_name: record.employee_name,
            date: record.date,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Listing projection, also used for the dashboard's recent records.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttendanceListItem {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "EMP001")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    #[schema(example = "IT")]
    pub department: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(example = "2026-01-01T09:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<Attendance> for AttendanceListItem {
    fn from(record: Attendance) -> Self {
        Self {
            id: record.id,
            employee_id: record.employee_code,
            employee_name: record.employee_name,
            department: record.department,
            date: record.date,
            status: record.status,
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[test]
    fn status_uses_capitalised_wire_names() {
        assert_eq!(AttendanceStatus::from_str("Present").unwrap(), AttendanceStatus::Present);
        assert_eq!(AttendanceStatus::Absent.as_ref(), "Absent");
        assert!(AttendanceStatus::from_str("present").is_err());
        assert_eq!(
            serde_json::to_value(AttendanceStatus::Present).unwrap(),
            serde_json::json!("Present")
        );
    }

    #[test]
    fn display_names_employee_date_and_status() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap();
        let record = Attendance {
            id: 7,
            employee: 1,
            employee_code: "EMP001".into(),
            employee_name: "John Doe".into(),
            department: "IT".into(),
            date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            status: AttendanceStatus::Present,
            created_at: at,
            updated_at: at,
        };

        assert_eq!(record.to_string(), "EMP001 - 2026-01-02 - Present");

        let item = AttendanceListItem::from(record.clone());
        assert_eq!(item.employee_id, "EMP001");
        assert_eq!(item.department, "IT");

        let detail = AttendanceDetail::from(record);
        assert_eq!(detail.employee, 1);
        assert_eq!(detail.employee_name, "John Doe");
    }
}
