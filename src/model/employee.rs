use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": "EMP001",
        "full_name": "John Doe",
        "email": "john.doe@example.com",
        "department": "IT",
        "created_at": "2026-01-01T09:00:00Z",
        "updated_at": "2026-01-01T09:00:00Z"
    })
)]
pub struct Employee {
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

    #[schema(example = "2026-01-01T09:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,

    #[schema(example = "2026-01-01T09:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.employee_id, self.full_name)
    }
}

/// Validated, normalized employee fields ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
}

/// Dropdown projection.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeBrief {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "EMP001")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
    #[schema(example = "IT")]
    pub department: String,
}

impl From<&Employee> for EmployeeBrief {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            employee_id: employee.employee_id.clone(),
            full_name: employee.full_name.clone(),
            department: employee.department.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_joins_external_id_and_name() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let employee = Employee {
            id: 1,
            employee_id: "EMP001".into(),
            full_name: "John Doe".into(),
            email: "john.doe@example.com".into(),
            department: "IT".into(),
            created_at: at,
            updated_at: at,
        };

        assert_eq!(employee.to_string(), "EMP001 - John Doe");
        assert_eq!(EmployeeBrief::from(&employee).department, "IT");
    }
}
