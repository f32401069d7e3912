use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use utoipa::ToSchema;

use super::{FieldErrors, REQUIRED};
use crate::model::attendance::{Attendance, AttendanceStatus, NewAttendance};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AttendanceInput {
    /// Surrogate key of the employee, as a number or a numeric string.
    #[schema(example = 1, value_type = u64)]
    pub employee: Option<Value>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: Option<String>,
    #[schema(example = "Present", value_type = AttendanceStatus)]
    pub status: Option<String>,
}

impl AttendanceInput {
    pub fn merged_over(self, existing: &Attendance) -> Self {
        Self {
            employee: self.employee.or_else(|| Some(Value::from(existing.employee))),
            date: self
                .date
                .or_else(|| Some(existing.date.format(DATE_FORMAT).to_string())),
            status: self.status.or_else(|| Some(existing.status.to_string())),
        }
    }
}

/// Checks field shapes and that the date is not after `today`. Whether the
/// referenced employee exists is up to the record store.
pub fn validate_attendance(
    input: &AttendanceInput,
    today: NaiveDate,
) -> Result<NewAttendance, FieldErrors> {
    let mut errors = FieldErrors::new();

    let employee = match &input.employee {
        None => {
            errors.add("employee", REQUIRED);
            None
        }
        Some(raw) => match employee_pk(raw) {
            Ok(id) => Some(id),
            Err(reason) => {
                errors.add("employee", reason);
                None
            }
        },
    };

    let date = match input.date.as_deref().map(str::trim) {
        None => {
            errors.add("date", REQUIRED);
            None
        }
        Some(raw) => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Err(_) => {
                errors.add(
                    "date",
                    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
                );
                None
            }
            Ok(date) if date > today => {
                errors.add("date", "Attendance date cannot be in the future.");
                None
            }
            Ok(date) => Some(date),
        },
    };

    let status = match input.status.as_deref() {
        None => {
            errors.add("status", REQUIRED);
            None
        }
        Some(raw) => match AttendanceStatus::from_str(raw) {
            Ok(status) => Some(status),
            Err(_) => {
                errors.add("status", format!("\"{raw}\" is not a valid choice."));
                None
            }
        },
    };

    match (employee, date, status) {
        (Some(employee), Some(date), Some(status)) => errors.into_result(NewAttendance {
            employee,
            date,
            status,
        }),
        _ => Err(errors),
    }
}

fn employee_pk(raw: &Value) -> Result<u64, String> {
    let type_name = match raw {
        Value::Number(n) => {
            return n
                .as_u64()
                .ok_or_else(|| format!("Invalid pk \"{n}\" - object does not exist."));
        }
        Value::String(s) => match s.trim().parse::<u64>() {
            Ok(id) => return Ok(id),
            Err(_) => "str",
        },
        Value::Bool(_) => "bool",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
        Value::Null => "NoneType",
    };
    Err(format!("Incorrect type. Expected pk value, received {type_name}."))
}
