//! Identity conflict checks. The stores call these inside their atomic
//! write, over whatever existing rows could possibly collide.

use chrono::NaiveDate;

use crate::model::{attendance::NewAttendance, employee::NewEmployee};
use crate::validation::FieldErrors;

pub const DUPLICATE_EMPLOYEE_ID: &str = "An employee with this ID already exists.";
pub const DUPLICATE_EMAIL: &str = "An employee with this email already exists.";

pub struct EmployeeKey<'a> {
    pub id: u64,
    pub employee_id: &'a str,
    pub email: &'a str,
}

pub struct AttendanceKey {
    pub id: u64,
    pub employee: u64,
    pub date: NaiveDate,
}

/// Fails when another employee already holds the candidate's external ID or
/// email. `exclude` is the surrogate key of the record being updated.
pub fn check_employee<'a>(
    candidate: &NewEmployee,
    exclude: Option<u64>,
    existing: impl IntoIterator<Item = EmployeeKey<'a>>,
) -> Result<(), FieldErrors> {
    let mut id_taken = false;
    let mut email_taken = false;

    for other in existing.into_iter().filter(|other| Some(other.id) != exclude) {
        id_taken |= other.employee_id == candidate.employee_id;
        email_taken |= other.email.to_lowercase() == candidate.email.to_lowercase();
    }

    let mut errors = FieldErrors::new();
    if id_taken {
        errors.add("employee_id", DUPLICATE_EMPLOYEE_ID);
    }
    if email_taken {
        errors.add("email", DUPLICATE_EMAIL);
    }
    errors.into_result(())
}

/// Fails when another record exists for the same employee on the same day.
pub fn check_attendance(
    candidate: &NewAttendance,
    employee_name: &str,
    exclude: Option<u64>,
    existing: impl IntoIterator<Item = AttendanceKey>,
) -> Result<(), FieldErrors> {
    let clash = existing.into_iter().any(|other| {
        Some(other.id) != exclude && other.employee == candidate.employee && other.date == candidate.date
    });

    if clash {
        Err(duplicate_attendance(employee_name, candidate.date))
    } else {
        Ok(())
    }
}

pub fn duplicate_attendance(employee_name: &str, date: NaiveDate) -> FieldErrors {
    FieldErrors::non_field(format!(
        "Attendance record for {employee_name} on {date} already exists."
    ))
}
