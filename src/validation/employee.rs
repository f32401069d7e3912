use serde::Deserialize;
use utoipa::ToSchema;
use validator::ValidateEmail;

use super::{FieldErrors, required_text};
use crate::model::employee::{Employee, NewEmployee};

pub const EMPLOYEE_ID_MAX_LEN: usize = 20;
pub const FULL_NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 254;
pub const DEPARTMENT_MAX_LEN: usize = 50;

/// Employee write payload. Every field is optional on the wire so that a
/// missing field is reported per field instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EmployeeInput {
    #[schema(example = "EMP001", value_type = String)]
    pub employee_id: Option<String>,
    #[schema(example = "John Doe", value_type = String)]
    pub full_name: Option<String>,
    #[schema(example = "john.doe@example.com", format = "email", value_type = String)]
    pub email: Option<String>,
    #[schema(example = "IT", value_type = String)]
    pub department: Option<String>,
}

impl EmployeeInput {
    /// Fills the fields a partial update left out with the stored values.
    pub fn merged_over(self, existing: &Employee) -> Self {
        Self {
            employee_id: self.employee_id.or_else(|| Some(existing.employee_id.clone())),
            full_name: self.full_name.or_else(|| Some(existing.full_name.clone())),
            email: self.email.or_else(|| Some(existing.email.clone())),
            department: self.department.or_else(|| Some(existing.department.clone())),
        }
    }
}

pub fn validate_employee(input: &EmployeeInput) -> Result<NewEmployee, FieldErrors> {
    let mut errors = FieldErrors::new();

    let employee_id = required_text(
        &mut errors,
        "employee_id",
        input.employee_id.as_deref(),
        EMPLOYEE_ID_MAX_LEN,
    )
    .filter(|id| {
        let ok = id.chars().all(char::is_alphanumeric);
        if !ok {
            errors.add("employee_id", "Employee ID must contain only letters and numbers.");
        }
        ok
    });

    let full_name = required_text(
        &mut errors,
        "full_name",
        input.full_name.as_deref(),
        FULL_NAME_MAX_LEN,
    )
    .filter(|name| {
        let ok = !name.chars().any(is_digit);
        if !ok {
            errors.add("full_name", "Full name cannot contain numbers.");
        }
        ok
    });

    let email = required_text(&mut errors, "email", input.email.as_deref(), EMAIL_MAX_LEN)
        .map(|email| email.to_lowercase())
        .filter(|email| {
            let ok = email.validate_email() && has_dotted_domain(email);
            if !ok {
                errors.add("email", "Enter a valid email address.");
            }
            ok
        });

    let department = required_text(
        &mut errors,
        "department",
        input.department.as_deref(),
        DEPARTMENT_MAX_LEN,
    );

    match (employee_id, full_name, email, department) {
        (Some(employee_id), Some(full_name), Some(email), Some(department)) => errors.into_result(NewEmployee {
            employee_id,
            full_name,
            email,
            department,
        }),
        _ => Err(errors),
    }
}

/// Decimal and superscript digits. Letter numbers such as `Ⅷ` and
/// vulgar fractions do not count.
fn is_digit(c: char) -> bool {
    c.is_numeric()
        && !c.is_alphabetic()
        && !matches!(c, '\u{BC}'..='\u{BE}' | '\u{2150}'..='\u{215F}' | '\u{2189}')
}

/// The domain needs at least two non-empty labels, `localhost` aside.
fn has_dotted_domain(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((_, "localhost")) => true,
        Some((_, domain)) => {
            domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{BLANK, REQUIRED};

    fn input(employee_id: &str, full_name: &str, email: &str, department: &str) -> EmployeeInput {
        EmployeeInput {
            employee_id: Some(employee_id.into()),
            full_name: Some(full_name.into()),
            email: Some(email.into()),
            department: Some(department.into()),
        }
    }

    #[test]
    fn accepts_valid_employee_unchanged() {
        let valid = validate_employee(&input("EMP001", "John Doe", "john.doe@example.com", "IT")).unwrap();

        assert_eq!(valid.employee_id, "EMP001");
        assert_eq!(valid.full_name, "John Doe");
        assert_eq!(valid.email, "john.doe@example.com");
        assert_eq!(valid.department, "IT");
    }

    #[test]
    fn trims_name_and_lowercases_email() {
        let valid = validate_employee(&input(" EMP002 ", "  Jane Roe  ", "Jane.Roe@Example.COM", "HR")).unwrap();

        assert_eq!(valid.employee_id, "EMP002");
        assert_eq!(valid.full_name, "Jane Roe");
        assert_eq!(valid.email, "jane.roe@example.com");
    }

    #[test]
    fn rejects_non_alphanumeric_employee_id() {
        for bad in ["EMP-001", "EMP 001", "emp_1", "#1"] {
            let errors = validate_employee(&input(bad, "John Doe", "john@example.com", "IT")).unwrap_err();
            assert_eq!(
                errors.get("employee_id"),
                Some(&["Employee ID must contain only letters and numbers.".to_string()][..]),
                "{bad}"
            );
        }
    }

    #[test]
    fn rejects_blank_employee_id() {
        let errors = validate_employee(&input("", "John Doe", "john@example.com", "IT")).unwrap_err();
        assert_eq!(errors.get("employee_id"), Some(&[BLANK.to_string()][..]));
    }

    #[test]
    fn rejects_digits_in_full_name() {
        let errors = validate_employee(&input("EMP001", "John Doe 2", "john@example.com", "IT")).unwrap_err();
        assert_eq!(
            errors.get("full_name"),
            Some(&["Full name cannot contain numbers.".to_string()][..])
        );
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in [
            "not-an-email",
            "john@",
            "@example.com",
            "john doe@example.com",
            "john@example",
            "john@example.",
        ] {
            let errors = validate_employee(&input("EMP001", "John Doe", bad, "IT")).unwrap_err();
            assert!(errors.contains("email"), "{bad}");
        }
    }

    #[test]
    fn accepts_localhost_email() {
        let valid = validate_employee(&input("EMP001", "John Doe", "root@localhost", "IT")).unwrap();
        assert_eq!(valid.email, "root@localhost");
    }

    #[test]
    fn only_digits_count_as_numbers_in_full_name() {
        for ok in ["Henry Ⅷ", "Half ½ Moon"] {
            assert!(validate_employee(&input("EMP001", ok, "john@example.com", "IT")).is_ok(), "{ok}");
        }
        for bad in ["Agent ٣", "Mc²"] {
            let errors = validate_employee(&input("EMP001", bad, "john@example.com", "IT")).unwrap_err();
            assert!(errors.contains("full_name"), "{bad}");
        }
    }

    #[test]
    fn reports_every_missing_and_overlong_field() {
        let errors = validate_employee(&EmployeeInput {
            employee_id: Some("A".repeat(21)),
            ..Default::default()
        })
        .unwrap_err();

        assert_eq!(
            errors.get("employee_id"),
            Some(&["Ensure this field has no more than 20 characters.".to_string()][..])
        );
        for field in ["full_name", "email", "department"] {
            assert_eq!(errors.get(field), Some(&[REQUIRED.to_string()][..]));
        }
    }

    #[test]
    fn merged_over_keeps_stored_values_for_missing_fields() {
        let at = chrono::Utc::now();
        let existing = Employee {
            id: 3,
            employee_id: "EMP003".into(),
            full_name: "Old Name".into(),
            email: "old@example.com".into(),
            department: "Ops".into(),
            created_at: at,
            updated_at: at,
        };
        let patch = EmployeeInput {
            department: Some("Finance".into()),
            ..Default::default()
        };

        let merged = validate_employee(&patch.merged_over(&existing)).unwrap();
        assert_eq!(merged.employee_id, "EMP003");
        assert_eq!(merged.email, "old@example.com");
        assert_eq!(merged.department, "Finance");
    }
}
