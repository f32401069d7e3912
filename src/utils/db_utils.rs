use chrono::NaiveDate;
use sqlx::{MySql, mysql::MySqlArguments, query::QueryAs};

use crate::filter::{AttendanceFilter, EmployeeFilter};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    Date(NaiveDate),
}

/// ===============================
/// WHERE clause container
/// ===============================
#[derive(Debug, Default)]
pub struct SqlWhere {
    conditions: Vec<&'static str>,
    pub values: Vec<SqlValue>,
}

impl SqlWhere {
    fn push(&mut self, condition: &'static str, values: impl IntoIterator<Item = SqlValue>) {
        self.conditions.push(condition);
        self.values.extend(values);
    }

    /// Empty string when no condition was pushed.
    pub fn clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

fn like(term: &str) -> SqlValue {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    SqlValue::String(format!("%{}%", escaped.to_lowercase()))
}

/// ===============================
/// Employee listing WHERE (table alias `e`)
/// ===============================
pub fn employee_where(filter: &EmployeeFilter) -> SqlWhere {
    let mut sql = SqlWhere::default();

    if let Some(department) = &filter.department {
        sql.push("LOWER(e.department) LIKE ?", [like(department)]);
    }

    if let Some(search) = &filter.search {
        let pattern = like(search);
        sql.push(
            "(LOWER(e.full_name) LIKE ? OR LOWER(e.employee_id) LIKE ? OR LOWER(e.email) LIKE ?)",
            [pattern.clone(), pattern.clone(), pattern],
        );
    }

    sql
}

/// ===============================
/// Attendance listing WHERE (aliases `a`, `e`)
/// ===============================
pub fn attendance_where(filter: &AttendanceFilter) -> SqlWhere {
    let mut sql = SqlWhere::default();

    if let Some(code) = &filter.employee_code {
        sql.push("e.employee_id = ?", [SqlValue::String(code.clone())]);
    }
    if let Some(employee) = filter.employee {
        sql.push("a.employee_id = ?", [SqlValue::U64(employee)]);
    }
    if let Some(from) = filter.date_from {
        sql.push("a.date >= ?", [SqlValue::Date(from)]);
    }
    if let Some(to) = filter.date_to {
        sql.push("a.date <= ?", [SqlValue::Date(to)]);
    }
    if let Some(status) = &filter.status {
        sql.push("a.status = ?", [SqlValue::String(status.clone())]);
    }

    sql
}

/// ===============================
/// Bind values in order
/// ===============================
pub fn bind_values<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    values: Vec<SqlValue>,
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for value in values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filter_renders_no_where() {
        let sql = employee_where(&EmployeeFilter::default());
        assert_eq!(sql.clause(), "");
        assert!(sql.values.is_empty());
    }

    #[test]
    fn search_binds_one_pattern_per_column() {
        let sql = employee_where(&EmployeeFilter {
            department: Some("IT".into()),
            search: Some("Doe".into()),
        });

        assert_eq!(
            sql.clause(),
            "WHERE LOWER(e.department) LIKE ? AND (LOWER(e.full_name) LIKE ? OR LOWER(e.employee_id) LIKE ? OR LOWER(e.email) LIKE ?)"
        );
        assert_eq!(sql.values.len(), 4);
        assert_eq!(sql.values[0], SqlValue::String("%it%".into()));
        assert_eq!(sql.values[3], SqlValue::String("%doe%".into()));
    }

    #[test]
    fn like_escapes_wildcards() {
        assert_eq!(like("50%_off"), SqlValue::String("%50\\%\\_off%".into()));
    }

    #[test]
    fn attendance_bounds_bind_in_clause_order() {
        let from = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let sql = attendance_where(&AttendanceFilter {
            employee: Some(3),
            date_from: Some(from),
            status: Some("Absent".into()),
            ..Default::default()
        });

        assert_eq!(
            sql.clause(),
            "WHERE a.employee_id = ? AND a.date >= ? AND a.status = ?"
        );
        assert_eq!(
            sql.values,
            vec![
                SqlValue::U64(3),
                SqlValue::Date(from),
                SqlValue::String("Absent".into())
            ]
        );
    }
}
