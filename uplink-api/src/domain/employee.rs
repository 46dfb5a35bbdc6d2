use serde::Deserialize;

/// Read-only reference entity used as selection input for the evaluation
/// participant picker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub department_name: Option<String>,
}

/// Lenient form of an employee record. The listing may come from
/// `/employees`, `/users` or `/admin/users`, and those endpoints disagree on
/// field names; a record may even carry several spellings at once, so each
/// is kept separately and coalesced afterwards.
#[derive(Debug, Default, Deserialize)]
pub struct RawEmployee {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub employee_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub department_name: Option<String>,
}

/// The listing endpoints also disagree on the envelope shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EmployeeListResponse {
    Bare(Vec<RawEmployee>),
    Items { items: Vec<RawEmployee> },
    Data { data: Vec<RawEmployee> },
    Users { users: Vec<RawEmployee> },
}

impl EmployeeListResponse {
    /// Flatten whatever envelope came back into well-formed employees,
    /// dropping records without a usable id or name.
    pub fn into_employees(self) -> Vec<Employee> {
        let raw = match self {
            EmployeeListResponse::Bare(list) => list,
            EmployeeListResponse::Items { items } => items,
            EmployeeListResponse::Data { data } => data,
            EmployeeListResponse::Users { users } => users,
        };

        raw.into_iter()
            .filter_map(|r| {
                let id = r.id.or(r.user_id).or(r.employee_id)?;
                let name = r
                    .name
                    .or(r.username)
                    .or(r.full_name)
                    .or(r.employee_name)
                    .filter(|n| !n.is_empty())?;
                Some(Employee {
                    id,
                    name,
                    department_name: r.department_name,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_with_varying_field_names() {
        let json = r#"[
            {"user_id": 1, "username": "Ada"},
            {"employee_id": 2, "employee_name": "Grace", "department_name": "Ops"},
            {"id": 3, "name": "Lin", "username": "lin-alt"},
            {"name": "no id"}
        ]"#;
        let parsed: EmployeeListResponse = serde_json::from_str(json).unwrap();
        let employees = parsed.into_employees();

        assert_eq!(employees.len(), 3);
        assert_eq!(employees[0].name, "Ada");
        assert_eq!(employees[1].department_name.as_deref(), Some("Ops"));
        assert_eq!(employees[2].name, "Lin");
    }

    #[test]
    fn wrapped_envelopes() {
        let json = r#"{"users": [{"id": 5, "name": "Moss"}]}"#;
        let parsed: EmployeeListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.into_employees()[0].id, 5);

        let json = r#"{"items": [{"id": 6, "name": "Jen"}]}"#;
        let parsed: EmployeeListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.into_employees()[0].id, 6);
    }
}
