use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub student_count: u32,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    #[serde(alias = "access_token")]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AssignStudentsRequest<'a> {
    pub student_ids: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct AssignBatchesRequest<'a> {
    pub batch_ids: &'a [String],
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// `detail` is usually a string but validation failures send a list of objects.
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.get("msg")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| item.to_string())
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}

/// Ids arrive as either JSON strings or integers depending on the resource.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or integer id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_and_string_ids() {
        let a: Student =
            serde_json::from_value(json!({"id": 42, "name": "Ada", "email": "ada@example.com"}))
                .unwrap();
        let b: Student = serde_json::from_value(
            json!({"id": "s-7", "name": "Alan", "email": "alan@example.com", "roll_number": "R7"}),
        )
        .unwrap();

        assert_eq!(a.id, "42");
        assert_eq!(a.roll_number, None);
        assert_eq!(b.id, "s-7");
        assert_eq!(b.roll_number.as_deref(), Some("R7"));
    }

    #[test]
    fn test_rejects_object_id() {
        let result = serde_json::from_value::<Batch>(json!({"id": {"x": 1}, "name": "B"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_login_response_accepts_access_token_alias() {
        let resp: LoginResponse = serde_json::from_value(json!({
            "user": {"id": 1, "name": "T", "email": "t@example.com", "role": "teacher"},
            "access_token": "abc"
        }))
        .unwrap();

        assert_eq!(resp.token, "abc");
        assert_eq!(resp.user.role, Role::Teacher);
    }

    #[test]
    fn test_error_body_messages() {
        let plain: ErrorBody = serde_json::from_value(json!({"detail": "Batch not found"})).unwrap();
        assert_eq!(plain.message(), "Batch not found");

        let list: ErrorBody = serde_json::from_value(json!({
            "detail": [{"msg": "field required"}, {"msg": "value is not a valid list"}]
        }))
        .unwrap();
        assert_eq!(list.message(), "field required; value is not a valid list");
    }

    #[test]
    fn test_assign_request_shape() {
        let ids = vec!["1".to_string(), "2".to_string()];
        let body = serde_json::to_value(AssignStudentsRequest { student_ids: &ids }).unwrap();
        assert_eq!(body, json!({"student_ids": ["1", "2"]}));
    }
}
