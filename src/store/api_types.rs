//! Serde types matching the Firestore REST v1 document format.
//!
//! These are separate from domain types so the wire shape (value envelopes,
//! resource-name paths) never leaks past the store client. Firestore
//! encodes every field as a typed envelope and int64 values as strings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::types::{Member, NewMember};

/// One typed value envelope. Only the variants the roster uses are
/// modeled; any other envelope deserializes as an empty value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiValue {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub string_value: Option<String>,
  /// int64 on the wire, string-encoded by the REST surface
  #[serde(skip_serializing_if = "Option::is_none")]
  pub integer_value: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub double_value: Option<f64>,
}

impl ApiValue {
  pub fn string(value: impl Into<String>) -> Self {
    ApiValue {
      string_value: Some(value.into()),
      ..Default::default()
    }
  }

  pub fn integer(value: u64) -> Self {
    ApiValue {
      integer_value: Some(value.to_string()),
      ..Default::default()
    }
  }

  fn as_string(&self) -> String {
    self.string_value.clone().unwrap_or_default()
  }

  /// Numeric fields may arrive as integerValue or doubleValue depending on
  /// which client wrote them. Negative or fractional values floor to 0.
  fn as_u64(&self) -> u64 {
    if let Some(i) = &self.integer_value {
      return i.parse().unwrap_or(0);
    }
    if let Some(d) = self.double_value {
      if d.is_finite() && d > 0.0 {
        return d as u64;
      }
    }
    0
  }
}

/// A stored document: a full resource-name path plus the field map
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDocument {
  pub name: String,
  #[serde(default)]
  pub fields: HashMap<String, ApiValue>,
}

impl ApiDocument {
  /// Last segment of the resource name, e.g.
  /// `projects/p/databases/(default)/documents/users/abc123` -> `abc123`
  pub fn id(&self) -> String {
    self
      .name
      .rsplit('/')
      .next()
      .unwrap_or(self.name.as_str())
      .to_string()
  }

  fn field_string(&self, key: &str) -> String {
    self.fields.get(key).map(ApiValue::as_string).unwrap_or_default()
  }

  /// Convert to a domain record. Missing fields fall back to empty/zero so
  /// a partially written document still renders.
  pub fn into_member(self) -> Member {
    let salary = self.fields.get("salary").map(ApiValue::as_u64).unwrap_or(0);
    Member {
      id: self.id(),
      first_name: self.field_string("first_name"),
      last_name: self.field_string("last_name"),
      email: self.field_string("email"),
      avatar: self.field_string("avatar"),
      role: self.field_string("role"),
      salary,
    }
  }
}

/// Response from listing the collection. `documents` is absent entirely
/// when the collection is empty.
#[derive(Debug, Deserialize)]
pub struct ApiListResponse {
  #[serde(default)]
  pub documents: Vec<ApiDocument>,
}

/// Request/response body wrapper for create and patch calls
#[derive(Debug, Serialize)]
pub struct ApiDocumentBody {
  pub fields: HashMap<String, ApiValue>,
}

impl ApiDocumentBody {
  pub fn from_fields(member: &NewMember) -> Self {
    let mut fields = HashMap::new();
    fields.insert("first_name".to_string(), ApiValue::string(&member.first_name));
    fields.insert("last_name".to_string(), ApiValue::string(&member.last_name));
    fields.insert("email".to_string(), ApiValue::string(&member.email));
    fields.insert("avatar".to_string(), ApiValue::string(&member.avatar));
    fields.insert("role".to_string(), ApiValue::string(&member.role));
    fields.insert("salary".to_string(), ApiValue::integer(member.salary));
    ApiDocumentBody { fields }
  }
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
  pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
  #[serde(default)]
  pub code: i64,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub message: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  const DOC: &str = r#"{
    "name": "projects/p/databases/(default)/documents/users/abc123",
    "fields": {
      "first_name": {"stringValue": "Ann"},
      "last_name": {"stringValue": "Lee"},
      "email": {"stringValue": "ann@x.com"},
      "avatar": {"stringValue": "https://example.com/a.png"},
      "role": {"stringValue": "Backend"},
      "salary": {"integerValue": "5000"}
    }
  }"#;

  #[test]
  fn test_decode_document_to_member() {
    let doc: ApiDocument = serde_json::from_str(DOC).unwrap();
    let member = doc.into_member();
    assert_eq!(member.id, "abc123");
    assert_eq!(member.first_name, "Ann");
    assert_eq!(member.email, "ann@x.com");
    assert_eq!(member.role, "Backend");
    assert_eq!(member.salary, 5000);
  }

  #[test]
  fn test_decode_double_salary() {
    let doc: ApiDocument = serde_json::from_str(
      r#"{"name": "x/users/d1", "fields": {"salary": {"doubleValue": 1500.0}}}"#,
    )
    .unwrap();
    assert_eq!(doc.into_member().salary, 1500);
  }

  #[test]
  fn test_missing_fields_fall_back_to_defaults() {
    let doc: ApiDocument = serde_json::from_str(r#"{"name": "x/users/d2"}"#).unwrap();
    let member = doc.into_member();
    assert_eq!(member.id, "d2");
    assert_eq!(member.first_name, "");
    assert_eq!(member.salary, 0);
  }

  #[test]
  fn test_empty_list_response() {
    let resp: ApiListResponse = serde_json::from_str("{}").unwrap();
    assert!(resp.documents.is_empty());
  }

  #[test]
  fn test_encode_fields_skips_unused_envelopes() {
    let body = ApiDocumentBody::from_fields(&NewMember {
      first_name: "Ann".to_string(),
      last_name: "Lee".to_string(),
      email: "ann@x.com".to_string(),
      avatar: "https://example.com/a.png".to_string(),
      role: "Backend".to_string(),
      salary: 5000,
    });
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["fields"]["salary"]["integerValue"], "5000");
    assert_eq!(json["fields"]["first_name"]["stringValue"], "Ann");
    // string envelopes must not carry null integer/double keys
    assert!(json["fields"]["first_name"].get("integerValue").is_none());
  }

  #[test]
  fn test_error_envelope() {
    let resp: ApiErrorResponse = serde_json::from_str(
      r#"{"error": {"code": 404, "status": "NOT_FOUND", "message": "missing"}}"#,
    )
    .unwrap();
    assert_eq!(resp.error.code, 404);
    assert_eq!(resp.error.status, "NOT_FOUND");
  }
}
