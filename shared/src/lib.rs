use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Header carrying the shared secret on `/api` requests
pub const API_KEY_HEADER: &str = "x-api-key";

/// A bank record as stored by the registry and returned by the REST API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    /// Store-assigned identifier, never reused after deletion
    pub id: i64,
    /// Display name of the institution (not required to be unique)
    pub name: String,
    /// Where the institution is located
    pub location: String,
    /// When the record was inserted (RFC 3339)
    pub created_at: DateTime<Utc>,
    /// When the record was last modified (RFC 3339)
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/banks`
///
/// Missing fields decode as empty strings so that the service, not the JSON
/// decoder, reports which field is required.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreateBankRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
}

impl CreateBankRequest {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

/// Body of `PUT`/`PATCH /api/banks/:id`; only supplied fields are changed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateBankRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// JSON body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bank_wire_format() {
        let stamp = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let bank = Bank {
            id: 7,
            name: "Test Bank".to_string(),
            location: "Test City".to_string(),
            created_at: stamp,
            updated_at: stamp,
        };

        let value = serde_json::to_value(&bank).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["name"], "Test Bank");
        assert_eq!(value["location"], "Test City");
        assert_eq!(value["created_at"], "2025-03-01T12:00:00Z");
        assert_eq!(value["updated_at"], "2025-03-01T12:00:00Z");
    }

    #[test]
    fn test_create_request_missing_fields_default_to_empty() {
        let request: CreateBankRequest = serde_json::from_str(r#"{"name": "Only Name"}"#).unwrap();
        assert_eq!(request.name, "Only Name");
        assert!(request.location.is_empty());
    }

    #[test]
    fn test_update_request_omits_unset_fields() {
        let request = UpdateBankRequest {
            name: Some("Renamed".to_string()),
            location: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"name":"Renamed"}"#);

        let empty: UpdateBankRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, UpdateBankRequest::default());
    }
}
