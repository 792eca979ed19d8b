use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Conventional error fields the backend places in JSON bodies.
///
/// Controllers answer with `{"error": "..."}` on validation failures and the
/// search endpoint with `{"errorMessage": "..."}`. Some responses also carry
/// a machine-readable `code`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        rename = "errorMessage",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorBody {
    /// Pull the conventional fields out of an arbitrary JSON value.
    /// Non-object values and non-string fields yield an empty body.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            error: text("error"),
            error_message: text("errorMessage"),
            code: text("code"),
        }
    }

    /// The message to surface: `error` wins over `errorMessage`.
    pub fn message(&self) -> Option<&str> {
        self.error.as_deref().or(self.error_message.as_deref())
    }
}
