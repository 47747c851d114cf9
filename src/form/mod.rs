pub mod recipients;

use crate::identity::{RecipientSet, UserIdentity};
use serde::{Deserialize, Serialize};

pub use recipients::RecipientsConverter;

/// A loosely typed field value as seen by the form-binding layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Text(String),
    Identities(Vec<UserIdentity>),
}

impl FormValue {
    /// Short name of the value's shape, used in error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FormValue::Null => "null",
            FormValue::Bool(_) => "bool",
            FormValue::Integer(_) => "integer",
            FormValue::Text(_) => "string",
            FormValue::Identities(_) => "list of identities",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FormValue::Null)
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        FormValue::Text(text.to_string())
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        FormValue::Text(text)
    }
}

impl From<RecipientSet> for FormValue {
    fn from(recipients: RecipientSet) -> Self {
        FormValue::Identities(recipients.into_iter().collect())
    }
}

impl<T: Into<FormValue>> From<Option<T>> for FormValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FormValue::Null, Into::into)
    }
}

/// Raw submission of the "new thread" form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewThreadForm {
    pub recipients: FormValue,
    pub subject: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(FormValue::Null.kind(), "null");
        assert_eq!(FormValue::Integer(123).kind(), "integer");
        assert_eq!(FormValue::from("alice").kind(), "string");
        assert_eq!(FormValue::Identities(vec![]).kind(), "list of identities");
    }

    #[test]
    fn test_json_submission_shapes() {
        let form: NewThreadForm = serde_json::from_str(
            r#"{"recipients": "alice, bob", "subject": "hi", "body": "hello"}"#,
        )
        .unwrap();
        assert_eq!(form.recipients, FormValue::from("alice, bob"));

        let value: FormValue = serde_json::from_str("null").unwrap();
        assert!(value.is_null());
        let value: FormValue = serde_json::from_str("123").unwrap();
        assert_eq!(value, FormValue::Integer(123));
    }
}
