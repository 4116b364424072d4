use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::truncate_string;

/// One unit of text to embed, in either shape the endpoint accepts:
/// a bare JSON string, or a single-key `{field: value}` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputItem {
    Text(String),
    LabeledText { field: String, value: String },
}

impl InputItem {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn labeled(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::LabeledText {
            field: field.into(),
            value: value.into(),
        }
    }

    /// The text payload, regardless of shape.
    pub fn value(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::LabeledText { value, .. } => value,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.value().trim().is_empty()
    }

    /// Short form for log lines.
    pub(crate) fn preview(&self) -> String {
        truncate_string(self.value(), 50)
    }
}

impl From<&str> for InputItem {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for InputItem {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl Serialize for InputItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::LabeledText { field, value } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(field, value)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_wire_shapes() {
        let plain = serde_json::to_value(InputItem::text("hello")).unwrap();
        assert_eq!(plain, serde_json::json!("hello"));

        let labeled = serde_json::to_value(InputItem::labeled("text", "hello")).unwrap();
        assert_eq!(labeled, serde_json::json!({"text": "hello"}));
    }

    #[test]
    fn blank_detection_unwraps_the_labeled_shape() {
        assert!(InputItem::text("").is_blank());
        assert!(InputItem::text("   ").is_blank());
        assert!(InputItem::labeled("text", " \t ").is_blank());
        assert!(!InputItem::labeled("title", "x").is_blank());
    }
}
