use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::node::Document;

const SCHEMA: &str = "slidedoc";
const VERSION: u32 = 1;

fn default_schema() -> String {
    SCHEMA.to_string()
}

fn default_version() -> u32 {
    VERSION
}

/// Versioned envelope for persisting a document.
///
/// A bare Slate-style array is accepted too, since that is what editors
/// hand over when nothing wraps the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentValue {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub document: Document,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Incoming {
    Wrapped(DocumentValue),
    Bare(Document),
}

impl DocumentValue {
    pub fn from_document(document: Document) -> Self {
        Self {
            schema: default_schema(),
            version: default_version(),
            document,
        }
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn to_json_pretty(&self) -> Result<String, ValueError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ValueError> {
        let value = match serde_json::from_str::<Incoming>(s) {
            Ok(Incoming::Wrapped(value)) => value,
            Ok(Incoming::Bare(document)) => Self::from_document(document),
            // Re-parse as the envelope to surface a useful error.
            Err(_) => serde_json::from_str::<DocumentValue>(s)?,
        };
        if value.schema != SCHEMA || value.version > VERSION {
            return Err(ValueError::UnsupportedSchema {
                schema: value.schema,
                version: value.version,
            });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn accepts_bare_arrays_and_envelopes() {
        let bare = DocumentValue::from_json_str(r#"[{"type":"paragraph","children":[{"text":"x"}]}]"#)
            .unwrap();
        assert_eq!(bare.document, Document::new(vec![Node::paragraph("x")]));

        let json = bare.to_json_pretty().unwrap();
        assert_eq!(DocumentValue::from_json_str(&json).unwrap(), bare);
    }

    #[test]
    fn rejects_foreign_schemas() {
        let err = DocumentValue::from_json_str(r#"{"schema":"other","document":[]}"#).unwrap_err();
        assert!(matches!(err, ValueError::UnsupportedSchema { version: 1, .. }));
    }
}
