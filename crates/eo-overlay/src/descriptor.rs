//! Error descriptor delivered by the dev server.

use serde::Deserialize;

/// Precise source position. Every field is optional on the wire; absent
/// parts are left out of the rendered location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourceLocation {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
}

impl SourceLocation {
    pub fn new(file: &str, line: u32, column: u32) -> Self {
        Self {
            file: Some(file.to_owned()),
            line: Some(line),
            column: Some(column),
        }
    }
}

/// Build or runtime error to display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorDescriptor {
    pub message: String,
    #[serde(default)]
    pub plugin: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub loc: Option<SourceLocation>,
    #[serde(default)]
    pub frame: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
}

impl ErrorDescriptor {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
            ..Self::default()
        }
    }
}

/// `{"type": "error", "err": {...}}` envelope sent over the HMR channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ErrorPayload {
    Error { err: ErrorDescriptor },
}

impl ErrorPayload {
    pub fn into_descriptor(self) -> ErrorDescriptor {
        match self {
            Self::Error { err } => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorDescriptor;
    use super::ErrorPayload;
    use super::SourceLocation;

    #[test]
    fn deserializes_partial_descriptor() {
        let raw = r#"{"message":"boom","loc":{"file":"/a.ts","line":3}}"#;
        let descriptor: ErrorDescriptor = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        assert_eq!(descriptor.message, "boom");
        assert_eq!(
            descriptor.loc,
            Some(SourceLocation {
                file: Some("/a.ts".to_owned()),
                line: Some(3),
                column: None,
            })
        );
        assert!(descriptor.plugin.is_none());
    }

    #[test]
    fn unwraps_hmr_envelope() {
        let raw = r#"{"type":"error","err":{"message":"x","plugin":"vite:css"}}"#;
        let payload: ErrorPayload = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        let descriptor = payload.into_descriptor();
        assert_eq!(descriptor.plugin.as_deref(), Some("vite:css"));
    }

    #[test]
    fn rejects_other_envelope_types() {
        let raw = r#"{"type":"update","updates":[]}"#;
        assert!(serde_json::from_str::<ErrorPayload>(raw).is_err());
        assert!(serde_json::from_str::<ErrorDescriptor>(raw).is_err());
    }

    #[test]
    fn message_is_required() {
        let raw = r#"{"plugin":"vite:css","stack":"at /a.ts:1:1"}"#;
        assert!(serde_json::from_str::<ErrorDescriptor>(raw).is_err());
        let raw = r#"{"type":"error","err":{"id":"/a.ts"}}"#;
        assert!(serde_json::from_str::<ErrorPayload>(raw).is_err());
    }
}
