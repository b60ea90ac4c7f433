use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Role an artifact plays within a deployment.
///
/// Serialized with the key names the distribution service uses in the
/// `files` and `upload_urls` maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArtifactRole {
    /// The installable application archive.
    #[serde(rename = "ipa")]
    Primary,
    /// Companion debug-symbols archive.
    #[serde(rename = "dsym")]
    DebugSymbols,
}

impl ArtifactRole {
    /// All roles, in upload order.
    pub const ALL: [ArtifactRole; 2] = [ArtifactRole::Primary, ArtifactRole::DebugSymbols];

    /// Key used for this role in wire maps.
    pub fn wire_name(self) -> &'static str {
        match self {
            ArtifactRole::Primary => "ipa",
            ArtifactRole::DebugSymbols => "dsym",
        }
    }

    /// Other keys the service may use for this role in `upload_urls`.
    pub fn wire_aliases(self) -> &'static [&'static str] {
        match self {
            ArtifactRole::Primary => &["primary"],
            ArtifactRole::DebugSymbols => &[],
        }
    }

    /// Looks up a role by its wire key or one of its aliases.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.wire_name() == name || role.wire_aliases().contains(&name))
    }
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactRole::Primary => f.write_str("primary"),
            ArtifactRole::DebugSymbols => f.write_str("debug symbols"),
        }
    }
}

/// Server-assigned transaction id.
///
/// Opaque to the client: it is echoed back on commit exactly as received,
/// whether the service sent a JSON string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuildId {
    Text(String),
    Number(Number),
}

impl BuildId {
    /// Extracts a usable id from a raw JSON value.
    ///
    /// Null, `""`, zero and non-scalar values count as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(BuildId::Text(s.clone())),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(BuildId::Number(n.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildId::Text(s) => f.write_str(s),
            BuildId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for BuildId {
    fn from(value: &str) -> Self {
        BuildId::Text(value.to_string())
    }
}

impl From<String> for BuildId {
    fn from(value: String) -> Self {
        BuildId::Text(value)
    }
}

impl From<u64> for BuildId {
    fn from(value: u64) -> Self {
        BuildId::Number(value.into())
    }
}

impl PartialEq<&str> for BuildId {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, BuildId::Text(s) if s == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_serde() {
        for role in ArtifactRole::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.wire_name()));
        }
    }

    #[test]
    fn from_wire_name_roundtrip() {
        assert_eq!(ArtifactRole::from_wire_name("ipa"), Some(ArtifactRole::Primary));
        assert_eq!(
            ArtifactRole::from_wire_name("dsym"),
            Some(ArtifactRole::DebugSymbols)
        );
        assert_eq!(ArtifactRole::from_wire_name("apk"), None);
    }

    #[test]
    fn primary_alias_accepted() {
        assert_eq!(
            ArtifactRole::from_wire_name("primary"),
            Some(ArtifactRole::Primary)
        );
        assert_eq!(ArtifactRole::from_wire_name("debug symbols"), None);
    }

    #[test]
    fn build_id_keeps_json_type() {
        let text = BuildId::from_value(&serde_json::json!("b1")).unwrap();
        assert_eq!(serde_json::to_value(&text).unwrap(), serde_json::json!("b1"));

        let number = BuildId::from_value(&serde_json::json!(42)).unwrap();
        assert_eq!(number, BuildId::from(42));
        assert_eq!(serde_json::to_value(&number).unwrap(), serde_json::json!(42));
        assert_eq!(number.to_string(), "42");
    }

    #[test]
    fn falsy_build_ids_are_absent() {
        for value in [
            serde_json::json!(null),
            serde_json::json!(""),
            serde_json::json!(0),
            serde_json::json!(0.0),
            serde_json::json!(false),
            serde_json::json!({"id": "b1"}),
        ] {
            assert!(BuildId::from_value(&value).is_none(), "{value}");
        }
    }

    #[test]
    fn build_id_deserializes_string_or_number() {
        let text: BuildId = serde_json::from_str(r#""b-7""#).unwrap();
        assert_eq!(text, "b-7");
        let number: BuildId = serde_json::from_str("7").unwrap();
        assert_eq!(number, BuildId::from(7));
    }

    #[test]
    fn display_uses_human_names() {
        assert_eq!(ArtifactRole::Primary.to_string(), "primary");
        assert_eq!(ArtifactRole::DebugSymbols.to_string(), "debug symbols");
    }

    #[test]
    fn primary_sorts_first() {
        assert!(ArtifactRole::Primary < ArtifactRole::DebugSymbols);
    }
}
