//! Values documents with deep merge support
//!
//! A [`Values`] document is the hand-off format between resolution and
//! packaging: plain JSON-compatible data addressed by dotted paths.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{CoreError, Result};

/// Values container with deep merge capability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub JsonValue);

impl Values {
    /// Create empty values
    pub fn new() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }

    /// Build values from any serializable value
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self(serde_json::to_value(value)?))
    }

    /// Parse values from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        Ok(Self(value))
    }

    /// Parse values from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Ok(Self(value))
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.0)?)
    }

    /// Render as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }

    /// Deep merge another Values into this one
    ///
    /// Rules:
    /// - Scalars: overlay replaces base
    /// - Objects: recursive merge
    /// - Arrays: overlay replaces base (not appended)
    pub fn merge(&mut self, overlay: &Values) {
        deep_merge(&mut self.0, &overlay.0);
    }

    /// Set a value by dotted path (e.g., "imageTags.api")
    pub fn set(&mut self, path: &str, value: JsonValue) -> Result<()> {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(CoreError::Values {
                message: format!("Invalid path: '{}'", path),
            });
        }
        let parts: Vec<&str> = path.split('.').collect();
        set_nested(&mut self.0, &parts, value);
        Ok(())
    }

    /// Get a value by dotted path
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        let parts: Vec<&str> = path.split('.').collect();
        get_nested(&self.0, &parts)
    }

    /// Check if values are empty
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            JsonValue::Object(map) => map.is_empty(),
            JsonValue::Null => true,
            _ => false,
        }
    }
}

fn deep_merge(base: &mut JsonValue, overlay: &JsonValue) {
    match (base, overlay) {
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

fn set_nested(value: &mut JsonValue, path: &[&str], new_value: JsonValue) {
    let Some((key, remaining)) = path.split_first() else {
        *value = new_value;
        return;
    };

    if !value.is_object() {
        *value = JsonValue::Object(serde_json::Map::new());
    }

    if let JsonValue::Object(map) = value {
        if remaining.is_empty() {
            map.insert(key.to_string(), new_value);
        } else {
            let entry = map
                .entry(key.to_string())
                .or_insert_with(|| JsonValue::Object(serde_json::Map::new()));
            set_nested(entry, remaining, new_value);
        }
    }
}

fn get_nested<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let Some((key, remaining)) = path.split_first() else {
        return Some(value);
    };

    match value {
        JsonValue::Object(map) => map.get(*key).and_then(|v| get_nested(v, remaining)),
        _ => None,
    }
}

/// Parse --set arguments (key=value format)
pub fn parse_set_values(set_args: &[String]) -> Result<Values> {
    let mut values = Values::new();

    for arg in set_args {
        let (key, val) = arg.split_once('=').ok_or_else(|| CoreError::Values {
            message: format!("Invalid --set format: '{}'. Expected key=value", arg),
        })?;

        let json_value = match val {
            "true" => JsonValue::Bool(true),
            "false" => JsonValue::Bool(false),
            "null" => JsonValue::Null,
            _ => match val.parse::<i64>() {
                Ok(num) => JsonValue::Number(num.into()),
                Err(_) if val.starts_with('[') || val.starts_with('{') => {
                    serde_json::from_str(val).unwrap_or_else(|_| JsonValue::String(val.to_string()))
                }
                Err(_) => JsonValue::String(val.to_string()),
            },
        };

        values.set(key, json_value)?;
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_merge_nested_objects() {
        let mut base = Values::from_yaml(
            r#"
features:
  enableNginxGateway: true
  enableRedis: false
imageTags:
  api: "1.0"
"#,
        )
        .unwrap();

        let overlay = Values::from_yaml(
            r#"
features:
  enableRedis: true
imageTags:
  web: "2.0"
"#,
        )
        .unwrap();

        base.merge(&overlay);

        assert_eq!(base.get("features.enableNginxGateway").unwrap(), true);
        assert_eq!(base.get("features.enableRedis").unwrap(), true);
        assert_eq!(base.get("imageTags.api").unwrap(), "1.0");
        assert_eq!(base.get("imageTags.web").unwrap(), "2.0");
    }

    #[test]
    fn test_merge_replaces_arrays() {
        let mut base = Values::from_yaml("ingressHosts:\n  public: [a.example.com, b.example.com]").unwrap();
        let overlay = Values::from_yaml("ingressHosts:\n  public: [c.example.com]").unwrap();

        base.merge(&overlay);

        assert_eq!(
            base.get("ingressHosts.public").unwrap(),
            &serde_json::json!(["c.example.com"])
        );
    }

    #[test]
    fn test_set_and_get() {
        let mut values = Values::new();
        values.set("env.api.LOG_LEVEL", JsonValue::String("debug".into())).unwrap();
        values.set("template.sharedPort", JsonValue::Number(8080.into())).unwrap();

        assert_eq!(values.get("env.api.LOG_LEVEL").unwrap(), "debug");
        assert_eq!(values.get("template.sharedPort").unwrap(), 8080);
        assert!(values.get("env.web").is_none());
        assert!(values.get("template.sharedPort.deeper").is_none());
    }

    #[test]
    fn test_set_rejects_empty_segments() {
        let mut values = Values::new();
        assert!(values.set("", JsonValue::Null).is_err());
        assert!(values.set("a..b", JsonValue::Null).is_err());
    }

    #[test]
    fn test_parse_set_values() {
        let args = vec![
            "imageTags.api=v2".to_string(),
            "template.sharedPort=9000".to_string(),
            "features.enableRedis=false".to_string(),
            "ingressHosts.public=[\"shop.example.com\"]".to_string(),
        ];

        let values = parse_set_values(&args).unwrap();

        assert_eq!(values.get("imageTags.api").unwrap(), "v2");
        assert_eq!(values.get("template.sharedPort").unwrap(), 9000);
        assert_eq!(values.get("features.enableRedis").unwrap(), false);
        assert_eq!(
            values.get("ingressHosts.public").unwrap(),
            &serde_json::json!(["shop.example.com"])
        );
    }

    #[test]
    fn test_parse_set_values_invalid() {
        let err = parse_set_values(&["novalue".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Expected key=value"));
    }

    #[test]
    fn test_is_empty() {
        assert!(Values::new().is_empty());
        assert!(Values(JsonValue::Null).is_empty());
        assert!(!Values::from_yaml("a: 1").unwrap().is_empty());
    }
}
