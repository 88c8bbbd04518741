// Settings record shared by the background worker and the options page
// Storage holds the durable copy; surfaces re-read it on every activation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Storage key of the only persisted flag
pub const ENABLE_FEATURE_KEY: &str = "enableFeature";

/// Value seeded at install time, and the fallback when the key is absent
pub const DEFAULT_ENABLE_FEATURE: bool = true;

/// The persisted settings object.
///
/// `None` means the key is not in storage yet. That is a valid state and
/// is distinct from `Some(false)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(
        rename = "enableFeature",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub enable_feature: Option<bool>,
}

impl Settings {
    /// Settings written on first install
    pub fn seeded() -> Self {
        Self {
            enable_feature: Some(DEFAULT_ENABLE_FEATURE),
        }
    }

    pub fn with_enable_feature(value: bool) -> Self {
        Self {
            enable_feature: Some(value),
        }
    }

    /// Extract settings from a raw storage result.
    ///
    /// Non-boolean values are coerced the way the page would treat them in JS
    /// (`!!value`), so a hand-edited entry still renders.
    pub fn from_items(items: &Map<String, Value>) -> Self {
        let enable_feature = items.get(ENABLE_FEATURE_KEY).map(|value| match value {
            Value::Bool(b) => *b,
            other => {
                let coerced = is_truthy(other);
                log::warn!(
                    "{} holds non-boolean value {}, treating as {}",
                    ENABLE_FEATURE_KEY,
                    other,
                    coerced
                );
                coerced
            }
        });

        Self { enable_feature }
    }

    pub fn to_items(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// The one place where "unset" turns into a concrete value
    pub fn enable_feature_or_default(&self) -> bool {
        self.enable_feature.unwrap_or(DEFAULT_ENABLE_FEATURE)
    }

    /// Keys the settings accessor asks storage for
    pub fn keys() -> &'static [&'static str] {
        &[ENABLE_FEATURE_KEY]
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_absent_key_is_unset() {
        let settings = Settings::from_items(&Map::new());
        assert_eq!(settings.enable_feature, None);
        assert!(settings.enable_feature_or_default());
    }

    #[test]
    fn test_false_is_not_unset() {
        let settings = Settings::from_items(&items(json!({ "enableFeature": false })));
        assert_eq!(settings.enable_feature, Some(false));
        assert!(!settings.enable_feature_or_default());
    }

    #[test]
    fn test_non_boolean_values_are_coerced() {
        let cases = [
            (json!(0), false),
            (json!(1), true),
            (json!(""), false),
            (json!("no"), true),
            (json!(null), false),
            (json!({}), true),
        ];
        for (value, expected) in cases {
            let stored = items(json!({ "enableFeature": value.clone() }));
            let settings = Settings::from_items(&stored);
            assert_eq!(settings.enable_feature, Some(expected), "value: {}", value);
        }
    }

    #[test]
    fn test_unrelated_keys_are_ignored() {
        let settings = Settings::from_items(&items(json!({ "theme": "dark" })));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_seeded_items_use_storage_key() {
        let map = Settings::seeded().to_items().unwrap();
        assert_eq!(Value::Object(map), json!({ "enableFeature": true }));
    }

    #[test]
    fn test_unset_settings_serialize_to_nothing() {
        assert!(Settings::default().to_items().unwrap().is_empty());
    }
}
