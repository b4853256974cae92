use crate::utils::error::{JrcError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A configuration document as served by the configuration service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config(Value);

impl Config {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Dotted lookup, e.g. `path("mail.address")`.
    pub fn path(&self, dotted: &str) -> Option<&Value> {
        dotted
            .split('.')
            .try_fold(&self.0, |value, segment| value.get(segment))
    }

    pub fn str_at(&self, dotted: &str) -> Result<&str> {
        self.path(dotted)
            .and_then(Value::as_str)
            .ok_or_else(|| JrcError::MissingConfigError {
                field: dotted.to_string(),
            })
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.0)?)
    }

    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Config {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Identifier kinds the NCBI ID converter can translate a PMID into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmidTarget {
    Pmcid,
    Doi,
}

impl PmidTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pmcid => "pmcid",
            Self::Doi => "doi",
        }
    }
}

impl std::str::FromStr for PmidTarget {
    type Err = JrcError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pmcid" => Ok(Self::Pmcid),
            "doi" => Ok(Self::Doi),
            other => Err(JrcError::InvalidConfigValueError {
                field: "convert_to".to_string(),
                value: other.to_string(),
                reason: "expected pmcid or doi".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dotted_paths() {
        let config = Config::new(json!({
            "mail": {"address": "smtp.example.org:25"},
            "jacs": {"port": 8080}
        }));
        assert_eq!(config.str_at("mail.address").unwrap(), "smtp.example.org:25");
        assert_eq!(config.path("jacs.port"), Some(&json!(8080)));
        assert!(config.path("mail.missing").is_none());
        assert!(matches!(
            config.str_at("jacs.port"),
            Err(JrcError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn typed_view() {
        #[derive(Deserialize)]
        struct Person {
            first: String,
            last: String,
        }

        let config = Config::new(json!({"first": "Ada", "last": "Lovelace"}));
        let person: Person = config.deserialize().unwrap();
        assert_eq!(person.first, "Ada");
        assert_eq!(person.last, "Lovelace");
        assert_eq!(config.as_map().map(|m| m.len()), Some(2));
    }

    #[test]
    fn pmid_targets() {
        assert_eq!("doi".parse::<PmidTarget>().unwrap(), PmidTarget::Doi);
        assert_eq!(PmidTarget::Pmcid.as_str(), "pmcid");
        assert!("pmid".parse::<PmidTarget>().is_err());
    }
}
