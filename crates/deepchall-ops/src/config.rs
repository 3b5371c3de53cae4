//! Run configuration.
//!
//! A run configuration is a JSON document naming language and net instances:
//!
//! ```json
//! {
//!   "langs": { "small": { "lang": "toy_cfg", "max_depth": 4 } },
//!   "nets":  { "ngram": { "net": "markov", "order": 3 } }
//! }
//! ```
//!
//! Every key besides the preset key is a parameter override.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{OpsError, OpsResult};
use crate::params::RunParams;
use crate::registry::Registry;

const LANGS: &str = "langs";
const NETS: &str = "nets";
const LANG_KEY: &str = "lang";
const NET_KEY: &str = "net";

/// One configured instance of a preset.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceConfig {
    /// Registered preset name.
    pub preset: String,
    /// User overrides.
    pub params: RunParams,
}

/// Language and net instances for a benchmark run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    pub langs: BTreeMap<String, InstanceConfig>,
    pub nets: BTreeMap<String, InstanceConfig>,
}

impl RunConfig {
    /// Read and structurally validate a configuration file.
    pub fn load(path: &Path) -> OpsResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| OpsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> OpsResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Build from an already-parsed JSON document.
    pub fn from_value(value: &Value) -> OpsResult<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| OpsError::config("configuration must be a JSON object"))?;
        Ok(Self {
            langs: read_section(root, LANGS, LANG_KEY)?,
            nets: read_section(root, NETS, NET_KEY)?,
        })
    }

    /// Check every preset name against `registry`.
    pub fn validate(&self, registry: &Registry) -> OpsResult<()> {
        for instance in self.langs.values() {
            if !registry.contains_lang(&instance.preset) {
                return Err(OpsError::UnknownPreset {
                    kind: LANG_KEY,
                    name: instance.preset.clone(),
                });
            }
        }
        for instance in self.nets.values() {
            if !registry.contains_net(&instance.preset) {
                return Err(OpsError::UnknownPreset {
                    kind: NET_KEY,
                    name: instance.preset.clone(),
                });
            }
        }
        Ok(())
    }
}

fn read_section(
    root: &Map<String, Value>,
    section: &str,
    preset_key: &str,
) -> OpsResult<BTreeMap<String, InstanceConfig>> {
    let entries = root
        .get(section)
        .ok_or_else(|| OpsError::config(format!("missing '{section}' section")))?
        .as_object()
        .ok_or_else(|| OpsError::config(format!("'{section}' must be an object")))?;

    let mut instances = BTreeMap::new();
    for (name, entry) in entries {
        let fields = entry.as_object().ok_or_else(|| {
            OpsError::config(format!("{section}.{name} must be an object"))
        })?;
        let preset = match fields.get(preset_key) {
            Some(Value::String(preset)) => preset.clone(),
            Some(_) => {
                return Err(OpsError::config(format!(
                    "{section}.{name}.{preset_key} must be a string"
                )))
            }
            None => {
                return Err(OpsError::config(format!(
                    "{section}.{name} is missing the '{preset_key}' key"
                )))
            }
        };
        let params = fields
            .iter()
            .filter(|(key, _)| key.as_str() != preset_key)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        instances.insert(name.clone(), InstanceConfig { preset, params });
    }
    Ok(instances)
}
