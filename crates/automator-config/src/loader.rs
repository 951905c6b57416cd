//! YAML loader with custom tag support
//!
//! Supports two custom tags:
//! - `!include path` - Include another YAML file. Inside a sequence, an
//!   included sequence is spliced in place.
//! - `!env_var VAR [default]` - Environment variable substitution

use crate::error::{ConfigError, ConfigResult};
use serde_yaml::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// YAML loader resolving `!include` and `!env_var`
pub struct YamlLoader {
    /// Base directory for resolving relative paths
    base_dir: PathBuf,
    /// Track included files to detect circular includes
    include_stack: HashSet<PathBuf>,
}

impl YamlLoader {
    /// Create a new YAML loader for the given base directory
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            include_stack: HashSet::new(),
        }
    }

    /// Load and process a YAML file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<Value> {
        let path = self.resolve_path(path.as_ref());
        debug!("Loading YAML file: {:?}", path);

        if self.include_stack.contains(&path) {
            return Err(ConfigError::CircularInclude { path });
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        self.include_stack.insert(path.clone());
        let result = self.load_string(&content, &path);
        self.include_stack.remove(&path);

        result
    }

    /// Load and process YAML from a string
    pub fn load_string(&mut self, content: &str, source_path: &Path) -> ConfigResult<Value> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: source_path.to_path_buf(),
            source: e,
        })?;

        self.process_value(value, source_path)
    }

    /// Process a YAML value, handling custom tags
    fn process_value(&mut self, value: Value, source_path: &Path) -> ConfigResult<Value> {
        match value {
            Value::Tagged(tagged) => self.process_tagged(*tagged, source_path),
            Value::Mapping(map) => {
                let mut result = serde_yaml::Mapping::new();
                for (k, v) in map {
                    let processed_key = self.process_value(k, source_path)?;
                    let processed_value = self.process_value(v, source_path)?;
                    result.insert(processed_key, processed_value);
                }
                Ok(Value::Mapping(result))
            }
            Value::Sequence(seq) => {
                let mut result = Vec::with_capacity(seq.len());
                for item in seq {
                    let spliced = is_include(&item);
                    match self.process_value(item, source_path)? {
                        Value::Sequence(included) if spliced => result.extend(included),
                        other => result.push(other),
                    }
                }
                Ok(Value::Sequence(result))
            }
            _ => Ok(value),
        }
    }

    /// Process a tagged value
    fn process_tagged(
        &mut self,
        tagged: serde_yaml::value::TaggedValue,
        source_path: &Path,
    ) -> ConfigResult<Value> {
        let tag = tagged.tag.to_string();
        let value = tagged.value;

        trace!("Processing tag '{}' with value {:?}", tag, value);

        match tag.as_str() {
            "!include" => self.process_include(value, source_path),
            "!env_var" => self.process_env_var(value),
            _ => {
                // Unknown tag, keep it as-is but process the inner value
                let processed = self.process_value(value, source_path)?;
                Ok(Value::Tagged(Box::new(serde_yaml::value::TaggedValue {
                    tag: tagged.tag,
                    value: processed,
                })))
            }
        }
    }

    /// Process !include tag
    fn process_include(&mut self, value: Value, source_path: &Path) -> ConfigResult<Value> {
        let include_path = self.value_to_path(&value, source_path)?;
        debug!("Including file: {:?}", include_path);
        self.load_file(&include_path)
    }

    /// Process !env_var tag
    ///
    /// The variable's content is read as a YAML scalar, so numeric values
    /// stay numeric. `!env_var NAME default` falls back to `default`.
    fn process_env_var(&self, value: Value) -> ConfigResult<Value> {
        let expr = match value {
            Value::String(s) => s,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: "!env_var".to_string(),
                    reason: "environment variable name must be a string".to_string(),
                })
            }
        };

        let (var_name, default) = match expr.split_once(char::is_whitespace) {
            Some((name, default)) => (name.to_string(), Some(default.trim().to_string())),
            None => (expr, None),
        };

        let raw = match (std::env::var(&var_name), default) {
            (Ok(v), _) => v,
            (Err(_), Some(default)) => {
                debug!("Env var {} not set, using default", var_name);
                default
            }
            (Err(_), None) => return Err(ConfigError::EnvVarNotFound { var: var_name }),
        };

        debug!("Substituted env var: {}", var_name);
        Ok(scalar(&raw))
    }

    /// Convert a YAML value to a path, resolving relative to source file
    fn value_to_path(&self, value: &Value, source_path: &Path) -> ConfigResult<PathBuf> {
        let path_str = match value {
            Value::String(s) => s.clone(),
            _ => {
                return Err(ConfigError::InvalidIncludePath {
                    path: format!("{:?}", value),
                    reason: "path must be a string".to_string(),
                })
            }
        };

        // Resolve relative to the source file's directory
        let base_dir = source_path.parent().unwrap_or(&self.base_dir);
        let resolved = if Path::new(&path_str).is_absolute() {
            PathBuf::from(&path_str)
        } else {
            base_dir.join(&path_str)
        };

        Ok(resolved)
    }

    /// Resolve a path relative to the base directory
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

fn is_include(value: &Value) -> bool {
    matches!(value, Value::Tagged(tagged) if tagged.tag == "!include")
}

/// Read a plain string as a YAML scalar; anything structured stays a string
fn scalar(raw: &str) -> Value {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::String(_) | Value::Null)) => v,
        _ => Value::String(raw.to_string()),
    }
}

/// Load a YAML file with tag processing
pub fn load_yaml(base_dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> ConfigResult<Value> {
    let mut loader = YamlLoader::new(base_dir);
    loader.load_file(file)
}

/// Load a YAML string with tag processing
pub fn load_yaml_string(
    base_dir: impl Into<PathBuf>,
    content: &str,
    source_name: &str,
) -> ConfigResult<Value> {
    let mut loader = YamlLoader::new(base_dir);
    loader.load_string(content, Path::new(source_name))
}
