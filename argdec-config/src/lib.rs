//! Loader for workspace configuration with YAML + environment overlays.
//!
//! The expected schema for `argdec.yaml` is a `completion` section tagged by
//! `provider`. `ARGDEC__`-prefixed environment variables override file
//! values, and `${VAR}` placeholders are expanded recursively before the
//! strongly typed config is materialised.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct ArgdecConfig {
    pub version: Option<String>,
    pub completion: CompletionSpec,
}

/// Completion-service configuration, tagged by provider.
///
/// Two model identifiers are carried: a fine-tuned extraction model used
/// only for claim detection, and a general model used by every other call
/// site. Both are configuration values, not behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum CompletionSpec {
    Openai {
        auth_token: String,
        extraction_model: String,
        general_model: String,
        #[serde(default = "default_openai_endpoint")]
        endpoint: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct ArgdecConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ArgdecConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ArgdecConfigLoader {
    /// Start with sensible defaults: YAML file + `ARGDEC_` env overrides.
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("ARGDEC").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    pub fn load(self) -> Result<ArgdecConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: ArgdecConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("EXTRACTOR", Some("ft:claims-v2"), || {
            let mut v = json!("model-${EXTRACTOR}");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("model-ft:claims-v2"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("HOST", Some("api.local")), ("PORT", Some("8443"))], || {
            let mut v = json!([
                "https://$HOST",
                { "endpoint": "${HOST}:${PORT}" },
                7,
                false,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["https://api.local", { "endpoint": "api.local:8443" }, 7, false, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("INNER", Some("secret")),
                ("MIDDLE", Some("wrap-${INNER}")),
                ("OUTER", Some("a-${MIDDLE}-z")),
            ],
            || {
                let mut v = json!("token=${OUTER}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("token=a-wrap-secret-z"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            // The depth cap guarantees termination; the cycle stays unresolved.
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn loads_openai_completion_spec_from_yaml() {
        temp_env::with_var("SERVICE_TOKEN", Some("sk-test"), || {
            let cfg = ArgdecConfigLoader::new()
                .with_yaml_str(
                    r#"
version: "1"
completion:
  provider: "openai"
  auth_token: "${SERVICE_TOKEN}"
  extraction_model: "ft:claims-extractor"
  general_model: "gpt-4o-mini"
"#,
                )
                .load()
                .expect("valid configuration");

            assert_eq!(cfg.version.as_deref(), Some("1"));
            let CompletionSpec::Openai {
                auth_token,
                extraction_model,
                general_model,
                endpoint,
                temperature,
                max_tokens,
            } = cfg.completion;
            assert_eq!(auth_token, "sk-test");
            assert_eq!(extraction_model, "ft:claims-extractor");
            assert_eq!(general_model, "gpt-4o-mini");
            assert_eq!(endpoint, "https://api.openai.com/v1");
            assert!(temperature.is_none());
            assert!(max_tokens.is_none());
        });
    }
}
