//! Environment variable fallbacks.
//!
//! Environment variables are a **fallback**, not an override: they only
//! apply to fields that no config file set.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::debug;

use courier_events::FailurePolicy;
use courier_telemetry::LogFormat;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources};

/// Prefix shared by every variable this crate reads.
pub const ENV_PREFIX: &str = "COURIER_";

#[derive(Debug, Clone, Copy)]
enum Kind {
    Text,
    Bool,
    Policy,
    Format,
}

struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: Kind,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "COURIER_FAILURE_POLICY",
        field_path: "publisher.failure_policy",
        kind: Kind::Policy,
    },
    EnvMapping {
        var_name: "COURIER_TRACE_PAYLOADS",
        field_path: "publisher.trace_payloads",
        kind: Kind::Bool,
    },
    EnvMapping {
        var_name: "COURIER_LOG_LEVEL",
        field_path: "logging.level",
        kind: Kind::Text,
    },
    EnvMapping {
        var_name: "COURIER_LOG_FORMAT",
        field_path: "logging.format",
        kind: Kind::Format,
    },
];

/// Collect the process's `COURIER_*` environment variables.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect()
}

/// Apply environment variable fallbacks to fields no config file set.
///
/// Returns the number of variables applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] when a variable's value cannot be
/// converted to its field's type.
pub fn apply_env_fallbacks<S: BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let from_file = sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults);
        if from_file {
            continue;
        }

        if let Some(raw) = env_vars.get(mapping.var_name) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );

            let value = coerce(mapping, raw)?;
            set_field(merged, mapping.field_path, value);
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    Ok(count)
}

fn coerce(mapping: &EnvMapping, raw: &str) -> ConfigResult<toml::Value> {
    let env_err = |message: String| ConfigError::EnvError {
        var_name: mapping.var_name.to_owned(),
        message,
    };

    match mapping.kind {
        Kind::Text => Ok(toml::Value::String(raw.trim().to_owned())),
        Kind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(toml::Value::Boolean(true)),
            "0" | "false" | "no" | "off" => Ok(toml::Value::Boolean(false)),
            other => Err(env_err(format!("'{other}' is not a boolean"))),
        },
        Kind::Policy => raw
            .parse::<FailurePolicy>()
            .map(|policy| toml::Value::String(policy.to_string()))
            .map_err(env_err),
        Kind::Format => raw
            .parse::<LogFormat>()
            .map(|format| toml::Value::String(format.to_string()))
            .map_err(|e| env_err(e.to_string())),
    }
}

fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let mut current = root;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        if segments.peek().is_none() {
            table.insert(segment.to_owned(), value);
            return;
        }
        current = table
            .entry(segment.to_owned())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_fallback_fills_unset_fields() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut sources = FieldSources::new();
        let env = vars(&[
            ("COURIER_LOG_LEVEL", "debug"),
            ("COURIER_TRACE_PAYLOADS", "yes"),
            ("COURIER_FAILURE_POLICY", "Isolate"),
        ]);

        let applied = apply_env_fallbacks(&mut merged, &mut sources, &env).unwrap();

        assert_eq!(applied, 3);
        assert_eq!(merged["logging"]["level"].as_str(), Some("debug"));
        assert_eq!(merged["publisher"]["trace_payloads"].as_bool(), Some(true));
        assert_eq!(merged["publisher"]["failure_policy"].as_str(), Some("isolate"));
        assert_eq!(sources.get("logging.level"), Some(&ConfigLayer::Environment));
    }

    #[test]
    fn test_fallback_overrides_defaults() {
        let mut merged: toml::Value = toml::from_str("[logging]\nlevel = \"info\"\n").unwrap();
        let mut sources = FieldSources::new();
        sources.insert("logging.level".to_owned(), ConfigLayer::Defaults);

        let env = vars(&[("COURIER_LOG_LEVEL", "warn")]);
        apply_env_fallbacks(&mut merged, &mut sources, &env).unwrap();
        assert_eq!(merged["logging"]["level"].as_str(), Some("warn"));
    }

    #[test]
    fn test_file_values_win_over_env() {
        let mut merged: toml::Value = toml::from_str("[logging]\nlevel = \"error\"\n").unwrap();
        let mut sources = FieldSources::new();
        sources.insert("logging.level".to_owned(), ConfigLayer::User);

        let env = vars(&[("COURIER_LOG_LEVEL", "trace")]);
        let applied = apply_env_fallbacks(&mut merged, &mut sources, &env).unwrap();

        assert_eq!(applied, 0);
        assert_eq!(merged["logging"]["level"].as_str(), Some("error"));
    }

    #[test]
    fn test_bad_value_names_variable() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut sources = FieldSources::new();

        let env = vars(&[("COURIER_LOG_FORMAT", "xml")]);
        let err = apply_env_fallbacks(&mut merged, &mut sources, &env).unwrap_err();
        assert!(matches!(err, ConfigError::EnvError { ref var_name, .. } if var_name == "COURIER_LOG_FORMAT"));

        let env = vars(&[("COURIER_TRACE_PAYLOADS", "maybe")]);
        assert!(apply_env_fallbacks(&mut merged, &mut sources, &env).is_err());
    }
}
