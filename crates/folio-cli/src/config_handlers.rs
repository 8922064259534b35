//! Handler functions for config CLI commands.
//!
//! Implements `folio config {path,get,set,init,export}` and the TOML
//! dotted-key helpers they share.

use crate::cli::ConfigAction;
use crate::config::FolioConfig;
use folio_core::{Error, Result};
use std::path::{Path, PathBuf};

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
///
/// Receives the raw `--config` path (not a loaded config) because `path` and
/// `init` work before a config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Get { key } => {
            println!("{}", cmd_config_get(config_path, &key)?);
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let path = cmd_config_set(config_path, &key, &value)?;
            println!("Set {key} = {value} in {}", path.display());
            Ok(())
        }
        ConfigAction::Init { file, force } => {
            let path = cmd_config_init(file.as_deref(), force)?;
            println!("Config file created at {}", path.display());
            Ok(())
        }
        ConfigAction::Export { docker_env } => {
            let config = FolioConfig::load(config_path)?;
            for line in cmd_config_export(&config, docker_env)? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

// ============================================================================
// Command handlers
// ============================================================================

fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    let path = FolioConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(file does not exist, run `folio config init` to create it)");
    }
    Ok(())
}

/// Resolved value of a dotted key, formatted for display.
fn cmd_config_get(config_path: Option<&str>, key: &str) -> Result<String> {
    let config = FolioConfig::load(config_path)?;
    let value = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    get_nested_value(&value, key)
        .map(format_toml_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Write a dotted key into the config file, returning the file path.
///
/// The edited document must still load as a [`FolioConfig`]; otherwise the
/// file is left untouched.
fn cmd_config_set(config_path: Option<&str>, key: &str, value: &str) -> Result<PathBuf> {
    let path = FolioConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;

    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `folio config init` first.",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;

    set_nested_value(&mut doc, key, parse_value(value))?;

    let toml_str = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    toml::from_str::<FolioConfig>(&toml_str)
        .map_err(|e| Error::config(format!("Refusing to write invalid value for '{key}': {e}")))?;

    std::fs::write(&path, toml_str).map_err(|e| Error::io_with_path(e, &path))?;
    Ok(path)
}

/// Create a default configuration file, returning its path.
fn cmd_config_init(file: Option<&str>, force: bool) -> Result<PathBuf> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => FolioConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = FolioConfig::default().to_toml_string()?;
    std::fs::write(path, toml_str).map_err(|e| Error::io_with_path(e, path))
}

/// Environment variable lines for the resolved configuration.
fn cmd_config_export(config: &FolioConfig, docker_env: bool) -> Result<Vec<String>> {
    let lines = config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| {
            if docker_env {
                format!("--env {key}={value}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect();
    Ok(lines)
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

/// Navigate a dotted key path in a TOML value tree.
fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let last = match parts.pop() {
        Some(last) if !last.is_empty() => last,
        _ => return Err(Error::config("Empty key path")),
    };

    let mut current = root;
    for part in parts {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?
        .insert(last.to_string(), value);
    Ok(())
}

/// Parse a string value into a TOML value, auto-detecting the type.
///
/// Priority: bool → integer → float → string.
fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => return toml::Value::Boolean(true),
        "false" => return toml::Value::Boolean(false),
        _ => {}
    }
    if let Ok(i) = s.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(s.to_string())
}

/// Format a TOML value for display on stdout.
fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        write_default_config(&path).unwrap();
        path
    }

    // ------------------------------------------------------------------------
    // get / set
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_get_simple_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = default_config_file(&dir);

        let value = cmd_config_get(Some(path.to_str().unwrap()), "project_name").unwrap();
        assert_eq!(value, "folio");
    }

    #[test]
    fn test_cmd_config_get_section() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = default_config_file(&dir);

        let value = cmd_config_get(Some(path.to_str().unwrap()), "content").unwrap();
        assert!(value.contains("extension"));
    }

    #[test]
    fn test_cmd_config_get_missing_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = default_config_file(&dir);

        let err = cmd_config_get(Some(path.to_str().unwrap()), "nonexistent.key").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_cmd_config_set_nested_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = default_config_file(&dir);

        cmd_config_set(Some(path.to_str().unwrap()), "content.path", "/srv/posts").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let config: FolioConfig = toml::from_str(&content).unwrap();
        assert_eq!(config.content.path.as_deref(), Some("/srv/posts"));
    }

    #[test]
    fn test_cmd_config_set_integer() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = default_config_file(&dir);

        cmd_config_set(Some(path.to_str().unwrap()), "content.max_depth", "2").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let config: FolioConfig = toml::from_str(&content).unwrap();
        assert_eq!(config.content.max_depth, Some(2));
    }

    #[test]
    fn test_cmd_config_set_rejects_invalid_type() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = default_config_file(&dir);
        let before = std::fs::read_to_string(&path).unwrap();

        let err = cmd_config_set(Some(path.to_str().unwrap()), "content.max_depth", "deep")
            .unwrap_err();
        assert!(err.to_string().contains("content.max_depth"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_cmd_config_set_missing_file() {
        let err = cmd_config_set(Some("/nonexistent/config.toml"), "key", "value").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    // ------------------------------------------------------------------------
    // init / export
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_init_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("folio").join("config.toml");

        let written = cmd_config_init(Some(path.to_str().unwrap()), false).unwrap();
        assert_eq!(written, path);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("project_name"));
        assert!(content.contains("[content]"));
    }

    #[test]
    fn test_cmd_config_init_no_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "existing").unwrap();

        let err = cmd_config_init(Some(path.to_str().unwrap()), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_cmd_config_init_force_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "old content").unwrap();

        cmd_config_init(Some(path.to_str().unwrap()), true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("project_name"));
    }

    #[test]
    fn test_cmd_config_export() {
        let config = FolioConfig::default();

        let lines = cmd_config_export(&config, false).unwrap();
        assert!(lines.contains(&"FOLIO_PROJECT_NAME=folio".to_string()));

        let lines = cmd_config_export(&config, true).unwrap();
        assert!(lines.contains(&"--env FOLIO_CONTENT_EXTENSION=md".to_string()));
    }

    // ------------------------------------------------------------------------
    // dotted-key helpers
    // ------------------------------------------------------------------------

    #[test]
    fn test_get_nested_value() {
        let val: toml::Value = toml::from_str("[content]\nextension = \"md\"").unwrap();
        assert_eq!(
            get_nested_value(&val, "content.extension"),
            Some(&toml::Value::String("md".into()))
        );
        assert!(get_nested_value(&val, "content.missing").is_none());
        assert!(get_nested_value(&val, "missing").is_none());
    }

    #[test]
    fn test_set_nested_value_creates_section() {
        let mut val = toml::Value::Table(toml::map::Map::new());
        set_nested_value(&mut val, "content.max_depth", toml::Value::Integer(3)).unwrap();
        assert_eq!(
            get_nested_value(&val, "content.max_depth"),
            Some(&toml::Value::Integer(3))
        );
    }

    #[test]
    fn test_set_nested_value_overwrites() {
        let mut val: toml::Value = toml::from_str("project_name = \"a\"").unwrap();
        set_nested_value(&mut val, "project_name", toml::Value::String("b".into())).unwrap();
        assert_eq!(
            get_nested_value(&val, "project_name"),
            Some(&toml::Value::String("b".into()))
        );
    }

    #[test]
    fn test_set_nested_value_through_scalar_fails() {
        let mut val: toml::Value = toml::from_str("project_name = \"a\"").unwrap();
        assert!(set_nested_value(&mut val, "project_name.inner", toml::Value::Integer(1)).is_err());
        assert!(set_nested_value(&mut val, "", toml::Value::Integer(1)).is_err());
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(parse_value("false"), toml::Value::Boolean(false));
        assert_eq!(parse_value("42"), toml::Value::Integer(42));
        assert_eq!(parse_value("2.5"), toml::Value::Float(2.5));
        assert_eq!(
            parse_value("/srv/posts"),
            toml::Value::String("/srv/posts".to_string())
        );
    }

    #[test]
    fn test_format_toml_value() {
        assert_eq!(format_toml_value(&toml::Value::String("md".into())), "md");
        assert_eq!(format_toml_value(&toml::Value::Integer(42)), "42");
        assert_eq!(format_toml_value(&toml::Value::Boolean(true)), "true");
    }
}
