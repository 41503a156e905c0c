//! TOML configuration file parsing
//!
//! Keys mirror [`RawConfig`] field names; any key may be omitted.
//!
//! ```toml
//! directories = ["/mnt/disk1/churn", "/mnt/disk2/churn"]
//! write = true
//! delete_threshold_gb = 50
//! min_file_size_mb = 16
//! max_file_size_mb = 4096
//! flush = true
//! ```

use super::RawConfig;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<RawConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<RawConfig> {
    let config: RawConfig = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with file configuration (CLI takes precedence)
///
/// Boolean flags can only switch a setting on; directories given on the
/// command line replace the file's list.
pub fn merge_cli_with_config(cli: &Cli, mut config: RawConfig) -> RawConfig {
    if !cli.directories.is_empty() {
        config.directories = cli.directories.clone();
    }

    if let Some(v) = cli.delete_threshold_gb {
        config.delete_threshold_gb = v;
    }
    if let Some(v) = cli.min_file_size_mb {
        config.min_file_size_mb = v;
    }
    if let Some(v) = cli.max_file_size_mb {
        config.max_file_size_mb = v;
    }
    if let Some(v) = cli.min_buffer_size {
        config.min_buffer_size = v;
    }
    if let Some(v) = cli.max_buffer_size {
        config.max_buffer_size = v;
    }
    if let Some(v) = cli.sleep_secs {
        config.sleep_secs = v;
    }
    if let Some(v) = cli.iterations {
        config.iterations = v;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    config.read |= cli.read;
    config.write |= cli.write;
    config.clear |= cli.clear;
    config.flush |= cli.flush;
    config.direct |= cli.direct;

    config
}

/// Resolve the raw configuration for a command line: the `--config` file
/// (if any) overlaid with explicit CLI values
pub fn load(cli: &Cli) -> Result<RawConfig> {
    let base = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => RawConfig::default(),
    };
    Ok(merge_cli_with_config(cli, base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_parse_partial_toml_keeps_defaults() {
        let config = parse_toml_string(
            r#"
            directories = ["/data/a"]
            write = true
            max_file_size_mb = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.directories, vec![PathBuf::from("/data/a")]);
        assert!(config.write);
        assert!(!config.read);
        assert_eq!(config.max_file_size_mb, 64);
        assert_eq!(config.min_file_size_mb, 1);
        assert_eq!(config.max_buffer_size, 8192);
        assert_eq!(config.iterations, -1);
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(parse_toml_string("write = \"yes\"").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = parse_toml_string(
            r#"
            directories = ["/data/a"]
            read = true
            iterations = 10
            min_buffer_size = 4096
            "#,
        )
        .unwrap();

        let cli = Cli {
            directories: vec![PathBuf::from("/data/b")],
            write: true,
            iterations: Some(2),
            ..Default::default()
        };

        let merged = merge_cli_with_config(&cli, file);
        assert_eq!(merged.directories, vec![PathBuf::from("/data/b")]);
        assert!(merged.read && merged.write);
        assert_eq!(merged.iterations, 2);
        assert_eq!(merged.min_buffer_size, 4096);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("churn.toml");
        std::fs::write(&path, "write = true\nseed = 99\n").unwrap();

        let cli = Cli {
            config: Some(path),
            ..Default::default()
        };
        let config = load(&cli).unwrap();
        assert!(config.write);
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn test_load_missing_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/churn.toml")),
            ..Default::default()
        };
        assert!(load(&cli).is_err());
    }
}
