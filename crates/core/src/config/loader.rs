use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SQUEEZER_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from an optional file.
///
/// A missing file falls back to defaults plus environment overrides, so the
/// binary works without any configuration on disk.
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        return load_config(path);
    }

    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("SQUEEZER_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[compression]
quality_tier = 2
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.compression.quality_tier, Some(2));
    }

    #[test]
    fn test_load_config_from_str_invalid() {
        let toml = r#"
[compression]
quality_tier = "high"
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/squeezer.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_or_default_without_file() {
        let config = load_config_or_default(Path::new("/nonexistent/squeezer.toml")).unwrap();
        assert_eq!(config.compression.default_framerate, 25);
        assert_eq!(config.platform.min_capable_api_level, 18);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[platform]
api_level = 17

[orchestrator]
cache_dir = "/tmp/squeezer-test"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.platform.api_level, Some(17));
        assert_eq!(
            config.orchestrator.cache_dir.to_str().unwrap(),
            "/tmp/squeezer-test"
        );
        // sections absent from the file keep defaults
        assert_eq!(config.encoder.video_codec, "libx264");
    }
}
