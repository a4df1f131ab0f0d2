use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Default framerate is not 0
/// - Quality tier is within the largest ladder (0..=3)
/// - Output file extension and encoder codec are not empty
/// - Encoder timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.compression.default_framerate == 0 {
        return Err(ConfigError::ValidationError(
            "compression.default_framerate cannot be 0".to_string(),
        ));
    }

    if let Some(tier) = config.compression.quality_tier {
        if tier > 3 {
            return Err(ConfigError::ValidationError(format!(
                "compression.quality_tier must be between 0 and 3, got {}",
                tier
            )));
        }
    }

    if config.orchestrator.extension.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "orchestrator.extension cannot be empty".to_string(),
        ));
    }

    if config.orchestrator.event_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.event_buffer cannot be 0".to_string(),
        ));
    }

    if config.encoder.video_codec.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "encoder.video_codec cannot be empty".to_string(),
        ));
    }

    if config.encoder.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "encoder.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_framerate_fails() {
        let mut config = Config::default();
        config.compression.default_framerate = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_quality_tier_out_of_range() {
        let mut config = Config::default();
        config.compression.quality_tier = Some(4);
        assert!(validate_config(&config).is_err());

        config.compression.quality_tier = Some(3);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_extension_fails() {
        let mut config = Config::default();
        config.orchestrator.extension = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.encoder.timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }
}
