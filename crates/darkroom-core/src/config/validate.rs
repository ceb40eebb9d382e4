//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.normalize.max_width == 0 {
            return Err(ConfigError::ValidationError(
                "normalize.max_width must be > 0".into(),
            ));
        }
        if self.normalize.max_height == 0 {
            return Err(ConfigError::ValidationError(
                "normalize.max_height must be > 0".into(),
            ));
        }
        if self.normalize.jpeg_quality == 0 || self.normalize.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(
                "normalize.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.stability.retries == 0 {
            return Err(ConfigError::ValidationError(
                "stability.retries must be > 0".into(),
            ));
        }
        if self.stability.interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "stability.interval_ms must be > 0".into(),
            ));
        }
        if self.queue.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "queue.max_retries must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_max_width_rejected() {
        let mut config = Config::default();
        config.normalize.max_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut config = Config::default();
        config.queue.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quality_out_of_range_rejected() {
        let mut config = Config::default();
        config.normalize.jpeg_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_formats_rejected() {
        let mut config = Config::default();
        config.processing.supported_formats.clear();
        assert!(config.validate().is_err());
    }
}
