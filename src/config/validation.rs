use crate::config::types::{
    Config, CrawlerConfig, HttpConfig, OutputConfig, PatternConfig, RetryConfig,
};
use crate::ConfigError;
use regex::Regex;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_domains(&config.domains)?;
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_retry_config(&config.retry)?;
    validate_pattern_config(&config.patterns)?;
    validate_output_config(&config.output)?;

    if config.browser.navigation_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "navigation_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the domain list (entries are bare hostnames or full URLs)
pub fn validate_domains(domains: &[String]) -> Result<(), ConfigError> {
    for domain in domains {
        let trimmed = domain.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Validation(
                "domain entries cannot be empty".to_string(),
            ));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "domain '{}' contains whitespace",
                domain
            )));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_validations < 1 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_validations must be >= 1, got {}",
            config.max_concurrent_validations
        )));
    }

    if config.max_domain_validations < 1 {
        return Err(ConfigError::Validation(format!(
            "max_domain_validations must be >= 1, got {}",
            config.max_domain_validations
        )));
    }

    if config.max_domain_validations > config.max_concurrent_validations {
        return Err(ConfigError::Validation(format!(
            "max_domain_validations ({}) cannot exceed max_concurrent_validations ({})",
            config.max_domain_validations, config.max_concurrent_validations
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 || config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "HTTP timeouts must be >= 1 second".to_string(),
        ));
    }

    if config.connect_timeout_secs > config.request_timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs ({}) cannot exceed request_timeout_secs ({})",
            config.connect_timeout_secs, config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates retry policy configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "max_attempts must be >= 1".to_string(),
        ));
    }

    if !config.backoff_factor.is_finite() || config.backoff_factor < 1.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_factor must be a finite value >= 1.0, got {}",
            config.backoff_factor
        )));
    }

    Ok(())
}

/// Validates the pattern tables; every product regex must compile
fn validate_pattern_config(config: &PatternConfig) -> Result<(), ConfigError> {
    if config.product.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "product pattern table cannot be empty".to_string(),
        ));
    }

    for pattern in &config.product {
        Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
    }

    if config.keywords.iter().all(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "at least one product keyword is required".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
