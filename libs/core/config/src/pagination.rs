use crate::{env_or_default, ConfigError, FromEnv};

const DEFAULT_PAGE_SIZE: u64 = 10;

/// Page-number pagination settings shared by every paginated listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationConfig {
    pub page_size: u64,
}

impl PaginationConfig {
    pub fn new(page_size: u64) -> Self {
        Self { page_size }
    }
}

impl FromEnv for PaginationConfig {
    /// Reads `PAGE_SIZE` (default 10). Zero is rejected.
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or_default("PAGE_SIZE", &DEFAULT_PAGE_SIZE.to_string());
        let page_size: u64 = raw.parse().map_err(|e| ConfigError::ParseError {
            key: "PAGE_SIZE".to_string(),
            details: format!("{}", e),
        })?;

        if page_size == 0 {
            return Err(ConfigError::ParseError {
                key: "PAGE_SIZE".to_string(),
                details: "must be at least 1".to_string(),
            });
        }

        Ok(Self { page_size })
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_config_default() {
        temp_env::with_var_unset("PAGE_SIZE", || {
            let config = PaginationConfig::from_env().unwrap();
            assert_eq!(config.page_size, 10);
        });
    }

    #[test]
    fn test_pagination_config_custom() {
        temp_env::with_var("PAGE_SIZE", Some("25"), || {
            assert_eq!(PaginationConfig::from_env().unwrap().page_size, 25);
        });
    }

    #[test]
    fn test_pagination_config_rejects_zero() {
        temp_env::with_var("PAGE_SIZE", Some("0"), || {
            let err = PaginationConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("PAGE_SIZE"));
        });
    }

    #[test]
    fn test_pagination_config_rejects_garbage() {
        temp_env::with_var("PAGE_SIZE", Some("ten"), || {
            assert!(PaginationConfig::from_env().is_err());
        });
    }
}
