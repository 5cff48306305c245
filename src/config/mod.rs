use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::models::ShowDefaults;
use crate::services::VolumeDiscount;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub venue: VenueConfig,
    pub pricing: PricingConfig,
    pub features: FeatureFlags,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Зал: одинаковая схема мест для всех шоу
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    pub name: String,
    pub rows: u32,
    pub cols: u32,
}

// Цены и ограничения продаж
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    pub default_seat_price: Decimal,
    pub max_seats_per_user: u32,
    pub volume_discount_threshold: u32,
    pub volume_discount_percent: Decimal,
}

// Feature flags для включения/выключения функциональности
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub seed_demo_data: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("{name} must be a valid {expected}, got '{value}'")]
pub struct ConfigError {
    name: &'static str,
    expected: &'static str,
    value: String,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(name: &'static str, default: &str, expected: &'static str) -> Result<T, ConfigError> {
    let value = var_or(name, default);
    value.trim().parse().map_err(|_| ConfigError { name, expected, value })
}

/// Верхняя граница числа мест в зале.
pub const MAX_VENUE_CAPACITY: u32 = 100_000;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parse_var("PORT", "8000", "port number")?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "box_office=debug,tower_http=debug"),
            },
            venue: VenueConfig {
                name: var_or("VENUE_NAME", "Bucks Centre for the Performing Arts (BCPA)"),
                rows: parse_var("VENUE_ROWS", "20", "positive number")?,
                cols: parse_var("VENUE_COLS", "27", "positive number")?,
            },
            pricing: PricingConfig {
                default_seat_price: parse_var("DEFAULT_SEAT_PRICE", "10.00", "decimal amount")?,
                max_seats_per_user: parse_var("MAX_SEATS_PER_USER", "50", "positive number")?,
                volume_discount_threshold: parse_var("VOLUME_DISCOUNT_THRESHOLD", "6", "number")?,
                volume_discount_percent: parse_var("VOLUME_DISCOUNT_PERCENT", "5", "decimal percent")?,
            },
            features: FeatureFlags {
                seed_demo_data: parse_var("SEED_DEMO_DATA", "true", "boolean")?,
            },
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        let invalid = |name: &'static str, expected: &'static str, value: String| -> Result<(), ConfigError> {
            Err(ConfigError { name, expected, value })
        };
        if self.venue.rows == 0 {
            return invalid("VENUE_ROWS", "positive number", "0".into());
        }
        if self.venue.cols == 0 {
            return invalid("VENUE_COLS", "positive number", "0".into());
        }
        let capacity = self.venue.rows.checked_mul(self.venue.cols);
        if capacity.map_or(true, |seats| seats > MAX_VENUE_CAPACITY) {
            return invalid(
                "VENUE_ROWS",
                "venue size of at most 100000 seats",
                format!("{}x{}", self.venue.rows, self.venue.cols),
            );
        }
        if self.pricing.default_seat_price.is_sign_negative() {
            return invalid(
                "DEFAULT_SEAT_PRICE",
                "non-negative amount",
                self.pricing.default_seat_price.to_string(),
            );
        }
        if self.pricing.max_seats_per_user == 0 {
            return invalid("MAX_SEATS_PER_USER", "positive number", "0".into());
        }
        let percent = self.pricing.volume_discount_percent;
        if percent.is_sign_negative() || percent > Decimal::ONE_HUNDRED {
            return invalid("VOLUME_DISCOUNT_PERCENT", "percent in 0..=100", percent.to_string());
        }
        Ok(())
    }

    pub fn show_defaults(&self) -> ShowDefaults {
        ShowDefaults {
            seat_price: self.pricing.default_seat_price,
            max_seats_per_user: self.pricing.max_seats_per_user,
        }
    }

    pub fn volume_discount(&self) -> VolumeDiscount {
        VolumeDiscount {
            threshold: self.pricing.volume_discount_threshold,
            percent: self.pricing.volume_discount_percent,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let defaults = ShowDefaults::default();
        let discount = VolumeDiscount::default();
        Config {
            app: AppConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                environment: "development".to_string(),
                rust_log: "box_office=debug,tower_http=debug".to_string(),
            },
            venue: VenueConfig {
                name: "Bucks Centre for the Performing Arts (BCPA)".to_string(),
                rows: 20,
                cols: 27,
            },
            pricing: PricingConfig {
                default_seat_price: defaults.seat_price,
                max_seats_per_user: defaults.max_seats_per_user,
                volume_discount_threshold: discount.threshold,
                volume_discount_percent: discount.percent,
            },
            features: FeatureFlags { seed_demo_data: true },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_are_consistent() {
        let config = Config::default();
        assert!(config.check().is_ok());
        assert_eq!(config.venue.rows * config.venue.cols, 540);
        assert_eq!(config.volume_discount().percent, dec!(5));
        assert_eq!(config.show_defaults().seat_price, dec!(10.00));
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        config.pricing.volume_discount_percent = dec!(120);
        assert!(config.check().is_err());

        let mut config = Config::default();
        config.venue.cols = 0;
        let err = config.check().unwrap_err();
        assert!(err.to_string().starts_with("VENUE_COLS"));
    }

    #[test]
    fn rejects_oversized_venue() {
        let mut config = Config::default();
        config.venue.rows = 70_000;
        config.venue.cols = 70_000;
        let err = config.check().unwrap_err();
        assert_eq!(
            err.to_string(),
            "VENUE_ROWS must be a valid venue size of at most 100000 seats, got '70000x70000'"
        );

        config.venue.rows = 1_000;
        config.venue.cols = 101;
        assert!(config.check().is_err());

        config.venue.cols = 100;
        assert!(config.check().is_ok());
    }

    #[test]
    fn parse_var_reports_the_variable() {
        let err = parse_var::<u16>("BOX_OFFICE_TEST_UNSET_PORT", "eighty", "port number").unwrap_err();
        assert_eq!(
            err.to_string(),
            "BOX_OFFICE_TEST_UNSET_PORT must be a valid port number, got 'eighty'"
        );
    }
}
