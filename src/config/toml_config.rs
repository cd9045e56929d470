use crate::adapters::packager::PackagingMode;
use crate::core::dimensions::SizeLimits;
use crate::core::request::DEFAULT_ENDPOINT;
use crate::domain::model::ShippingDestination;
use crate::domain::units::{StoreUnits, UnitOfMeasure};
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub carrier: CarrierConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub limits: SizeLimits,
    #[serde(default)]
    pub packaging: PackagingConfig,
    pub verification: Option<VerificationConfig>,
}

/// InXpress account settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierConfig {
    #[serde(default)]
    pub account_id: String,
    /// Label shown to the customer next to the quoted rate.
    #[serde(default)]
    pub service_type: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub base_country: String,
    #[serde(default = "default_weight_unit")]
    pub weight_unit: UnitOfMeasure,
    #[serde(default = "default_dimension_unit")]
    pub dimension_unit: UnitOfMeasure,
}

fn default_weight_unit() -> UnitOfMeasure {
    UnitOfMeasure::Pound
}

fn default_dimension_unit() -> UnitOfMeasure {
    UnitOfMeasure::Inch
}

impl StoreConfig {
    pub fn new(base_country: impl Into<String>) -> Self {
        Self {
            base_country: base_country.into(),
            weight_unit: default_weight_unit(),
            dimension_unit: default_dimension_unit(),
        }
    }

    pub fn units(&self) -> StoreUnits {
        StoreUnits {
            weight_unit: self.weight_unit,
            dimension_unit: self.dimension_unit,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackagingConfig {
    #[serde(default)]
    pub mode: PackagingMode,
}

/// Destination used for the credential probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationConfig {
    pub postcode: String,
    pub country: String,
}

impl VerificationConfig {
    pub fn destination(&self) -> ShippingDestination {
        ShippingDestination::new(self.postcode.clone(), self.country.clone())
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(QuoteError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| QuoteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${INXPRESS_ACCOUNT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| QuoteError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("carrier.endpoint", &self.carrier.endpoint)?;
        validation::validate_positive_number(
            "carrier.timeout_seconds",
            self.carrier.timeout_seconds,
            1,
        )?;
        validation::validate_country_code("store.base_country", self.store.base_country.trim())?;

        for (key, limit) in self.limits.iter() {
            validation::validate_non_negative(&format!("limits.{}.minimum", key), limit.minimum)?;
            if limit.sub_units_per_unit == Some(0) {
                return Err(QuoteError::InvalidConfigValueError {
                    field: format!("limits.{}.sub_units_per_unit", key),
                    value: "0".to_string(),
                    reason: "Value must be at least 1".to_string(),
                });
            }
        }

        if let Some(verification) = &self.verification {
            validation::validate_non_empty_string("verification.postcode", &verification.postcode)?;
            validation::validate_country_code("verification.country", verification.country.trim())?;
        }

        // The carrier rejects blank credentials itself; only warn here.
        if self.carrier.account_id.trim().is_empty() {
            tracing::warn!("carrier.account_id is empty; InXpress will reject rate requests");
        }
        if self.carrier.service_type.trim().is_empty() {
            tracing::warn!("carrier.service_type is empty; the rate will show without a label");
        }

        Ok(())
    }

    pub fn verification_destination(&self) -> Option<ShippingDestination> {
        self.verification.as_ref().map(VerificationConfig::destination)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimensions::{HEIGHT, WEIGHT};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_content = r#"
[carrier]
account_id = "ACME1"
service_type = "InXpress Service"

[store]
base_country = "US"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.carrier.account_id, "ACME1");
        assert_eq!(config.carrier.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.carrier.timeout_seconds, 30);
        assert_eq!(config.store.units(), StoreUnits::default());
        assert_eq!(config.limits, SizeLimits::default());
        assert_eq!(config.packaging.mode, PackagingMode::Piece);
        assert!(config.verification_destination().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_limits_table() {
        let toml_content = r#"
[carrier]
account_id = "ACME1"
service_type = "InXpress"

[store]
base_country = "AU"
weight_unit = "kg"
dimension_unit = "cm"

[limits.weight]
minimum = 0.5
unit = "lb"
sub_units_per_unit = 16

[packaging]
mode = "mass"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        let weight = config.limits.get(WEIGHT).unwrap();
        assert_eq!(weight.minimum, 0.5);
        assert_eq!(weight.sub_units(), 16);
        assert!(config.limits.get(HEIGHT).is_none());
        assert_eq!(config.store.weight_unit, UnitOfMeasure::Kilogram);
        assert_eq!(config.packaging.mode, PackagingMode::Mass);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_INXPRESS_ACCOUNT", "ENV-ACCOUNT");

        let toml_content = r#"
[carrier]
account_id = "${TEST_INXPRESS_ACCOUNT}"
service_type = "InXpress"

[store]
base_country = "US"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.carrier.account_id, "ENV-ACCOUNT");

        std::env::remove_var("TEST_INXPRESS_ACCOUNT");
    }

    #[test]
    fn test_empty_credentials_are_permitted() {
        let toml_content = r#"
[carrier]

[store]
base_country = "US"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.carrier.account_id.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let bad_endpoint = r#"
[carrier]
account_id = "ACME1"
endpoint = "invalid-url"

[store]
base_country = "US"
"#;
        assert!(TomlConfig::from_toml_str(bad_endpoint)
            .unwrap()
            .validate()
            .is_err());

        let bad_country = r#"
[carrier]
account_id = "ACME1"

[store]
base_country = "USA"
"#;
        assert!(TomlConfig::from_toml_str(bad_country)
            .unwrap()
            .validate()
            .is_err());

        let bad_verification = r#"
[carrier]
account_id = "ACME1"

[store]
base_country = "US"

[verification]
postcode = "  "
country = "CA"
"#;
        assert!(TomlConfig::from_toml_str(bad_verification)
            .unwrap()
            .validate()
            .is_err());
    }

    #[test]
    fn test_unknown_unit_is_rejected() {
        let toml_content = r#"
[carrier]
account_id = "ACME1"

[store]
base_country = "US"
weight_unit = "stone"
"#;
        assert!(TomlConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[carrier]
account_id = "FILE1"
service_type = "From file"

[store]
base_country = "GB"

[verification]
postcode = "10001"
country = "US"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.carrier.account_id, "FILE1");
        assert_eq!(
            config.verification_destination(),
            Some(ShippingDestination::new("10001", "US"))
        );
    }
}
