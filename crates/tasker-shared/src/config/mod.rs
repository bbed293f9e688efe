//! Layered TOML configuration (§6 "Configuration", §13).
//!
//! A base file plus an environment-specific override file, composed
//! through the `config` crate the same way the corpus layers
//! `config/tasker/base/*.toml` with `config/tasker/environments/{env}/*.toml`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `Features.ReferentialIntegrityValidation` — master switch for all
/// reference checks performed by the (out-of-scope) entity managers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_true")]
    pub referential_integrity_validation: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            referential_integrity_validation: true,
        }
    }
}

/// `ReferentialIntegrity.Validate{Assignment,Schema,...}References` —
/// per-check switches, only consulted when the master switch above is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferentialIntegrityConfig {
    #[serde(default = "default_true")]
    pub validate_assignment_references: bool,
    #[serde(default = "default_true")]
    pub validate_schema_references: bool,
    #[serde(default = "default_true")]
    pub validate_processor_references: bool,
    #[serde(default = "default_true")]
    pub validate_workflow_references: bool,
}

impl Default for ReferentialIntegrityConfig {
    fn default() -> Self {
        Self {
            validate_assignment_references: true,
            validate_schema_references: true,
            validate_processor_references: true,
            validate_workflow_references: true,
        }
    }
}

/// `SchemaValidation.Enable{Input,Output}Validation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaValidationConfig {
    #[serde(default = "default_true")]
    pub enable_input_validation: bool,
    #[serde(default = "default_true")]
    pub enable_output_validation: bool,
}

impl Default for SchemaValidationConfig {
    fn default() -> Self {
        Self {
            enable_input_validation: true,
            enable_output_validation: true,
        }
    }
}

/// `ManagerUrls.<Entity>` — base URL per entity manager (§6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerUrlsConfig {
    #[serde(flatten)]
    pub urls: HashMap<String, String>,
}

impl ManagerUrlsConfig {
    pub fn url_for(&self, entity: &str) -> Option<&str> {
        self.urls.get(entity).map(String::as_str)
    }
}

/// `ProcessorHealthMonitor.HealthCheckInterval` (seconds, §4.4/§8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorHealthMonitorConfig {
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_seconds: u64,
}

impl Default for ProcessorHealthMonitorConfig {
    fn default() -> Self {
        Self {
            health_check_interval_seconds: default_health_check_interval(),
        }
    }
}

/// `ProcessorInitialization.RetryEndlessly`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorInitializationConfig {
    #[serde(default)]
    pub retry_endlessly: bool,
}

impl Default for ProcessorInitializationConfig {
    fn default() -> Self {
        Self {
            retry_endlessly: false,
        }
    }
}

/// `OrchestratorHealthMonitor.CacheMapName`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorHealthMonitorConfig {
    #[serde(default = "default_health_map_name")]
    pub cache_map_name: String,
}

impl Default for OrchestratorHealthMonitorConfig {
    fn default() -> Self {
        Self {
            cache_map_name: default_health_map_name(),
        }
    }
}

/// `ProcessorActivityDataCache.MapName`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorActivityDataCacheConfig {
    #[serde(default = "default_activity_map_name")]
    pub map_name: String,
}

impl Default for ProcessorActivityDataCacheConfig {
    fn default() -> Self {
        Self {
            map_name: default_activity_map_name(),
        }
    }
}

/// `ManagerConfiguration.Name/Version` — this deployment's identity,
/// used e.g. when registering against external managers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfigurationConfig {
    #[serde(default = "default_manager_name")]
    pub name: String,
    #[serde(default = "default_manager_version")]
    pub version: String,
}

impl Default for ManagerConfigurationConfig {
    fn default() -> Self {
        Self {
            name: default_manager_name(),
            version: default_manager_version(),
        }
    }
}

/// Correlation-id header name (§6, default `X-Correlation-ID`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationConfig {
    #[serde(default = "default_correlation_header")]
    pub header_name: String,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            header_name: default_correlation_header(),
        }
    }
}

/// `OrchestrationCacheModel`'s map name, not exercised by any §6 key in
/// the base spec but needed by C3/C4/C5/C6 to agree on where the model
/// lives; grouped here rather than invented ad hoc in each crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationDataCacheConfig {
    #[serde(default = "default_orchestration_map_name")]
    pub map_name: String,
    #[serde(default = "default_model_ttl_seconds")]
    pub model_ttl_seconds: u64,
    #[serde(default = "default_activity_blob_ttl_seconds")]
    pub activity_blob_ttl_seconds: u64,
}

impl Default for OrchestrationDataCacheConfig {
    fn default() -> Self {
        Self {
            map_name: default_orchestration_map_name(),
            model_ttl_seconds: default_model_ttl_seconds(),
            activity_blob_ttl_seconds: default_activity_blob_ttl_seconds(),
        }
    }
}

/// Root configuration, composed from every sub-config §6 enumerates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskerConfig {
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub referential_integrity: ReferentialIntegrityConfig,
    #[serde(default)]
    pub schema_validation: SchemaValidationConfig,
    #[serde(default)]
    pub manager_urls: ManagerUrlsConfig,
    #[serde(default)]
    pub processor_health_monitor: ProcessorHealthMonitorConfig,
    #[serde(default)]
    pub processor_initialization: ProcessorInitializationConfig,
    #[serde(default)]
    pub orchestrator_health_monitor: OrchestratorHealthMonitorConfig,
    #[serde(default)]
    pub processor_activity_data_cache: ProcessorActivityDataCacheConfig,
    #[serde(default)]
    pub orchestration_data_cache: OrchestrationDataCacheConfig,
    #[serde(default)]
    pub manager_configuration: ManagerConfigurationConfig,
    #[serde(default)]
    pub correlation: CorrelationConfig,
}

impl TaskerConfig {
    /// Load `config/base.toml` layered with `config/{env}.toml`
    /// (`env` from `$TASKER_ENV`, default `development`), then
    /// `TASKER__`-prefixed environment variable overrides — the same
    /// base+environment+env-var layering order the corpus uses for its
    /// own `TaskerConfig`.
    pub fn load(config_dir: &std::path::Path) -> Result<Self, config::ConfigError> {
        let env = std::env::var("TASKER_ENV").unwrap_or_else(|_| "development".to_string());
        let builder = config::Config::builder()
            .add_source(config::File::from(config_dir.join("base.toml")).required(false))
            .add_source(config::File::from(config_dir.join(format!("{env}.toml"))).required(false))
            .add_source(config::Environment::with_prefix("TASKER").separator("__"));
        builder.build()?.try_deserialize()
    }
}

fn default_true() -> bool {
    true
}
fn default_health_check_interval() -> u64 {
    30
}
fn default_health_map_name() -> String {
    "processor-health".to_string()
}
fn default_activity_map_name() -> String {
    "processor-activity".to_string()
}
fn default_orchestration_map_name() -> String {
    "orchestration-data".to_string()
}
fn default_model_ttl_seconds() -> u64 {
    3600
}
fn default_activity_blob_ttl_seconds() -> u64 {
    900
}
fn default_manager_name() -> String {
    "tasker-orchestration".to_string()
}
fn default_manager_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
fn default_correlation_header() -> String {
    crate::correlation::HEADER_NAME.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = TaskerConfig::default();
        assert!(config.features.referential_integrity_validation);
        assert_eq!(config.correlation.header_name, "X-Correlation-ID");
        assert_eq!(
            config.processor_activity_data_cache.map_name,
            "processor-activity"
        );
        assert_eq!(config.orchestrator_health_monitor.cache_map_name, "processor-health");
        assert_eq!(config.orchestration_data_cache.map_name, "orchestration-data");
    }

    #[test]
    fn manager_urls_flatten_from_toml() {
        let toml_str = r#"
            [manager_urls]
            Schema = "http://schema-manager:8080"
            Address = "http://address-manager:8080"
        "#;
        let parsed: TaskerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            parsed.manager_urls.url_for("Schema"),
            Some("http://schema-manager:8080")
        );
    }
}
