//! Configuration for a reconciliation run
//!
//! The configuration is a JSON file read once at startup:
//!
//! ```json
//! {
//!   "projectId": "my-project",
//!   "keyFileLocation": "/etc/ddns/service-account.json",
//!   "zoneName": "home-zone",
//!   "dnsNames": ["home.example.com.", "vpn.example.com."]
//! }
//! ```
//!
//! Optional keys: `defaultTtl`, `ipServices`, `ipTimeoutSecs`.

use crate::records::{DEFAULT_TTL, normalize_name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Lookup services queried in order until one answers
pub const DEFAULT_IP_SERVICES: &[&str] = &[
    "https://api.ipify.org",
    "https://ifconfig.me/ip",
    "https://icanhazip.com",
];

/// Main configuration of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Cloud project owning the managed zone
    #[serde(default)]
    pub project_id: String,

    /// Path to the service-account key file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file_location: Option<String>,

    /// Managed zone name (provider identifier, e.g. "home-zone")
    #[serde(default)]
    pub zone_name: String,

    /// Hostnames that should resolve to this host
    #[serde(default)]
    pub dns_names: Vec<String>,

    /// TTL for newly created records (seconds)
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,

    /// External IP lookup services, queried in order
    #[serde(default = "default_ip_services")]
    pub ip_services: Vec<String>,

    /// Per-service lookup timeout (seconds)
    #[serde(default = "default_ip_timeout_secs")]
    pub ip_timeout_secs: u64,
}

impl SyncConfig {
    /// Create a configuration with defaults for the optional keys
    pub fn new(
        project_id: impl Into<String>,
        zone_name: impl Into<String>,
        dns_names: Vec<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            key_file_location: None,
            zone_name: zone_name.into(),
            dns_names,
            default_ttl: default_ttl(),
            ip_services: default_ip_services(),
            ip_timeout_secs: default_ip_timeout_secs(),
        }
    }

    /// Set the service-account key file location
    pub fn with_key_file(mut self, path: impl Into<String>) -> Self {
        self.key_file_location = Some(path.into());
        self
    }

    /// Parse and validate a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| crate::Error::config(format!("Invalid configuration JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!(
                "Cannot read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Validate the configuration
    ///
    /// Fails before any network call if a required field is missing.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.project_id.trim().is_empty() {
            return Err(crate::Error::config("projectId is required"));
        }

        if self.zone_name.trim().is_empty() {
            return Err(crate::Error::config("zoneName is required"));
        }

        if self.dns_names.is_empty() {
            return Err(crate::Error::config(
                "dnsNames must contain at least one name",
            ));
        }

        for name in &self.dns_names {
            validate_dns_name(name)?;
        }

        if !(1..=86_400).contains(&self.default_ttl) {
            return Err(crate::Error::config(format!(
                "defaultTtl must be between 1 and 86400 seconds. Got: {}",
                self.default_ttl
            )));
        }

        if self.ip_services.is_empty() {
            return Err(crate::Error::config(
                "ipServices must contain at least one URL",
            ));
        }

        for url in &self.ip_services {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(crate::Error::config(format!(
                    "ipServices entries must use HTTP or HTTPS. Got: {}",
                    url
                )));
            }
        }

        if !(1..=60).contains(&self.ip_timeout_secs) {
            return Err(crate::Error::config(format!(
                "ipTimeoutSecs must be between 1 and 60 seconds. Got: {}",
                self.ip_timeout_secs
            )));
        }

        Ok(())
    }

    /// Desired names in canonical form, deduplicated
    pub fn desired_names(&self) -> BTreeSet<String> {
        self.dns_names.iter().map(|name| normalize_name(name)).collect()
    }
}

/// Validate that a string is a usable DNS name
///
/// Basic RFC 1035 checks; a trailing root dot and a leading `*` wildcard
/// label are accepted.
pub fn validate_dns_name(name: &str) -> Result<(), crate::Error> {
    let domain = name.strip_suffix('.').unwrap_or(name);

    if domain.is_empty() {
        return Err(crate::Error::config("DNS name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "DNS name too long: {} chars (max 253). Got: {}",
            domain.len(),
            name
        )));
    }

    for (index, label) in domain.split('.').enumerate() {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "DNS name has empty label: '{}'",
                name
            )));
        }

        if index == 0 && label == "*" {
            continue;
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "DNS label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(crate::Error::config(format!(
                "DNS label contains invalid characters. Label: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "DNS label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_ip_services() -> Vec<String> {
    DEFAULT_IP_SERVICES.iter().map(|s| s.to_string()).collect()
}

fn default_ip_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_minimal_config() {
        let config = SyncConfig::from_json_str(
            r#"{
                "projectId": "my-project",
                "keyFileLocation": "/etc/ddns/key.json",
                "zoneName": "home-zone",
                "dnsNames": ["home.example.com.", "VPN.example.com", "home.example.com"]
            }"#,
        )
        .unwrap();

        assert_eq!(config.project_id, "my-project");
        assert_eq!(config.key_file_location.as_deref(), Some("/etc/ddns/key.json"));
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.ip_services.len(), DEFAULT_IP_SERVICES.len());
        assert_eq!(
            config.desired_names().into_iter().collect::<Vec<_>>(),
            vec!["home.example.com.".to_string(), "vpn.example.com.".to_string()]
        );
    }

    #[test]
    fn missing_required_fields_are_config_errors() {
        for json in [
            r#"{"zoneName": "z", "dnsNames": ["a.example.com"]}"#,
            r#"{"projectId": "p", "dnsNames": ["a.example.com"]}"#,
            r#"{"projectId": "p", "zoneName": "z"}"#,
            r#"{"projectId": "p", "zoneName": "z", "dnsNames": []}"#,
        ] {
            let err = SyncConfig::from_json_str(json).unwrap_err();
            assert!(err.is_config(), "expected config error for {json}: {err}");
        }
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = SyncConfig::from_json_str("{ not json").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn optional_keys_are_range_checked() {
        let mut config = SyncConfig::new("p", "z", vec!["a.example.com".to_string()]);
        assert!(config.validate().is_ok());

        config.default_ttl = 0;
        assert!(config.validate().is_err());
        config.default_ttl = 60;

        config.ip_services = vec!["ftp://example.com".to_string()];
        assert!(config.validate().is_err());
        config.ip_services = vec!["https://api.ipify.org".to_string()];

        config.ip_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn dns_name_rules() {
        assert!(validate_dns_name("example.com").is_ok());
        assert!(validate_dns_name("home.example.com.").is_ok());
        assert!(validate_dns_name("*.example.com.").is_ok());
        assert!(validate_dns_name("").is_err());
        assert!(validate_dns_name(".").is_err());
        assert!(validate_dns_name("bad..example.com").is_err());
        assert!(validate_dns_name("-bad.example.com").is_err());
        assert!(validate_dns_name("sp ace.example.com").is_err());
        assert!(validate_dns_name(&format!("{}.com", "a".repeat(64))).is_err());
    }

    #[test]
    fn reads_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"projectId": "p", "zoneName": "z", "dnsNames": ["a.example.com"], "defaultTtl": 120}}"#
        )
        .unwrap();

        let config = SyncConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default_ttl, 120);
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let err = SyncConfig::from_file("/nonexistent/ddns/config.json").unwrap_err();
        assert!(err.is_config());
    }
}
