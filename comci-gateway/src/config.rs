//! Gateway configuration.
//!
//! All knobs can be set from the environment via [`GatewayConfig::from_env`]
//! or programmatically with the `with_*` builders.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::timetable::KeyTolerance;

/// Default listen port.
const DEFAULT_PORT: u16 = 3000;

/// Default bound on a single request's provider interaction.
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Errors building a configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to a value that could not be parsed
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Neither provider source was configured
    #[error("no provider configured: set COMCI_PROVIDER_URL or COMCI_FIXTURE")]
    NoProvider,

    /// Both provider sources were configured
    #[error("COMCI_PROVIDER_URL and COMCI_FIXTURE are mutually exclusive")]
    ConflictingProviders,
}

/// Where timetable data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSource {
    /// Remote provider bridge at the given base URL
    Remote(String),
    /// JSON fixture file
    Fixture(PathBuf),
}

/// Which optional endpoints are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    /// `/school` and `/search`
    pub search: bool,
    /// `/classtime`
    pub classtime: bool,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            search: true,
            classtime: true,
        }
    }
}

/// Configuration for the timetable gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Upper bound on provider calls for one request.
    /// Exceeding it is reported as an upstream failure.
    pub provider_timeout: Duration,

    /// How strictly grade/class keys from the provider are interpreted.
    pub key_tolerance: KeyTolerance,

    /// Answer `/timetable` on Saturdays and Sundays without calling the provider.
    pub weekend_short_circuit: bool,

    /// Optional endpoints
    pub endpoints: Endpoints,

    /// Provider selection. Only the binary requires this.
    pub provider: Option<ProviderSource>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            key_tolerance: KeyTolerance::Lenient,
            weekend_short_circuit: false,
            endpoints: Endpoints::default(),
            provider: None,
        }
    }
}

impl GatewayConfig {
    /// Build a configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a configuration using `lookup` to read variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            config.port = port;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "COMCI_PROVIDER_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "COMCI_PROVIDER_TIMEOUT_SECS",
                    value: secs.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            config.provider_timeout = Duration::from_secs(secs);
        }
        if let Some(tolerance) = parse_var(&lookup, "COMCI_KEY_TOLERANCE")? {
            config.key_tolerance = tolerance;
        }
        if let Some(flag) = parse_flag(&lookup, "COMCI_WEEKEND_SHORT_CIRCUIT")? {
            config.weekend_short_circuit = flag;
        }
        if let Some(flag) = parse_flag(&lookup, "COMCI_ENABLE_SEARCH")? {
            config.endpoints.search = flag;
        }
        if let Some(flag) = parse_flag(&lookup, "COMCI_ENABLE_CLASSTIME")? {
            config.endpoints.classtime = flag;
        }

        let url = lookup("COMCI_PROVIDER_URL").filter(|s| !s.trim().is_empty());
        let fixture = lookup("COMCI_FIXTURE").filter(|s| !s.trim().is_empty());
        config.provider = match (url, fixture) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingProviders),
            (Some(url), None) => Some(ProviderSource::Remote(url)),
            (None, Some(path)) => Some(ProviderSource::Fixture(PathBuf::from(path))),
            (None, None) => None,
        };

        Ok(config)
    }

    /// The configured provider source, or an error if none was set.
    pub fn require_provider(&self) -> Result<&ProviderSource, ConfigError> {
        self.provider.as_ref().ok_or(ConfigError::NoProvider)
    }

    /// Set the listen port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the provider timeout.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Set key tolerance.
    pub fn with_key_tolerance(mut self, tolerance: KeyTolerance) -> Self {
        self.key_tolerance = tolerance;
        self
    }

    /// Enable or disable the weekend short-circuit for `/timetable`.
    pub fn with_weekend_short_circuit(mut self, enabled: bool) -> Self {
        self.weekend_short_circuit = enabled;
        self
    }

    /// Set which optional endpoints are served.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Provider timeout in whole seconds, for messages.
    pub fn provider_timeout_secs(&self) -> u64 {
        self.provider_timeout.as_secs()
    }

    /// Address to listen on. `HOST` may be a hostname or an IPv6 literal,
    /// so it is resolved by the socket layer rather than parsed here.
    pub fn listen_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
    }
}

fn parse_flag<F>(lookup: &F, var: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::Invalid {
            var,
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[tokio::test]
    async fn hostname_and_ipv6_hosts_bind() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("HOST", "localhost"),
            ("PORT", "0"),
        ]))
        .unwrap();
        assert_eq!(config.listen_addr(), ("localhost", 0));
        let listener = tokio::net::TcpListener::bind(config.listen_addr()).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());

        let config = GatewayConfig::from_lookup(lookup_from(&[("HOST", "::1")])).unwrap();
        assert_eq!(config.listen_addr(), ("::1", 3000));
    }

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();

        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.provider_timeout, Duration::from_secs(10));
        assert_eq!(config.key_tolerance, KeyTolerance::Lenient);
        assert!(!config.weekend_short_circuit);
        assert_eq!(config.endpoints, Endpoints::default());
        assert!(config.provider.is_none());
    }

    #[test]
    fn reads_environment() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("COMCI_PROVIDER_TIMEOUT_SECS", "3"),
            ("COMCI_KEY_TOLERANCE", "strict"),
            ("COMCI_WEEKEND_SHORT_CIRCUIT", "true"),
            ("COMCI_ENABLE_CLASSTIME", "off"),
            ("COMCI_FIXTURE", "data/fixture.json"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.provider_timeout, Duration::from_secs(3));
        assert_eq!(config.key_tolerance, KeyTolerance::Strict);
        assert!(config.weekend_short_circuit);
        assert!(config.endpoints.search);
        assert!(!config.endpoints.classtime);
        assert_eq!(
            config.provider,
            Some(ProviderSource::Fixture(PathBuf::from("data/fixture.json")))
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup_from(&[("COMCI_PROVIDER_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn invalid_flag_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup_from(&[("COMCI_ENABLE_SEARCH", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("COMCI_ENABLE_SEARCH"));
    }

    #[test]
    fn provider_sources_are_exclusive() {
        let err = GatewayConfig::from_lookup(lookup_from(&[
            ("COMCI_PROVIDER_URL", "http://bridge"),
            ("COMCI_FIXTURE", "fixture.json"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingProviders));
    }

    #[test]
    fn missing_provider_is_reported_on_demand() {
        let config = GatewayConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(matches!(
            config.require_provider(),
            Err(ConfigError::NoProvider)
        ));

        let config =
            GatewayConfig::from_lookup(lookup_from(&[("COMCI_PROVIDER_URL", "http://bridge")]))
                .unwrap();
        assert_eq!(
            config.require_provider().unwrap(),
            &ProviderSource::Remote("http://bridge".to_string())
        );
    }

    #[test]
    fn builders() {
        let config = GatewayConfig::default()
            .with_port(8080)
            .with_provider_timeout(Duration::from_secs(2))
            .with_key_tolerance(KeyTolerance::Strict)
            .with_weekend_short_circuit(true)
            .with_endpoints(Endpoints {
                search: false,
                classtime: true,
            });

        assert_eq!(config.port, 8080);
        assert_eq!(config.provider_timeout_secs(), 2);
        assert_eq!(config.key_tolerance, KeyTolerance::Strict);
        assert!(config.weekend_short_circuit);
        assert!(!config.endpoints.search);
    }
}
