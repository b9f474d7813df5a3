//! Runtime configuration
//!
//! Values are layered: built-in defaults, then the TOML file, then `CEPDIST_*`
//! environment variables, then command-line flags.

use crate::error::{CepDistError, ErrorCode, Result};
use crate::geo::Coordinate;
use crate::providers::{ip_api, nominatim, viacep};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub mod loader;

pub use loader::ConfigLoader;

/// Location of the user-level config file, when a home directory exists
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("br", "cepdist", "cepdist").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filter used when no `-v` flag is given
    pub log_level: Option<String>,
    pub http: HttpSettings,
    pub postal_lookup: PostalLookupSettings,
    pub geocoder: GeocoderSettings,
    pub location: LocationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("cepdist/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostalLookupSettings {
    pub base_url: String,
}

impl Default for PostalLookupSettings {
    fn default() -> Self {
        Self {
            base_url: viacep::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderSettings {
    pub base_url: String,
    /// Comma-separated ISO 3166-1 codes restricting forward searches
    pub country_codes: Option<String>,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            base_url: nominatim::DEFAULT_BASE_URL.to_string(),
            country_codes: Some("br".to_string()),
        }
    }
}

/// How the location permission question is answered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    Granted,
    Denied,
    #[default]
    Prompt,
}

impl FromStr for PermissionPolicy {
    type Err = CepDistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "granted" | "grant" | "allow" => Ok(Self::Granted),
            "denied" | "deny" => Ok(Self::Denied),
            "prompt" | "ask" => Ok(Self::Prompt),
            other => Err(CepDistError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                format!("Unknown location permission '{other}' (expected granted, denied or prompt)"),
            )),
        }
    }
}

impl fmt::Display for PermissionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Prompt => "prompt",
        };
        f.write_str(name)
    }
}

/// Where the device fix comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    Fixed,
    #[default]
    Ip,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSettings {
    pub permission: PermissionPolicy,
    pub source: LocationSource,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_lookup_url: String,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            permission: PermissionPolicy::default(),
            source: LocationSource::default(),
            latitude: None,
            longitude: None,
            ip_lookup_url: ip_api::DEFAULT_URL.to_string(),
        }
    }
}

impl LocationSettings {
    /// The configured fixed coordinate, if both halves are present
    pub fn fixed_coordinate(&self) -> Result<Option<Coordinate>> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon).map(Some),
            (None, None) => Ok(None),
            _ => Err(CepDistError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "location.latitude and location.longitude must be set together",
            )),
        }
    }

    /// Pin the device to a coordinate, overriding the configured source
    pub fn pin(&mut self, coordinate: Coordinate) {
        self.source = LocationSource::Fixed;
        self.latitude = Some(coordinate.lat());
        self.longitude = Some(coordinate.lon());
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| {
        CepDistError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!("{key}='{value}' is invalid: {e}"),
        )
    })
}

fn check_url(name: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value).map_err(|e| {
        CepDistError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!("{name} is not a valid URL: {e}"),
        )
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(CepDistError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!("{name} must use http or https, not '{scheme}'"),
        )),
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `CEPDIST_*` overrides from the process environment
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_vars_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn merge_vars_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("CEPDIST_LOG_LEVEL") {
            self.log_level = Some(level);
        }
        if let Some(url) = lookup("CEPDIST_VIACEP_URL") {
            self.postal_lookup.base_url = url;
        }
        if let Some(url) = lookup("CEPDIST_NOMINATIM_URL") {
            self.geocoder.base_url = url;
        }
        if let Some(agent) = lookup("CEPDIST_USER_AGENT") {
            self.http.user_agent = agent;
        }
        if let Some(timeout) = lookup("CEPDIST_HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = parse_env("CEPDIST_HTTP_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(permission) = lookup("CEPDIST_LOCATION_PERMISSION") {
            self.location.permission = permission.parse()?;
        }

        let lat = lookup("CEPDIST_LOCATION_LAT")
            .map(|v| parse_env::<f64>("CEPDIST_LOCATION_LAT", &v))
            .transpose()?;
        let lon = lookup("CEPDIST_LOCATION_LON")
            .map(|v| parse_env::<f64>("CEPDIST_LOCATION_LON", &v))
            .transpose()?;
        if lat.is_some() || lon.is_some() {
            self.location.latitude = lat.or(self.location.latitude);
            self.location.longitude = lon.or(self.location.longitude);
            self.location.source = LocationSource::Fixed;
        }

        Ok(())
    }

    /// Reject values the adapters cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(CepDistError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "http.timeout_secs must be greater than zero",
            ));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(CepDistError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "http.user_agent must not be empty",
            ));
        }

        check_url("postal_lookup.base_url", &self.postal_lookup.base_url)?;
        check_url("geocoder.base_url", &self.geocoder.base_url)?;
        check_url("location.ip_lookup_url", &self.location.ip_lookup_url)?;

        let fixed = self.location.fixed_coordinate().map_err(|e| {
            CepDistError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, e.user_message())
        })?;
        if self.location.source == LocationSource::Fixed && fixed.is_none() {
            return Err(CepDistError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "location.source = \"fixed\" needs location.latitude and location.longitude",
            ));
        }

        Ok(())
    }
}
