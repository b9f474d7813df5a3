//! Runtime initialization and setup
//!
//! Loads configuration, starts logging and wires the real collaborators
//! into a [`DistanceWorkflow`].

use crate::app::{config::AppConfig, logging::init_logging};
use crate::config::{Config, ConfigLoader, LocationSource};
use crate::error::Result;
use crate::providers::{
    build_client, CompositeResolver, DeviceLocationProvider, FixSource, IpLocator, LineInput,
    NominatimClient, ViaCepClient,
};
use crate::session::LoggingObserver;
use crate::workflow::DistanceWorkflow;
use std::sync::Arc;
use tracing::debug;

/// Load configuration and initialize logging
pub async fn initialize_app(app: AppConfig) -> Result<(AppConfig, Config)> {
    let loader = match &app.config_path {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let config = match loader.load().await {
        Ok(config) => config,
        Err(e) => {
            init_logging(&app);
            return Err(e);
        }
    };

    let app = app.with_log_level(config.log_level.clone());
    init_logging(&app);
    debug!(?config, "Configuration loaded");
    Ok((app, config))
}

/// Wire HTTP-backed collaborators according to `config`
///
/// Permission prompts read their answers from `input`.
pub fn build_workflow(config: &Config, input: LineInput) -> Result<DistanceWorkflow> {
    let client = build_client(&config.http)?;

    let postal = ViaCepClient::new(client.clone(), &config.postal_lookup.base_url);
    let geocoder = NominatimClient::new(client.clone(), &config.geocoder.base_url)
        .with_country_codes(config.geocoder.country_codes.clone());

    let source = match config.location.source {
        LocationSource::Fixed => match config.location.fixed_coordinate()? {
            Some(coordinate) => FixSource::Fixed(coordinate),
            None => FixSource::Unavailable,
        },
        LocationSource::Ip => {
            FixSource::Ip(IpLocator::new(client, &config.location.ip_lookup_url))
        }
        LocationSource::None => FixSource::Unavailable,
    };

    let location = DeviceLocationProvider::new(config.location.permission, source)
        .with_reverse_geocoder(geocoder.clone())
        .with_input(input);
    let resolver = CompositeResolver::new(postal, geocoder);

    Ok(DistanceWorkflow::new(Arc::new(location), Arc::new(resolver))
        .with_observer(Arc::new(LoggingObserver)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PermissionPolicy;
    use crate::geo::Coordinate;
    use crate::session::Phase;

    #[tokio::test]
    async fn test_build_workflow_with_fixed_location() {
        let mut config = Config::new();
        config.location.permission = PermissionPolicy::Granted;
        config.location.pin(Coordinate::new(-23.5505, -46.6333).unwrap());
        // Reverse geocoding points at a closed port and must not matter.
        config.geocoder.base_url = "http://127.0.0.1:9".to_string();
        config.http.timeout_secs = 1;

        let workflow = build_workflow(&config, LineInput::from_reader(&b""[..])).unwrap();
        let outcome = workflow.start().await;
        let session = outcome.session().cloned().unwrap();
        assert_eq!(session.phase(), Phase::AwaitingPostalCode);
        assert_eq!(
            session.current_location().copied(),
            Some(Coordinate::new(-23.5505, -46.6333).unwrap())
        );
        assert!(session.current_location_address().is_none());
    }

    #[tokio::test]
    async fn test_build_workflow_denied() {
        let mut config = Config::new();
        config.location.permission = PermissionPolicy::Denied;

        let workflow = build_workflow(&config, LineInput::from_reader(&b""[..])).unwrap();
        workflow.start().await;
        let session = workflow.snapshot().await;
        assert_eq!(session.phase(), Phase::AwaitingPostalCode);
        assert!(session.current_location().is_none());
    }
}
