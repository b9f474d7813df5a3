//! # cepdist
//!
//! Distance from the device's location to the place a Brazilian postal code
//! (CEP) refers to.
//!
//! ## Usage
//!
//! ```bash
//! cepdist distance 01310100 [--lat -23.55 --lon -46.63] [--json]
//! ```
//!
//! ## Modules
//!
//! - `geo` - Coordinates and great-circle distance
//! - `postal` - Postal-code validation
//! - `address` - Addresses resolved from a postal code
//! - `abstractions` - Location and address collaborator traits with mocks
//! - `session` - Session state, notifications and observers
//! - `workflow` - The distance state machine
//! - `providers` - ViaCEP, Nominatim and ip-api adapters
//! - `config` - Layered configuration
//! - `app` - Logging, error reporting and runtime wiring
//! - `cli` - Command-line interface
pub mod abstractions;
pub mod address;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod postal;
pub mod providers;
pub mod session;
pub mod workflow;

pub use error::{CepDistError, ProviderError};
pub use workflow::{DistanceWorkflow, Transition};
