//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Distance from where you are to a Brazilian postal code (CEP)
#[derive(Parser, Debug)]
#[command(name = "cepdist")]
#[command(about = "cepdist - Distance from your location to a Brazilian postal code", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a configuration file
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Manual device position, overriding the configured location source
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct PositionArgs {
    /// Latitude of your position in decimal degrees
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of your position in decimal degrees
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Locate this device, resolve a CEP and print the distance between them
    #[command(name = "distance")]
    Distance {
        /// Postal code, exactly 8 digits (e.g. 01310100)
        cep: String,

        #[command(flatten)]
        position: PositionArgs,

        /// Refuse location access for this run
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        deny_location: bool,

        /// Print the session as JSON
        #[arg(long)]
        json: bool,
    },

    /// Only locate this device
    #[command(name = "locate")]
    Locate {
        #[command(flatten)]
        position: PositionArgs,

        /// Print the session as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a postal code's format without any network access
    #[command(name = "validate")]
    Validate {
        /// Postal code to check
        cep: String,
    },

    /// Line-oriented session: type CEPs, `locate`, `clear`, `show` or `quit`
    #[command(name = "interactive")]
    Interactive,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_distance_with_negative_position() {
        let cli = Cli::try_parse_from([
            "cepdist", "-vv", "distance", "01310100", "--lat", "-23.5505", "--lon", "-46.6333",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Distance {
                cep,
                position,
                deny_location,
                json,
            } => {
                assert_eq!(cep, "01310100");
                assert_eq!(position.lat, Some(-23.5505));
                assert_eq!(position.lon, Some(-46.6333));
                assert!(!deny_location);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_lat_requires_lon() {
        assert!(Cli::try_parse_from(["cepdist", "locate", "--lat", "1.0"]).is_err());
        assert!(Cli::try_parse_from([
            "cepdist", "distance", "01310100", "--deny-location", "--lat", "1", "--lon", "2"
        ])
        .is_err());
    }
}
