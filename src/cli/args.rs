use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "noor", version, about = "Daily prayer times with a live countdown to the next prayer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's prayer times and the next prayer
    Times {
        /// Use cached timings only, no network
        #[arg(long)]
        offline: bool,
        /// Pretend the local time is HH:MM (today)
        #[arg(long, value_name = "HH:MM")]
        at: Option<String>,
    },
    /// Live countdown to the next prayer on a single line
    Countdown {
        /// Stop after this many ticks
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        ticks: Option<u32>,
        /// Use cached timings only, no network
        #[arg(long)]
        offline: bool,
    },
    /// Show or change the configured location
    Location {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,
        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
        /// Display name used when reverse geocoding is unavailable
        #[arg(long)]
        name: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_ticks_must_be_positive() {
        assert!(Cli::try_parse_from(["noor", "countdown", "--ticks", "0"]).is_err());

        let cli = Cli::try_parse_from(["noor", "countdown", "--ticks", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Countdown { ticks: Some(3), offline: false })
        ));
    }

    #[test]
    fn test_location_needs_both_coordinates() {
        assert!(Cli::try_parse_from(["noor", "location", "--lat", "33.7"]).is_err());
        let cli = Cli::try_parse_from(["noor", "location", "--lat", "-33.9", "--lon", "18.4"]).unwrap();
        match cli.command {
            Some(Commands::Location { lat, lon, .. }) => {
                assert_eq!(lat, Some(-33.9));
                assert_eq!(lon, Some(18.4));
            }
            other => panic!("expected location, got {:?}", other),
        }
    }

    #[test]
    fn test_no_subcommand_opens_home_screen() {
        assert!(Cli::try_parse_from(["noor"]).unwrap().command.is_none());
    }
}
