// tlapse-cli/src/cli.rs
//
// Defines the command-line argument structure using clap.

use chrono::NaiveDate;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Date format accepted by `--date`.
pub const DATE_ARG_FORMAT: &str = "%Y-%m-%d";

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "tlapse: Daily timelapse builder",
    long_about = "Collects one day of camera stills and encodes them into a timelapse video using ffmpeg."
)]
pub struct Cli {
    /// Settings document (YAML)
    #[arg(
        short,
        long,
        value_name = "PATH",
        default_value = "config.yaml",
        env = "TLAPSE_CONFIG"
    )]
    pub config: PathBuf,

    /// Date to build the timelapse for (YYYY-MM-DD, defaults to today)
    #[arg(short, long, value_name = "DATE", value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Use only the first N images, for a quick test run
    #[arg(long, value_name = "N")]
    pub test_amount: Option<NonZeroUsize>,

    /// Do not draw the encoding progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// The requested date, or today in local time.
    pub fn date_or_today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_ARG_FORMAT)
        .map_err(|e| format!("expected a date as YYYY-MM-DD ({e})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["tlapse"]).unwrap();
        assert!(cli.date.is_none());
        assert!(cli.test_amount.is_none());
        assert!(!cli.no_progress);
        // The default may be overridden by TLAPSE_CONFIG in the environment
        if std::env::var_os("TLAPSE_CONFIG").is_none() {
            assert_eq!(cli.config, PathBuf::from("config.yaml"));
        }
    }

    #[test]
    fn test_parse_all_arguments() {
        let cli = Cli::try_parse_from([
            "tlapse",
            "--config",
            "/etc/tlapse.yaml",
            "--date",
            "2024-06-15",
            "--test-amount",
            "25",
            "--no-progress",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/tlapse.yaml"));
        assert_eq!(cli.date, NaiveDate::from_ymd_opt(2024, 6, 15));
        assert_eq!(cli.test_amount, NonZeroUsize::new(25));
        assert!(cli.no_progress);
        assert_eq!(cli.date_or_today(), NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }

    #[test]
    fn test_rejects_malformed_date() {
        assert!(Cli::try_parse_from(["tlapse", "--date", "15/06/2024"]).is_err());
        assert!(Cli::try_parse_from(["tlapse", "--date", "2024-02-30"]).is_err());
    }

    #[test]
    fn test_rejects_zero_test_amount() {
        assert!(Cli::try_parse_from(["tlapse", "--test-amount", "0"]).is_err());
        assert!(Cli::try_parse_from(["tlapse", "--test-amount", "-3"]).is_err());
    }
}
