//! Integration tests for CLI argument handling
//!
//! Only paths that fail or exit before any network access are run through
//! the binary.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_metcast"))
        .args(args)
        .output()
        .expect("Failed to execute metcast")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("metcast"), "Help should mention metcast");
    assert!(stdout.contains("--lat"), "Help should mention --lat flag");
    assert!(stdout.contains("--icon-ext"), "Help should mention --icon-ext flag");
}

#[test]
fn test_missing_coordinates_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success(), "Expected missing --lat/--lon to fail");
}

#[test]
fn test_invalid_date_prints_error_and_exits() {
    let output = run_cli(&["--lat", "49.2", "--lon", "16.6", "--date", "tomorrow"]);
    assert!(!output.status.success(), "Expected invalid date to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid") || stderr.contains("Invalid"),
        "Should print error message about invalid date: {}",
        stderr
    );
}

#[test]
fn test_out_of_range_latitude_fails() {
    let output = run_cli(&["--lat", "95", "--lon", "16.6"]);
    assert!(!output.status.success(), "Expected latitude 95 to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("InvalidCoordinate"), "Unexpected error: {}", stderr);
}

#[test]
fn test_zero_days_fails() {
    let output = run_cli(&["--lat", "49.2", "--lon", "16.6", "--days", "0"]);
    assert!(!output.status.success());
}

#[test]
fn test_json_and_raw_conflict() {
    let output = run_cli(&["--lat", "49.2", "--lon", "16.6", "--json", "--raw"]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_config_file_fails() {
    let output = run_cli(&[
        "--lat",
        "49.2",
        "--lon",
        "16.6",
        "--config",
        "/nonexistent/metcast.toml",
    ]);
    assert!(!output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use chrono::NaiveDate;
    use clap::Parser;
    use metcast::cli::{Cli, CliError, DaySelector, OutputFormat, RunOptions};
    use metcast::data::Location;

    #[test]
    fn test_cli_minimal_args() {
        let cli = Cli::parse_from(["metcast", "--lat", "59.91", "--lon", "10.75"]);
        assert_eq!(cli.days, 5);
        assert!(cli.altitude.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_run_options_from_full_args() {
        let cli = Cli::parse_from([
            "metcast",
            "--lat",
            "59.9139",
            "--lon",
            "10.7522",
            "--altitude",
            "23",
            "--days",
            "2",
            "--cache-dir",
            "/tmp/metcast",
            "--icon-ext",
            "svg",
            "-v",
        ]);
        let options = RunOptions::from_cli(&cli).unwrap();

        assert_eq!(options.location, Location::new(59.91, 10.75, Some(23)));
        assert_eq!(options.days, DaySelector::First(2));
        assert_eq!(options.cache_dir.as_deref(), Some(std::path::Path::new("/tmp/metcast")));
        assert_eq!(options.icon_ext.as_deref(), Some("svg"));
        assert_eq!(options.output, OutputFormat::Text);
        assert!(options.verbose);
    }

    #[test]
    fn test_run_options_single_date() {
        let cli = Cli::parse_from(["metcast", "--lat", "1", "--lon", "2", "--date", "2024-06-01"]);
        let options = RunOptions::from_cli(&cli).unwrap();

        assert_eq!(
            options.days,
            DaySelector::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
        );
    }

    #[test]
    fn test_run_options_invalid_latitude_returns_error() {
        let cli = Cli::parse_from(["metcast", "--lat", "-90.5", "--lon", "2"]);
        let result = RunOptions::from_cli(&cli);
        assert!(matches!(
            result,
            Err(CliError::InvalidCoordinate { name: "latitude", .. })
        ));
    }
}
