//! Integration tests for the forecast session
//!
//! Drives a session through the public API with a canned transport, a fixed
//! clock and a temporary cache directory.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use metcast::cache::{CacheKey, DiskCache, PayloadCache};
use metcast::config::{ForecastConfig, SelectionConfig};
use metcast::data::Location;
use metcast::forecast::{FixedClock, ForecastError, ForecastSession, SessionStatus};
use metcast::report::Report;
use metcast::symbol::FileIcons;
use metcast::transport::{Transport, TransportError};

/// Two days of compact forecast, hourly with gaps
const PAYLOAD: &str = r#"{
    "type": "Feature",
    "properties": {
        "meta": { "units": { "air_pressure_at_sea_level": "hPa", "air_temperature": "celsius" } },
        "timeseries": [
            { "time": "2024-06-01T06:00:00Z", "data": {
                "instant": { "details": { "air_temperature": 14.6, "wind_speed": 1.2, "wind_from_direction": 180.0 } },
                "next_1_hours": { "summary": { "symbol_code": "clearsky_day" }, "details": { "precipitation_amount": 0.0 } },
                "next_6_hours": { "summary": { "symbol_code": "fair_day" }, "details": { "precipitation_amount": 0.3 } } } },
            { "time": "2024-06-01T12:00:00Z", "data": {
                "instant": { "details": { "air_temperature": 23.2, "wind_speed": 3.4, "wind_from_direction": 270.0 } } } },
            { "time": "2024-06-01T15:00:00Z", "data": {
                "instant": { "details": { "air_temperature": 24.8, "wind_speed": 4.1, "wind_from_direction": 290.0 } },
                "next_1_hours": { "summary": { "symbol_code": "rainshowers_day" }, "details": { "precipitation_amount": 1.1 } } } },
            { "time": "2024-06-01T21:00:00Z", "data": {
                "instant": { "details": { "air_temperature": 17.4 } } } },
            { "time": "2024-06-01T23:00:00Z", "data": {
                "instant": { "details": { "air_temperature": 15.2 } } } },
            { "time": "2024-06-02T00:00:00Z", "data": {
                "instant": { "details": { "air_temperature": 14.9 } },
                "next_6_hours": { "summary": { "symbol_code": "cloudy" }, "details": { "precipitation_amount": 0.0 } } } }
        ]
    }
}"#;

struct CannedTransport {
    response: Result<Vec<u8>, TransportError>,
    calls: Rc<Cell<usize>>,
}

impl Transport for CannedTransport {
    fn fetch(&self, _url: &str, headers: &[(&str, String)]) -> Result<Vec<u8>, TransportError> {
        assert!(headers.iter().any(|(name, _)| *name == "User-Agent"));
        self.calls.set(self.calls.get() + 1);
        self.response.clone()
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn now() -> NaiveDateTime {
    date("2024-06-01").and_hms_opt(10, 42, 0).unwrap()
}

fn session(
    response: Result<Vec<u8>, TransportError>,
    config: ForecastConfig,
) -> (ForecastSession, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let transport = CannedTransport {
        response,
        calls: Rc::clone(&calls),
    };
    let location = Location::new(59.9139, 10.7522, None);
    let session = ForecastSession::new(location, config, Box::new(transport))
        .with_clock(Box::new(FixedClock(now())));
    (session, calls)
}

#[test]
fn test_full_day_summary() {
    let (mut session, calls) = session(Ok(PAYLOAD.as_bytes().to_vec()), ForecastConfig::default());

    let today = session.today().expect("Today should be present");
    assert_eq!(today.hours().len(), 5);
    assert_eq!(today.day().hour, 15);
    assert_eq!(today.day().temperature, 25.0);
    assert_eq!(today.day().wind_orientation.as_deref(), Some("WNW"));
    assert_eq!(today.night().hour, 23);
    assert_eq!(today.night().temperature, 15.0);

    // Hour 12 had no attachment; 15 is closer than 6
    let noon = today.at_hour(12).expect("Hour 12 should be present");
    assert_eq!(noon.symbol().map(|s| s.name.as_str()), Some("rainshowers"));
    assert_eq!(noon.precipitation(), Some(1.1));

    // A single-hour date represents itself twice
    let tomorrow = session.tomorrow().expect("Tomorrow should be present");
    assert_eq!(tomorrow.day().hour, 0);
    assert_eq!(tomorrow.night().hour, 0);

    assert_eq!(calls.get(), 1);
    assert_eq!(session.status(), SessionStatus::Ready);
}

#[test]
fn test_fixed_hour_selection() {
    let mut config = ForecastConfig::default();
    config.selection = SelectionConfig::default()
        .with_day_hour(13)
        .and_then(|s| s.with_night_hour(22))
        .expect("Hours are valid");
    let (mut session, _calls) = session(Ok(PAYLOAD.as_bytes().to_vec()), config);

    let today = session.for_date(date("2024-06-01")).expect("Date should be present");
    // 13 is absent: 14 is probed first, then 12
    assert_eq!(today.day().hour, 12);
    // 22 is absent: 23 comes before 21
    assert_eq!(today.night().hour, 23);
}

#[test]
fn test_unknown_date_and_short_forecast() {
    let (mut session, _calls) = session(Ok(PAYLOAD.as_bytes().to_vec()), ForecastConfig::default());

    assert_eq!(
        session.in_days(3).err(),
        Some(ForecastError::EmptyData(date("2024-06-04")))
    );
    let days = session.first_n_days(5).expect("Should load");
    let dates: Vec<NaiveDate> = days.iter().map(|d| d.date()).collect();
    assert_eq!(dates, vec![date("2024-06-01"), date("2024-06-02")]);
}

#[test]
fn test_hourly_cache_shared_between_sessions() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let (first, first_calls) = session(Ok(PAYLOAD.as_bytes().to_vec()), ForecastConfig::default());
    let mut first = first.with_cache(Box::new(DiskCache::with_dir(temp_dir.path().to_path_buf())));
    first.load().expect("Should load");
    assert_eq!(first_calls.get(), 1);

    // The second session would fail if it reached the network
    let (second, second_calls) = session(Err(TransportError::Status(500)), ForecastConfig::default());
    let mut second = second.with_cache(Box::new(DiskCache::with_dir(temp_dir.path().to_path_buf())));
    assert_eq!(second.today().expect("Cached").day().hour, 15);
    assert_eq!(second_calls.get(), 0);
    assert_eq!(second.raw_payload(), Some(PAYLOAD.as_bytes()));

    let cache = DiskCache::with_dir(temp_dir.path().to_path_buf());
    let key = CacheKey::new("lat=59.91&lon=10.75", date("2024-06-01"), 10);
    assert!(cache.get(&key).is_some());
}

#[test]
fn test_failed_session_keeps_error() {
    let (mut session, calls) = session(
        Err(TransportError::RequestFailed("connection refused".to_string())),
        ForecastConfig::default(),
    );

    let first = session.today().unwrap_err();
    let second = session.first_n_days(3).unwrap_err();

    assert_eq!(first, second);
    assert!(first.to_string().contains("connection refused"));
    assert!(session.is_error());
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_text_report_from_session() {
    let config = ForecastConfig::default();
    let selection = config.selection;
    let (mut session, _calls) = session(Ok(PAYLOAD.as_bytes().to_vec()), config);
    let icons = FileIcons::new("png");

    let days = session.first_n_days(1).expect("Should load");
    let text = Report::new(&icons, &selection).render_days(days);

    assert!(text.contains("2024-06-01"));
    assert!(text.contains("5-rainshowers.png"));
    assert!(!text.contains("2024-06-02"));
}
