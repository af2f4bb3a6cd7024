//! Forecast session for one location
//!
//! A session starts out empty. The first query (or `load`) acquires the
//! payload from the cache or the transport, decodes and aggregates it, and
//! keeps either the finished store or the error that stopped it. Later queries
//! read from what was kept; nothing is retried automatically.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};

use super::aggregate::{aggregate, AggregateStore, DayAggregate};
use super::ForecastError;
use crate::cache::{CacheKey, PayloadCache};
use crate::config::ForecastConfig;
use crate::data::{decode, parse_payload, ForecastRequest, Location};
use crate::transport::Transport;

/// Source of the current local time
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock time in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stuck at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Lifecycle stage of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nothing fetched yet
    Created,
    /// Store populated
    Ready,
    /// Retrieval failed; the error is kept
    Failed,
}

/// Result of a successful retrieval
struct Loaded {
    store: AggregateStore,
    payload: Vec<u8>,
}

/// Forecast lifecycle for one location
pub struct ForecastSession {
    location: Location,
    request: ForecastRequest,
    config: ForecastConfig,
    transport: Box<dyn Transport>,
    cache: Option<Box<dyn PayloadCache>>,
    clock: Box<dyn Clock>,
    /// `None` until the first retrieval
    state: Option<Result<Loaded, ForecastError>>,
}

impl ForecastSession {
    /// Creates a session; request parameters are derived here once
    pub fn new(location: Location, config: ForecastConfig, transport: Box<dyn Transport>) -> Self {
        let request = ForecastRequest::with_base_url(&location, config.api_url.clone())
            .with_user_agent(config.user_agent.clone());

        Self {
            location,
            request,
            config,
            transport,
            cache: None,
            clock: Box::new(SystemClock),
            state: None,
        }
    }

    /// Caches payloads in the given store
    pub fn with_cache(mut self, cache: Box<dyn PayloadCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the system clock, mainly for tests
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn request(&self) -> &ForecastRequest {
        &self.request
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        match &self.state {
            None => SessionStatus::Created,
            Some(Ok(_)) => SessionStatus::Ready,
            Some(Err(_)) => SessionStatus::Failed,
        }
    }

    /// The error that failed the session, if any
    pub fn error(&self) -> Option<&ForecastError> {
        self.state.as_ref().and_then(|state| state.as_ref().err())
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    pub fn is_success(&self) -> bool {
        !self.is_error()
    }

    /// Raw payload the current store was built from
    pub fn raw_payload(&self) -> Option<&[u8]> {
        match &self.state {
            Some(Ok(loaded)) => Some(&loaded.payload),
            _ => None,
        }
    }

    /// Retrieves the forecast on first use and returns the store
    ///
    /// A failed session returns its stored error without retrying.
    pub fn load(&mut self) -> Result<&AggregateStore, ForecastError> {
        let outcome = match self.state.take() {
            Some(outcome) => outcome,
            None => self.retrieve(),
        };
        match self.state.insert(outcome) {
            Ok(loaded) => Ok(&loaded.store),
            Err(e) => Err(e.clone()),
        }
    }

    /// Retrieves again and replaces the store wholesale
    ///
    /// Within the same clock hour a cached payload is reused. A failed refresh
    /// discards the previous store and payload: the session moves to `Failed`
    /// and keeps only the new error.
    pub fn refresh(&mut self) -> Result<&AggregateStore, ForecastError> {
        let outcome = self.retrieve();
        match self.state.insert(outcome) {
            Ok(loaded) => Ok(&loaded.store),
            Err(e) => Err(e.clone()),
        }
    }

    /// Aggregate for an exact date
    pub fn for_date(&mut self, date: NaiveDate) -> Result<&DayAggregate, ForecastError> {
        self.load()?.get(date)
    }

    pub fn today(&mut self) -> Result<&DayAggregate, ForecastError> {
        self.in_days(0)
    }

    pub fn tomorrow(&mut self) -> Result<&DayAggregate, ForecastError> {
        self.in_days(1)
    }

    /// Aggregate for the date `days` after today
    pub fn in_days(&mut self, days: u32) -> Result<&DayAggregate, ForecastError> {
        let date = self.clock.now().date() + Duration::days(i64::from(days));
        self.for_date(date)
    }

    /// The first `count` days of the forecast, fewer if it is shorter
    pub fn first_n_days(&mut self, count: usize) -> Result<&[DayAggregate], ForecastError> {
        Ok(self.load()?.first_n(count))
    }

    fn retrieve(&self) -> Result<Loaded, ForecastError> {
        let result = self.acquire_payload().and_then(|payload| {
            let store = self.build_store(&payload)?;
            Ok(Loaded { store, payload })
        });

        match &result {
            Ok(loaded) => tracing::debug!(
                "Forecast for {} ready with {} days",
                self.request.query(),
                loaded.store.len()
            ),
            Err(e) => tracing::warn!("Forecast for {} failed: {}", self.request.query(), e),
        }
        result
    }

    fn build_store(&self, payload: &[u8]) -> Result<AggregateStore, ForecastError> {
        let records = parse_payload(payload)?;
        let observations = records
            .iter()
            .map(|record| decode(record, &self.config.decimals))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("Decoded {} observations", observations.len());

        Ok(aggregate(observations, &self.config.selection))
    }

    /// Serves the payload from the cache, or fetches and caches it
    fn acquire_payload(&self) -> Result<Vec<u8>, ForecastError> {
        let now = self.clock.now();
        let key = CacheKey::new(self.request.query(), now.date(), now.hour());

        if let Some(cache) = &self.cache {
            if let Some(payload) = cache.get(&key) {
                tracing::debug!("Cache hit for {} at hour {:02}", key.location, key.hour);
                return Ok(payload);
            }
            tracing::debug!("Cache miss for {} at hour {:02}", key.location, key.hour);
        }

        let payload = self
            .transport
            .fetch(&self.request.url(), &self.request.headers())?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, &payload) {
                tracing::warn!("Failed to write forecast cache: {}", e);
            }
            if let Err(e) = cache.prune(&key) {
                tracing::warn!("Failed to prune forecast cache: {}", e);
            }
        }

        Ok(payload)
    }
}
