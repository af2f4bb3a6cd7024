//! Grouping of observations into per-day aggregates
//!
//! One pass partitions observations by date and hour, fills in missing
//! sky/precipitation attachments from the nearest hour of the same date, and
//! picks the representative day and night observation per date.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use super::resolver::{nearest_hour, DEFAULT_MAX_OFFSET};
use super::ForecastError;
use crate::config::{DaySelection, NightSelection, SelectionConfig};
use crate::data::{Observation, SkyAttachment};

/// All observations for one calendar date with its representatives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAggregate {
    date: NaiveDate,
    hours: BTreeMap<u32, Observation>,
    day: Observation,
    night: Observation,
}

impl DayAggregate {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Representative daytime observation
    pub fn day(&self) -> &Observation {
        &self.day
    }

    /// Representative nighttime observation
    pub fn night(&self) -> &Observation {
        &self.night
    }

    /// Observations keyed by hour, only hours present in the source
    pub fn hours(&self) -> &BTreeMap<u32, Observation> {
        &self.hours
    }

    pub fn at_hour(&self, hour: u32) -> Option<&Observation> {
        self.hours.get(&hour)
    }
}

/// Day aggregates in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregateStore {
    days: Vec<DayAggregate>,
}

impl AggregateStore {
    /// Aggregate for an exact date
    pub fn get(&self, date: NaiveDate) -> Result<&DayAggregate, ForecastError> {
        self.days
            .iter()
            .find(|day| day.date == date)
            .ok_or(ForecastError::EmptyData(date))
    }

    /// The first `count` aggregates, fewer if the store holds less
    pub fn first_n(&self, count: usize) -> &[DayAggregate] {
        &self.days[..count.min(self.days.len())]
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayAggregate> {
        self.days.iter()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.days.iter().map(|day| day.date).collect()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Builds the aggregate store from decoded observations
///
/// Later observations for an already-seen date and hour replace earlier ones.
/// An empty input yields an empty store.
pub fn aggregate(
    observations: impl IntoIterator<Item = Observation>,
    selection: &SelectionConfig,
) -> AggregateStore {
    let mut order: Vec<NaiveDate> = Vec::new();
    let mut by_date: HashMap<NaiveDate, BTreeMap<u32, Observation>> = HashMap::new();

    for observation in observations {
        let hours = by_date.entry(observation.date).or_insert_with(|| {
            order.push(observation.date);
            BTreeMap::new()
        });
        hours.insert(observation.hour, observation);
    }

    let days = order
        .into_iter()
        .filter_map(|date| {
            let mut hours = by_date.remove(&date)?;
            attach_nearest_sky(&mut hours);
            let day = select_day(&hours, selection)?.clone();
            let night = select_night(&hours, selection)?.clone();
            Some(DayAggregate {
                date,
                hours,
                day,
                night,
            })
        })
        .collect();

    AggregateStore { days }
}

/// Copies the nearest hour's attachment onto every hour without one
fn attach_nearest_sky(hours: &mut BTreeMap<u32, Observation>) {
    let donors: BTreeMap<u32, SkyAttachment> = hours
        .iter()
        .filter_map(|(hour, obs)| obs.sky.clone().map(|sky| (*hour, sky)))
        .collect();
    if donors.is_empty() {
        return;
    }

    for (hour, obs) in hours.iter_mut().filter(|(_, obs)| obs.sky.is_none()) {
        if let Some(nearest) = nearest_hour(*hour, &donors, DEFAULT_MAX_OFFSET) {
            obs.sky = Some(nearest.value.clone());
        }
    }
}

fn select_day<'a>(
    hours: &'a BTreeMap<u32, Observation>,
    selection: &SelectionConfig,
) -> Option<&'a Observation> {
    match selection.day {
        DaySelection::HighestTemperature => {
            let daytime = hours
                .values()
                .filter(|obs| obs.hour < selection.night_starts_hour);
            // Strict comparison keeps the earliest hour on ties
            warmest(daytime).or_else(|| warmest(hours.values()))
        }
        DaySelection::FixedHour => at_or_nearest(hours, selection.day_hour),
    }
}

fn select_night<'a>(
    hours: &'a BTreeMap<u32, Observation>,
    selection: &SelectionConfig,
) -> Option<&'a Observation> {
    match selection.night {
        NightSelection::LowestTemperature => {
            let nighttime = hours
                .values()
                .filter(|obs| obs.hour >= selection.night_starts_hour);
            coldest(nighttime).or_else(|| coldest(hours.values()))
        }
        NightSelection::FixedHour => at_or_nearest(hours, selection.night_hour),
    }
}

fn warmest<'a>(observations: impl Iterator<Item = &'a Observation>) -> Option<&'a Observation> {
    observations.fold(None, |best, obs| match best {
        Some(b) if obs.temperature <= b.temperature => Some(b),
        _ => Some(obs),
    })
}

fn coldest<'a>(observations: impl Iterator<Item = &'a Observation>) -> Option<&'a Observation> {
    observations.fold(None, |best, obs| match best {
        Some(b) if obs.temperature >= b.temperature => Some(b),
        _ => Some(obs),
    })
}

fn at_or_nearest(hours: &BTreeMap<u32, Observation>, target: u32) -> Option<&Observation> {
    hours.get(&target).or_else(|| {
        nearest_hour(target, hours, DEFAULT_MAX_OFFSET)
            .map(|nearest| nearest.value)
            // Nothing within range: fall back to the first hour of the day
            .or_else(|| hours.values().next())
    })
}
