//! Nearest-hour lookup over an hour-keyed map
//!
//! Probes outward from a target hour, `target + offset` before
//! `target - offset`, for offsets 1 through `max_offset`. The exact hour is the
//! caller's business. Candidates outside 0-23 are treated as absent; there is
//! no wraparound onto the neighbouring day.

use std::collections::BTreeMap;

/// Default search radius, one full day
pub const DEFAULT_MAX_OFFSET: u32 = 24;

/// A value found by [`nearest_hour`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest<'a, V> {
    /// Hour the value was found at
    pub hour: u32,
    /// Distance from the target hour
    pub offset: u32,
    pub value: &'a V,
}

/// Candidate hours in probe order, as signed hours before range filtering
///
/// For target 23 this yields 24, 22, 25, 21, 26, 20, ...
pub fn probe_order(target: u32, max_offset: u32) -> impl Iterator<Item = (u32, i64)> {
    let target = i64::from(target);
    (1..=max_offset).flat_map(move |offset| {
        let o = i64::from(offset);
        [(offset, target + o), (offset, target - o)]
    })
}

/// Finds the value at the hour closest to `target`, excluding `target` itself
///
/// Returns `None` when nothing lies within `max_offset` hours.
pub fn nearest_hour<V>(
    target: u32,
    by_hour: &BTreeMap<u32, V>,
    max_offset: u32,
) -> Option<Nearest<'_, V>> {
    probe_order(target, max_offset).find_map(|(offset, candidate)| {
        let hour = u32::try_from(candidate).ok().filter(|h| *h <= 23)?;
        by_hour.get(&hour).map(|value| Nearest {
            hour,
            offset,
            value,
        })
    })
}
