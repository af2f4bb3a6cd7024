//! Plain-text forecast report
//!
//! One block per day: the date, then a line each for the day and night
//! representatives.

use std::fmt::Write;

use crate::config::SelectionConfig;
use crate::data::Observation;
use crate::forecast::DayAggregate;
use crate::symbol::SymbolRenderer;

/// Formats day aggregates for the terminal
pub struct Report<'a> {
    renderer: &'a dyn SymbolRenderer,
    selection: &'a SelectionConfig,
}

impl<'a> Report<'a> {
    pub fn new(renderer: &'a dyn SymbolRenderer, selection: &'a SelectionConfig) -> Self {
        Self {
            renderer,
            selection,
        }
    }

    /// Renders several days separated by blank lines
    pub fn render_days<'d>(&self, days: impl IntoIterator<Item = &'d DayAggregate>) -> String {
        days.into_iter()
            .map(|day| self.render_day(day))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_day(&self, aggregate: &DayAggregate) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", aggregate.date().format("%a %Y-%m-%d"));
        let _ = writeln!(out, "  Day    {}", self.render_observation(aggregate.day()));
        let _ = writeln!(out, "  Night  {}", self.render_observation(aggregate.night()));
        out
    }

    /// One line: time, temperature, wind, precipitation and symbol
    pub fn render_observation(&self, obs: &Observation) -> String {
        let mut line = format!(
            "{}  {:>4}°C  {:>5} m/s",
            obs.time(),
            obs.temperature,
            obs.wind_speed
        );
        if let Some(orientation) = &obs.wind_orientation {
            let _ = write!(line, " {:<3}", orientation);
        }
        if let Some(precipitation) = obs.precipitation() {
            let _ = write!(line, "  {:.1} mm", precipitation);
        }
        if let Some(symbol) = obs.symbol() {
            let night = self.selection.is_night(obs);
            let _ = write!(line, "  {}", self.renderer.render(symbol, night));
        }
        line
    }
}
