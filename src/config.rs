use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Local};

use crate::clock::format_bound;
use crate::parse::delay::{Delay, parse_delay};
use crate::parse::position::{PositionCapture, PositionRequest, ScreenPosition, resolve_position};
use crate::parse::time::{ClockTime, parse_time, parse_time_on};

/// Pause between clicks when `--delay` is not given.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Raw flag values. `end` and `position` distinguish an omitted flag
/// (`None`) from a flag given without a value (`Some(None)`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickerArgs<'a> {
    pub end: Option<Option<&'a str>>,
    pub start: Option<&'a str>,
    pub delay: Option<&'a str>,
    pub position: Option<Option<&'a str>>,
    pub verbose: bool,
}

/// Settings resolved once at startup and handed to the click loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickerConfig {
    pub start: Option<DateTime<Local>>,
    pub end: Option<DateTime<Local>>,
    pub delay: Option<Delay>,
    pub interval: Duration,
    pub position: Option<ScreenPosition>,
    pub verbose: bool,
}

impl ClickerConfig {
    /// Validates every literal flag before the interactive capture runs, so a
    /// typo never costs the operator a click.
    pub fn resolve(
        args: ClickerArgs<'_>,
        now: &DateTime<Local>,
        capture: &dyn PositionCapture,
    ) -> Result<Self> {
        let delay = parse_delay(args.delay)?;
        let start = parse_time(args.start, now)?;
        let end = match args.end {
            None => None,
            Some(None) => Some(
                ClockTime::END_OF_DAY
                    .on_day_of(now)
                    .ok_or_else(|| anyhow!("{} does not exist today", ClockTime::END_OF_DAY))?,
            ),
            Some(Some(text)) => Some(parse_time_on(text, now)?),
        };
        let position = resolve_position(PositionRequest::from_flag(args.position), capture)?;

        let interval = match delay {
            Some(delay) => delay
                .to_duration()
                .ok_or_else(|| anyhow!("delay of {} seconds is too long", delay.as_seconds()))?,
            None => DEFAULT_INTERVAL,
        };

        Ok(Self {
            start,
            end,
            delay,
            interval,
            position,
            verbose: args.verbose,
        })
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let delay = match self.delay {
            Some(delay) => format!("Using a delay of {} seconds.", delay.as_seconds()),
            None => format!(
                "Using the default delay of {} seconds.",
                self.interval.as_secs_f64()
            ),
        };
        let position = match self.position {
            Some(position) => format!("Using position {position} for click."),
            None => "Using the current pointer position for click.".to_string(),
        };
        vec![
            format!("Verbose set to {}.", self.verbose),
            delay,
            format!("Using a start time of {}.", format_bound(self.start.as_ref())),
            format!("Using an end time of {}.", format_bound(self.end.as_ref())),
            position,
        ]
    }
}
