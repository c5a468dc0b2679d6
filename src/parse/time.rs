use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Local, LocalResult, NaiveTime, TimeZone};
use regex::Regex;

use crate::parse::ParseError;

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(1[0-2]|0?[1-9])(?::?([0-5][0-9]))?([ap])m?$")
        .expect("time pattern is valid")
});

/// A wall-clock time of day written on a 12-hour clock, stored as 24-hour.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    /// Used when `--end` is given without a value.
    pub const END_OF_DAY: ClockTime = ClockTime {
        hour: 17,
        minute: 0,
    };

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let captures = TIME_PATTERN
            .captures(input)
            .ok_or_else(|| ParseError::time(input))?;

        let literal_hour = captures[1]
            .parse::<u32>()
            .map_err(|_| ParseError::time(input))?;
        let minute = match captures.get(2) {
            Some(digits) => digits
                .as_str()
                .parse::<u32>()
                .map_err(|_| ParseError::time(input))?,
            None => 0,
        };
        let is_pm = captures[3].eq_ignore_ascii_case("p");

        let hour = literal_hour % 12 + if is_pm { 12 } else { 0 };
        Ok(Self { hour, minute })
    }

    pub fn to_naive_time(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }

    /// Anchors this time to the calendar day of `now`. A time that already
    /// passed today stays on today's date.
    pub fn on_day_of<Tz>(self, now: &DateTime<Tz>) -> Option<DateTime<Tz>>
    where
        Tz: TimeZone,
        Tz::Offset: Copy,
    {
        let naive = now.date_naive().and_time(self.to_naive_time()?);
        match now.timezone().from_local_datetime(&naive) {
            LocalResult::Single(anchored) => Some(anchored),
            // Repeated hour when clocks fall back: take the earlier one.
            LocalResult::Ambiguous(earlier, _later) => Some(earlier),
            // Skipped hour when clocks spring forward.
            LocalResult::None => None,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meridiem = if self.hour >= 12 { "PM" } else { "AM" };
        let hour12 = match self.hour % 12 {
            0 => 12,
            hour => hour,
        };
        write!(f, "{hour12}:{:02} {meridiem}", self.minute)
    }
}

/// Absent input means "no bound" and is not an error.
pub fn parse_time(
    input: Option<&str>,
    now: &DateTime<Local>,
) -> Result<Option<DateTime<Local>>, ParseError> {
    input.map(|text| parse_time_on(text, now)).transpose()
}

pub fn parse_time_on<Tz>(input: &str, now: &DateTime<Tz>) -> Result<DateTime<Tz>, ParseError>
where
    Tz: TimeZone,
    Tz::Offset: Copy,
{
    ClockTime::parse(input)?
        .on_day_of(now)
        .ok_or_else(|| ParseError::time(input))
}
