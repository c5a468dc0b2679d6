use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};

use crate::parse::ParseError;

static DELAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([0-9]+)h)?(?:([0-9]+)m)?(?:([0-9]+)s)?(?:([0-9]+)ms)?$")
        .expect("delay pattern is valid")
});

/// A pause written as `[#h][#m][#s][#ms]`. Missing components are zero.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Delay {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub millis: u64,
}

impl Delay {
    pub fn as_seconds(&self) -> f64 {
        self.hours as f64 * 3_600.0
            + self.minutes as f64 * 60.0
            + self.seconds as f64
            + self.millis as f64 / 1_000.0
    }

    /// Exact sleep length, or `None` when the total does not fit.
    pub fn to_duration(&self) -> Option<Duration> {
        let whole_secs = self
            .hours
            .checked_mul(3_600)?
            .checked_add(self.minutes.checked_mul(60)?)?
            .checked_add(self.seconds)?;
        Duration::from_secs(whole_secs).checked_add(Duration::from_millis(self.millis))
    }
}

/// Absent input means "keep the default interval" and is not an error.
pub fn parse_delay(input: Option<&str>) -> Result<Option<Delay>, ParseError> {
    input.map(parse_delay_text).transpose()
}

pub fn parse_delay_text(input: &str) -> Result<Delay, ParseError> {
    let captures = DELAY_PATTERN
        .captures(input)
        .ok_or_else(|| ParseError::delay(input))?;

    let delay = Delay {
        hours: component(&captures, 1, input)?,
        minutes: component(&captures, 2, input)?,
        seconds: component(&captures, 3, input)?,
        millis: component(&captures, 4, input)?,
    };
    if delay.to_duration().is_none() {
        return Err(ParseError::delay(input));
    }
    Ok(delay)
}

fn component(captures: &Captures<'_>, group: usize, input: &str) -> Result<u64, ParseError> {
    match captures.get(group) {
        Some(digits) => digits
            .as_str()
            .parse::<u64>()
            .map_err(|_| ParseError::delay(input)),
        None => Ok(0),
    }
}
