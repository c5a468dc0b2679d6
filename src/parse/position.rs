use std::fmt;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::parse::ParseError;

static BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[()\[\]{}]").expect("bracket pattern is valid"));

static POSITION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9.]+),([0-9.]+)$").expect("position pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPosition {
    pub x: f64,
    pub y: f64,
}

impl ScreenPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Nearest whole pixel, saturating at the `i32` range.
    pub fn to_pixels(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<(i32, i32)> for ScreenPosition {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(f64::from(x), f64::from(y))
    }
}

impl fmt::Display for ScreenPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Source of a coordinate picked by the operator at runtime.
pub trait PositionCapture {
    /// Blocks until exactly one pointer press is observed.
    fn capture(&self) -> Result<ScreenPosition>;
}

/// How the `--position` flag was given.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PositionRequest<'a> {
    /// Click wherever the pointer rests.
    Current,
    /// Wait for the operator to click the target once.
    Interactive,
    Literal(&'a str),
}

impl<'a> PositionRequest<'a> {
    /// Maps the three shapes of an optional-value flag: omitted, bare or
    /// empty, and with a value.
    pub fn from_flag(flag: Option<Option<&'a str>>) -> Self {
        match flag {
            None => Self::Current,
            Some(None) | Some(Some("")) => Self::Interactive,
            Some(Some(text)) => Self::Literal(text),
        }
    }
}

pub fn resolve_position(
    request: PositionRequest<'_>,
    capture: &dyn PositionCapture,
) -> Result<Option<ScreenPosition>> {
    match request {
        PositionRequest::Current => Ok(None),
        PositionRequest::Interactive => capture.capture().map(Some),
        PositionRequest::Literal(text) => Ok(Some(parse_position_text(text)?)),
    }
}

pub fn parse_position_text(input: &str) -> Result<ScreenPosition, ParseError> {
    let stripped = BRACKETS.replace_all(input, "");
    let captures = POSITION_PATTERN
        .captures(&stripped)
        .ok_or_else(|| ParseError::position(input))?;

    let coordinate = |group: usize| -> Result<f64, ParseError> {
        captures[group]
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ParseError::position(input))
    };
    Ok(ScreenPosition::new(coordinate(1)?, coordinate(2)?))
}
