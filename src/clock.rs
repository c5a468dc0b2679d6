use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use log::trace;

/// Wall-clock source the click loop samples and sleeps on.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) {
        trace!("sleeping for {duration:?}");
        thread::sleep(duration);
    }
}

/// Positive distance from `now` to `later`, or zero if `later` is not ahead.
pub fn time_until(now: &DateTime<Local>, later: &DateTime<Local>) -> Duration {
    (*later - *now).to_std().unwrap_or(Duration::ZERO)
}

pub fn format_timestamp(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

pub fn format_bound(bound: Option<&DateTime<Local>>) -> String {
    match bound {
        Some(dt) => format_timestamp(dt),
        None => "none".to_string(),
    }
}
