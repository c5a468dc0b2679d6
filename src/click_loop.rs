use std::time::Duration;

use anyhow::Result;
use log::debug;

use crate::clock::{Clock, format_bound, format_timestamp, time_until};
use crate::config::ClickerConfig;
use crate::parse::position::ScreenPosition;
use crate::pointer::{self, PointerDevice};

/// Longest single sleep while waiting for the start time, so that a wall
/// clock adjustment is noticed within a second.
const START_POLL: Duration = Duration::from_secs(1);

/// How far past the end bound the last pause may run.
const END_OVERSHOOT: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LoopState {
    WaitingToStart,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Start time not reached yet; slept part of the way towards it.
    Waiting,
    /// Clicked at the given position, then paused for the interval.
    Clicked(ScreenPosition),
    /// The end bound has passed. Nothing was clicked.
    Finished,
}

pub struct ClickLoop<'a> {
    config: ClickerConfig,
    clock: &'a dyn Clock,
    pointer: &'a mut dyn PointerDevice,
    state: LoopState,
    clicks: u64,
}

impl<'a> ClickLoop<'a> {
    pub fn new(
        config: ClickerConfig,
        clock: &'a dyn Clock,
        pointer: &'a mut dyn PointerDevice,
    ) -> Self {
        let state = if config.start.is_some() {
            LoopState::WaitingToStart
        } else {
            LoopState::Active
        };
        Self {
            config,
            clock,
            pointer,
            state,
            clicks: 0,
        }
    }

    /// Runs until the end bound passes and returns the number of clicks. Without
    /// an end bound this only returns on a pointer error.
    pub fn run(&mut self) -> Result<u64> {
        loop {
            if self.step()? == Step::Finished {
                return Ok(self.clicks);
            }
        }
    }

    pub fn step(&mut self) -> Result<Step> {
        let now = self.clock.now();

        if let Some(end) = self.config.end
            && now > end
        {
            debug!("end time {} passed after {} clicks", format_timestamp(&end), self.clicks);
            if self.config.verbose {
                println!(
                    "{} is later than {}, exiting.",
                    format_timestamp(&now),
                    format_timestamp(&end)
                );
            }
            return Ok(Step::Finished);
        }

        if self.state == LoopState::WaitingToStart {
            if let Some(start) = self.config.start
                && now < start
            {
                self.clock.sleep(time_until(&now, &start).min(START_POLL));
                return Ok(Step::Waiting);
            }
            debug!("start time reached");
            self.state = LoopState::Active;
        }

        if self.config.verbose {
            let target = match self.config.position {
                Some(position) => format!(" at {position}"),
                None => String::new(),
            };
            println!(
                "{} is not later than {}, clicking{target}.",
                format_timestamp(&now),
                format_bound(self.config.end.as_ref())
            );
        }

        let clicked = pointer::click(&mut *self.pointer, self.config.position)?;
        self.clicks += 1;

        self.clock.sleep(self.pause_after_click());
        Ok(Step::Clicked(clicked))
    }

    /// The configured interval, cut short if it would run well past the end
    /// bound.
    fn pause_after_click(&self) -> Duration {
        match self.config.end {
            Some(end) => {
                let remaining = time_until(&self.clock.now(), &end) + END_OVERSHOOT;
                self.config.interval.min(remaining)
            }
            None => self.config.interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use chrono::{DateTime, Local, TimeZone};

    use super::*;
    use crate::pointer::testing::{PointerEvent, RecordingPointer};

    struct FakeClock {
        now: Cell<DateTime<Local>>,
        sleeps: RefCell<Vec<Duration>>,
    }

    impl FakeClock {
        fn starting_at(now: DateTime<Local>) -> Self {
            Self {
                now: Cell::new(now),
                sleeps: RefCell::new(Vec::new()),
            }
        }

        fn elapsed_since(&self, origin: DateTime<Local>) -> chrono::Duration {
            self.now.get() - origin
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Local> {
            self.now.get()
        }

        fn sleep(&self, duration: Duration) {
            self.sleeps.borrow_mut().push(duration);
            let step = chrono::Duration::from_std(duration).expect("sleep fits");
            self.now.set(self.now.get() + step);
        }
    }

    fn nine_am() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 10, 16, 9, 0, 0)
            .single()
            .expect("valid")
    }

    fn config(interval: Duration) -> ClickerConfig {
        ClickerConfig {
            start: None,
            end: None,
            delay: None,
            interval,
            position: None,
            verbose: false,
        }
    }

    fn seconds(secs: i64) -> chrono::Duration {
        chrono::Duration::seconds(secs)
    }

    #[test]
    fn unbounded_loop_clicks_at_interval_cadence() {
        let origin = nine_am();
        let clock = FakeClock::starting_at(origin);
        let mut pointer = RecordingPointer::resting_at(1.0, 1.0);
        let mut click_loop =
            ClickLoop::new(config(Duration::from_secs(1)), &clock, &mut pointer);

        assert_eq!(click_loop.state, LoopState::Active);
        for _ in 0..5 {
            assert!(matches!(click_loop.step().expect("step"), Step::Clicked(_)));
        }
        assert_eq!(click_loop.clicks, 5);
        drop(click_loop);

        assert_eq!(clock.elapsed_since(origin), seconds(5));
        assert_eq!(*clock.sleeps.borrow(), vec![Duration::from_secs(1); 5]);
        assert_eq!(pointer.presses(), 5);
    }

    #[test]
    fn past_end_time_exits_without_clicking() {
        let origin = nine_am();
        let clock = FakeClock::starting_at(origin);
        let mut pointer = RecordingPointer::resting_at(0.0, 0.0);
        let mut settings = config(Duration::from_secs(1));
        settings.end = Some(origin - seconds(60));

        let mut click_loop = ClickLoop::new(settings, &clock, &mut pointer);
        assert_eq!(click_loop.run().expect("runs"), 0);
        drop(click_loop);

        assert!(pointer.events.is_empty());
        assert!(clock.sleeps.borrow().is_empty());
    }

    #[test]
    fn end_bound_is_exclusive_of_equal_instant() {
        let origin = nine_am();
        let clock = FakeClock::starting_at(origin);
        let mut pointer = RecordingPointer::resting_at(0.0, 0.0);
        let mut settings = config(Duration::from_secs(1));
        settings.end = Some(origin);

        let mut click_loop = ClickLoop::new(settings, &clock, &mut pointer);
        assert!(matches!(click_loop.step().expect("step"), Step::Clicked(_)));
        assert_eq!(click_loop.step().expect("step"), Step::Finished);
    }

    #[test]
    fn waits_for_start_in_bounded_slices() {
        let origin = nine_am();
        let clock = FakeClock::starting_at(origin);
        let mut pointer = RecordingPointer::resting_at(0.0, 0.0);
        let mut settings = config(Duration::from_secs(10));
        settings.start = Some(origin + chrono::Duration::milliseconds(2_500));

        let mut click_loop = ClickLoop::new(settings, &clock, &mut pointer);
        assert_eq!(click_loop.state, LoopState::WaitingToStart);
        assert_eq!(click_loop.step().expect("step"), Step::Waiting);
        assert_eq!(click_loop.step().expect("step"), Step::Waiting);
        assert_eq!(click_loop.step().expect("step"), Step::Waiting);
        assert_eq!(click_loop.clicks, 0);

        assert!(matches!(click_loop.step().expect("step"), Step::Clicked(_)));
        assert_eq!(click_loop.state, LoopState::Active);
        drop(click_loop);

        assert_eq!(
            *clock.sleeps.borrow(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(1),
                Duration::from_millis(500),
                Duration::from_secs(10),
            ]
        );
    }

    #[test]
    fn start_in_the_past_clicks_immediately() {
        let origin = nine_am();
        let clock = FakeClock::starting_at(origin);
        let mut pointer = RecordingPointer::resting_at(0.0, 0.0);
        let mut settings = config(Duration::from_secs(1));
        settings.start = Some(origin - seconds(3_600));

        let mut click_loop = ClickLoop::new(settings, &clock, &mut pointer);
        assert!(matches!(click_loop.step().expect("step"), Step::Clicked(_)));
        assert_eq!(click_loop.state, LoopState::Active);
    }

    #[test]
    fn runs_until_end_and_trims_final_pause() {
        let origin = nine_am();
        let clock = FakeClock::starting_at(origin);
        let mut pointer = RecordingPointer::resting_at(0.0, 0.0);
        let mut settings = config(Duration::from_secs(1));
        settings.end = Some(origin + chrono::Duration::milliseconds(2_500));

        let mut click_loop = ClickLoop::new(settings, &clock, &mut pointer);
        assert_eq!(click_loop.run().expect("runs"), 3);
        drop(click_loop);

        assert_eq!(
            *clock.sleeps.borrow(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(1),
                Duration::from_millis(501),
            ]
        );
        assert_eq!(pointer.presses(), 3);
    }

    #[test]
    fn end_passing_while_waiting_finishes_without_clicking() {
        let origin = nine_am();
        let clock = FakeClock::starting_at(origin);
        let mut pointer = RecordingPointer::resting_at(0.0, 0.0);
        let mut settings = config(Duration::from_secs(1));
        settings.start = Some(origin + seconds(10));
        settings.end = Some(origin + seconds(2));

        let mut click_loop = ClickLoop::new(settings, &clock, &mut pointer);
        assert_eq!(click_loop.run().expect("runs"), 0);
        drop(click_loop);

        assert_eq!(pointer.presses(), 0);
        assert_eq!(clock.elapsed_since(origin), seconds(3));
    }

    #[test]
    fn clicks_target_and_restores_pointer() {
        let origin = nine_am();
        let clock = FakeClock::starting_at(origin);
        let mut pointer = RecordingPointer::resting_at(50.0, 60.0);
        let mut settings = config(Duration::from_secs(1));
        settings.position = Some(ScreenPosition::new(3.5, 7.0));

        let mut click_loop = ClickLoop::new(settings, &clock, &mut pointer);
        assert_eq!(
            click_loop.step().expect("step"),
            Step::Clicked(ScreenPosition::new(3.5, 7.0))
        );
        drop(click_loop);

        assert_eq!(pointer.location, ScreenPosition::new(50.0, 60.0));
        assert_eq!(
            pointer.events.first(),
            Some(&PointerEvent::Move(ScreenPosition::new(3.5, 7.0)))
        );
    }
}
