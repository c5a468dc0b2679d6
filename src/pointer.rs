use std::time::Duration;
use std::{iter, mem, thread};

use anyhow::{Context, Result};
use device_query::{DeviceQuery, DeviceState, MouseState};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use log::debug;

use crate::parse::position::{PositionCapture, ScreenPosition};

/// The system pointer. Only the primary button is ever used.
pub trait PointerDevice {
    fn location(&mut self) -> Result<ScreenPosition>;
    fn move_to(&mut self, target: ScreenPosition) -> Result<()>;
    fn press(&mut self) -> Result<()>;
    fn release(&mut self) -> Result<()>;
}

/// Clicks at `target` (or in place) and puts the pointer back where it was.
/// Returns the position that was clicked.
pub fn click(
    device: &mut dyn PointerDevice,
    target: Option<ScreenPosition>,
) -> Result<ScreenPosition> {
    let resting = device.location()?;
    let target = target.unwrap_or(resting);

    device.move_to(target)?;
    device.press()?;
    device.release()?;
    device.move_to(resting)?;
    Ok(target)
}

/// Pointer backed by `enigo`. The connection to the display server is opened
/// on first use so that runs which never click never need one.
#[derive(Default)]
pub struct EnigoPointer {
    enigo: Option<Enigo>,
}

impl EnigoPointer {
    pub fn new() -> Self {
        Self::default()
    }

    fn controller(&mut self) -> Result<&mut Enigo> {
        let enigo = match self.enigo.take() {
            Some(enigo) => enigo,
            None => {
                debug!("connecting to pointer device");
                Enigo::new(&Settings::default())
                    .context("unable to connect to the pointer device")?
            }
        };
        Ok(self.enigo.insert(enigo))
    }
}

impl PointerDevice for EnigoPointer {
    fn location(&mut self) -> Result<ScreenPosition> {
        let (x, y) = self
            .controller()?
            .location()
            .context("unable to read pointer location")?;
        Ok(ScreenPosition::from((x, y)))
    }

    fn move_to(&mut self, target: ScreenPosition) -> Result<()> {
        let (x, y) = target.to_pixels();
        self.controller()?
            .move_mouse(x, y, Coordinate::Abs)
            .with_context(|| format!("unable to move pointer to {target}"))
    }

    fn press(&mut self) -> Result<()> {
        self.controller()?
            .button(Button::Left, Direction::Press)
            .context("unable to press pointer button")
    }

    fn release(&mut self) -> Result<()> {
        self.controller()?
            .button(Button::Left, Direction::Release)
            .context("unable to release pointer button")
    }
}

/// One-shot capture of the next physical pointer press. Samples the pointer
/// on the calling thread and stops sampling as soon as the press is seen.
pub struct PressCapture {
    poll_interval: Duration,
}

impl PressCapture {
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl Default for PressCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionCapture for PressCapture {
    fn capture(&self) -> Result<ScreenPosition> {
        let device =
            DeviceState::checked_new().context("pointer event listener is unavailable")?;

        println!("Click the position to be used...");
        debug!("polling for a pointer press every {:?}", self.poll_interval);
        let mut first_sample = true;
        let samples = iter::repeat_with(|| {
            if !mem::take(&mut first_sample) {
                thread::sleep(self.poll_interval);
            }
            device.get_mouse()
        });
        let coords = first_press(samples).context("pointer sampling stopped before a press")?;
        drop(device);
        debug!("pointer press listener released");

        let position = ScreenPosition::from(coords);
        println!("Selected position: {position}");
        Ok(position)
    }
}

/// Consumes pointer samples up to and including the first one on which some
/// button goes from released to pressed, and returns that sample's
/// coordinates. Buttons already held in the first sample do not count.
fn first_press<I>(samples: I) -> Option<(i32, i32)>
where
    I: IntoIterator<Item = MouseState>,
{
    let mut samples = samples.into_iter();
    let mut held = samples.next()?.button_pressed;
    for sample in samples {
        let newly_pressed = sample
            .button_pressed
            .iter()
            .enumerate()
            .any(|(button, &down)| down && !held.get(button).copied().unwrap_or(false));
        if newly_pressed {
            return Some(sample.coords);
        }
        held = sample.button_pressed;
    }
    None
}
