mod click_loop;
mod clock;
mod config;
mod parse;
mod pointer;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use env_logger::Env;
use log::info;

use crate::click_loop::ClickLoop;
use crate::clock::SystemClock;
use crate::config::{ClickerArgs, ClickerConfig};
use crate::pointer::{EnigoPointer, PressCapture};

#[derive(Parser, Debug)]
#[command(
    name = "intervalclick",
    version,
    about = "Clicks the mouse at a fixed interval inside an optional time window"
)]
struct Cli {
    /// Stop after this time today, e.g. 5p or 4:30pm. Without a value: 5:00 PM.
    #[arg(long, num_args = 0..=1, value_name = "TIME")]
    end: Option<Option<String>>,

    /// Do not click before this time today, e.g. 8:30a.
    #[arg(long, value_name = "TIME")]
    start: Option<String>,

    /// Pause between clicks as [#h][#m][#s][#ms], e.g. 1m30s. Default: 5m.
    #[arg(long, value_name = "DURATION")]
    delay: Option<String>,

    /// Click target as x,y. Without a value, click once on the target to pick it.
    #[arg(long, num_args = 0..=1, value_name = "POS")]
    position: Option<Option<String>>,

    /// Print the resolved settings and one status line per click.
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn clicker_args(&self) -> ClickerArgs<'_> {
        ClickerArgs {
            end: self.end.as_ref().map(Option::as_deref),
            start: self.start.as_deref(),
            delay: self.delay.as_deref(),
            position: self.position.as_ref().map(Option::as_deref),
            verbose: self.verbose,
        }
    }
}

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = ClickerConfig::resolve(cli.clicker_args(), &Local::now(), &PressCapture::new())?;

    if config.verbose {
        for line in config.summary_lines() {
            println!("{line}");
        }
    }

    let clock = SystemClock;
    let mut pointer = EnigoPointer::new();
    let clicks = ClickLoop::new(config, &clock, &mut pointer).run()?;
    info!("end time reached after {clicks} clicks");
    Ok(())
}
