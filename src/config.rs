//! Command-line and environment configuration.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::animate::AnimatorConfig;
use crate::form::DATE_FORMAT;
use crate::parallax::Point;
use crate::render::RenderConfig;

/// Age counter - how long since a birth date, in calendar units and totals
#[derive(Parser, Debug)]
#[command(name = "age-counter")]
#[command(version, about, long_about = None)]
#[command(after_help = "Run without BIRTHDATE to enter dates one per line.")]
pub struct Config {
    /// Birth date (YYYY-MM-DD)
    #[arg(env = "AGE_COUNTER_BIRTHDATE", value_parser = parse_date)]
    pub birthdate: Option<NaiveDate>,

    /// Date to count up to instead of the local calendar date
    #[arg(long, env = "AGE_COUNTER_TODAY", value_parser = parse_date)]
    pub today: Option<NaiveDate>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Print final values without counting up
    #[arg(long)]
    pub no_animate: bool,

    /// Write age_dark.svg and age_light.svg into this directory
    #[arg(long, value_name = "DIR")]
    pub svg: Option<PathBuf>,

    /// Pointer position (X,Y) used to tilt the SVG card
    #[arg(long, value_name = "X,Y", value_parser = parse_point)]
    pub pointer: Option<Point>,

    /// Thousands separator for totals
    #[arg(long, default_value_t = ',')]
    pub separator: char,

    /// Counter animation frame rate (1-1000)
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub fps: u32,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// The configured end date, or the local calendar date.
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn render(&self) -> RenderConfig {
        RenderConfig {
            animate: !self.no_animate && !self.json,
            separator: self.separator,
            animator: AnimatorConfig::with_fps(self.fps),
        }
    }

    /// Default log filter for the verbosity count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| format!("expected a date like 1990-05-15: {e}"))
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad X '{x}': {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad Y '{y}': {e}"))?;
    Ok(Point { x, y })
}
