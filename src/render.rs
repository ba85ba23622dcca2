//! Terminal rendering of the result card.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::age::AgeResult;
use crate::animate::{AnimatorConfig, FrameClock, Outcome, Tween, animate};
use crate::form::DATE_FORMAT;

pub const YEARS_DURATION: Duration = Duration::from_millis(1000);
pub const MONTHS_DURATION: Duration = Duration::from_millis(1200);
pub const DAYS_DURATION: Duration = Duration::from_millis(1400);

const MIN_ROW_CHARS: usize = 32;

/// Everything shown for one submission.
#[derive(Debug, Clone, Copy)]
pub struct Card {
    pub birthdate: NaiveDate,
    pub today: NaiveDate,
    pub age: AgeResult,
}

impl Card {
    /// Key/value rows: the dates, the human age and the grouped totals.
    pub fn rows(&self, separator: char) -> Vec<(&'static str, String)> {
        vec![
            ("Born", self.birthdate.format(DATE_FORMAT).to_string()),
            ("Today", self.today.format(DATE_FORMAT).to_string()),
            ("Age", self.age.to_string()),
            ("Total days", group_thousands(self.age.total_days, separator)),
            ("Total hours", group_thousands(self.age.total_hours, separator)),
            ("Total minutes", group_thousands(self.age.total_minutes, separator)),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub animate: bool,
    pub separator: char,
    pub animator: AnimatorConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            animate: true,
            separator: ',',
            animator: AnimatorConfig::default(),
        }
    }
}

/// Inserts `separator` between groups of three digits.
pub fn group_thousands(n: i64, separator: char) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// `key: ....... value`, padded with dot leaders to `align_width` chars.
pub fn build_stat_row(key: &str, value: &str, align_width: usize) -> (String, String, String) {
    let key_part = format!("{key}: ");
    let base_len = key_part.chars().count() + value.chars().count();
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        2 => ". ".to_string(),
        n => format!("{} ", ".".repeat(n - 1)),
    };

    (key_part, dots, value.to_string())
}

/// Width every row of `rows` is aligned to.
pub fn align_width(rows: &[(&str, String)], min: usize) -> usize {
    rows.iter()
        .map(|(k, v)| k.chars().count() + 2 + v.chars().count())
        .max()
        .unwrap_or(0)
        .max(min)
}

pub fn counter_line(years: i64, months: i64, days: i64) -> String {
    format!("{years:>4} years {months:>3} months {days:>3} days")
}

/// Tweens for the years, months and days counters, all counting up from zero.
pub fn counter_tweens(age: &AgeResult) -> [Tween; 3] {
    [
        Tween::new(0, age.years as i64, YEARS_DURATION),
        Tween::new(0, age.months as i64, MONTHS_DURATION),
        Tween::new(0, age.days as i64, DAYS_DURATION),
    ]
}

struct CounterDisplay<'a, W: Write> {
    out: &'a mut W,
    values: [i64; 3],
    error: Option<io::Error>,
}

impl<W: Write> CounterDisplay<'_, W> {
    fn update(&mut self, slot: usize, value: i64) {
        self.values[slot] = value;
        if self.error.is_some() {
            return;
        }
        let [y, m, d] = self.values;
        let drawn = write!(self.out, "\r{}", counter_line(y, m, d)).and_then(|_| self.out.flush());
        if let Err(e) = drawn {
            self.error = Some(e);
        }
    }
}

/// Prints the card, then counts years, months and days up to their values.
///
/// The three counters run concurrently on the same task, each with its own
/// duration, and share one redrawn line.
pub async fn play<W, C>(
    card: &Card,
    config: &RenderConfig,
    clock: &C,
    cancel: &CancellationToken,
    out: &mut W,
) -> io::Result<Outcome>
where
    W: Write + Send,
    C: FrameClock + Sync + ?Sized,
{
    let rows = card.rows(config.separator);
    let width = align_width(&rows, MIN_ROW_CHARS);
    for (key, value) in &rows {
        let (k, dots, v) = build_stat_row(key, value, width);
        writeln!(out, "{k}{dots}{v}")?;
    }

    let age = &card.age;
    if !config.animate {
        writeln!(
            out,
            "{}",
            counter_line(age.years as i64, age.months as i64, age.days as i64)
        )?;
        return Ok(Outcome::Completed);
    }

    let display = Mutex::new(CounterDisplay {
        out,
        values: [0; 3],
        error: None,
    });
    let update = |slot: usize, value: i64| {
        display
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update(slot, value)
    };

    let [years, months, days] = counter_tweens(age);
    let outcomes = tokio::join!(
        animate(years, clock, &config.animator, cancel, |v| update(0, v)),
        animate(months, clock, &config.animator, cancel, |v| update(1, v)),
        animate(days, clock, &config.animator, cancel, |v| update(2, v)),
    );

    let display = display.into_inner().unwrap_or_else(PoisonError::into_inner);
    if let Some(e) = display.error {
        return Err(e);
    }
    writeln!(display.out)?;

    let outcome = match outcomes {
        (Outcome::Completed, Outcome::Completed, Outcome::Completed) => Outcome::Completed,
        _ => Outcome::Cancelled,
    };
    info!(?outcome, "counters finished");
    Ok(outcome)
}
