//! Birth date submission: the input control, validation and the
//! per-submission animation lifetime.

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::age::{self, AgeResult};
use crate::error::{AgeError, InvalidInput};

/// Accepted input format, as produced by a date input control.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Latest date the input accepts.
pub fn max_date(today: NaiveDate) -> String {
    today.format(DATE_FORMAT).to_string()
}

/// Reads one entry of the date field.
///
/// A blank entry is a submission without a date; malformed text never
/// reaches validation.
pub fn parse_entry(line: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map(Some)
}

pub fn validate(birthdate: Option<NaiveDate>, today: NaiveDate) -> Result<NaiveDate, AgeError> {
    let Some(birthdate) = birthdate else {
        return Err(AgeError::InvalidInput(InvalidInput::MissingBirthdate));
    };
    if birthdate > today {
        return Err(AgeError::InvalidInput(InvalidInput::FutureBirthdate));
    }
    Ok(birthdate)
}

/// Validates the submission and decomposes the age.
pub fn submit(birthdate: Option<NaiveDate>, today: NaiveDate) -> Result<AgeResult, AgeError> {
    let result = validate(birthdate, today).and_then(|birthdate| age::decompose(birthdate, today));
    match &result {
        Ok(age) => info!(
            ?birthdate,
            %today,
            years = age.years,
            months = age.months,
            days = age.days,
            "submission accepted"
        ),
        Err(e) => warn!(?birthdate, %today, error = %e, "submission rejected"),
    }
    result
}

/// Owns the cancellation token of the submission currently on screen.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<CancellationToken>,
    submissions: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new submission, stopping the animations of the previous one.
    pub fn begin(&mut self) -> CancellationToken {
        if let Some(previous) = self.current.take() {
            if !previous.is_cancelled() {
                debug!(submission = self.submissions, "cancelling previous animations");
            }
            previous.cancel();
        }
        self.submissions += 1;
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        token
    }

    /// Stops whatever is still animating.
    pub fn end(&mut self) {
        if let Some(current) = self.current.take() {
            current.cancel();
        }
    }

    pub fn submissions(&self) -> u64 {
        self.submissions
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.end();
    }
}
