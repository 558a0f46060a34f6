use chrono::{Days, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar range a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum TimeframeError {
    #[error("invalid {field} date {value:?}: expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("date {0} cannot be represented in the local time zone")]
    Unrepresentable(NaiveDate),
}

fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, TimeframeError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        TimeframeError::InvalidDate {
            field,
            value: value.to_string(),
        }
    })
}

// DST gaps push midnight forward; ambiguous times take the earlier instant.
fn local_epoch(datetime: NaiveDateTime) -> Option<i64> {
    match Local.from_local_datetime(&datetime) {
        LocalResult::Single(dt) => Some(dt.timestamp()),
        LocalResult::Ambiguous(early, _) => Some(early.timestamp()),
        LocalResult::None => Local
            .from_local_datetime(&(datetime + chrono::Duration::hours(1)))
            .earliest()
            .map(|dt| dt.timestamp()),
    }
}

impl ReportWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TimeframeError> {
        if end < start {
            return Err(TimeframeError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, TimeframeError> {
        Self::new(parse_date(start, "start")?, parse_date(end, "end")?)
    }

    /// Days covered, counting both the start and end date.
    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Local midnight at the start date.
    pub fn time_from(&self) -> Result<i64, TimeframeError> {
        let midnight = self.start.and_hms_opt(0, 0, 0).unwrap_or_default();
        local_epoch(midnight).ok_or(TimeframeError::Unrepresentable(self.start))
    }

    /// Last second of the end date in local time.
    pub fn time_till(&self) -> Result<i64, TimeframeError> {
        let next_day = self
            .end
            .checked_add_days(Days::new(1))
            .ok_or(TimeframeError::Unrepresentable(self.end))?;
        let midnight = next_day.and_hms_opt(0, 0, 0).unwrap_or_default();
        local_epoch(midnight)
            .map(|epoch| epoch - 1)
            .ok_or(TimeframeError::Unrepresentable(self.end))
    }

    pub fn start_label(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_label(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}
