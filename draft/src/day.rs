use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// A calendar day in a fixed reference time zone.
///
/// "Today" is always derived from an explicit instant and zone, never from the
/// server's local time zone.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VotingDay {
    date: NaiveDate,
    zone: FixedOffset,
}

impl VotingDay {
    pub fn new(date: NaiveDate, zone: FixedOffset) -> Self {
        Self { date, zone }
    }

    /// The day on which `instant` falls, as seen from `zone`.
    pub fn containing(instant: DateTime<Utc>, zone: FixedOffset) -> Self {
        Self {
            date: instant.with_timezone(&zone).date_naive(),
            zone,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// First instant of the day (inclusive).
    pub fn start(&self) -> DateTime<Utc> {
        let local_midnight = self.date.and_time(NaiveTime::default());
        let utc_midnight = local_midnight - Duration::seconds(self.zone.local_minus_utc().into());
        Utc.from_utc_datetime(&utc_midnight)
    }

    /// First instant of the following day (exclusive).
    pub fn end(&self) -> DateTime<Utc> {
        self.start() + Duration::days(1)
    }
}
