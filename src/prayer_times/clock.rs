use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone};

/// Wall clock and local zone as seen by the schedule.
pub trait Clock: Send {
    fn now(&self) -> DateTime<FixedOffset>;

    /// UTC offset in force at the start of `date`. Prayer instants use the
    /// offset of their date, so a DST change later that day does not shift them.
    fn offset_on(&self, date: NaiveDate) -> FixedOffset;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    fn offset_on(&self, date: NaiveDate) -> FixedOffset {
        offset_at_midnight(&Local, date)
    }
}

/// Offset of local midnight on `date` in `tz`. When midnight is skipped by a
/// DST gap, the offset of the UTC midnight is used instead.
pub fn offset_at_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> FixedOffset {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.offset_from_local_datetime(&midnight).earliest() {
        Some(offset) => offset.fix(),
        None => tz.offset_from_utc_datetime(&midnight).fix(),
    }
}
