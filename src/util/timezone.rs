use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use time::{OffsetDateTime, UtcOffset};

pub fn localized_datetime(time: OffsetDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    let utc = time.to_offset(UtcOffset::UTC);
    let datetime_utc = DateTime::<Utc>::from_timestamp(utc.unix_timestamp(), utc.nanosecond())?;
    Some(tz.from_utc_datetime(&datetime_utc.naive_utc()))
}

/// Calendar date of `time` as observed in `tz`.
pub fn localized_date(time: OffsetDateTime, tz: Tz) -> Option<NaiveDate> {
    localized_datetime(time, tz).map(|localized| localized.date_naive())
}

/// Calendar date of a UNIX timestamp (seconds) as observed in `tz`.
pub fn localized_date_from_unix(seconds: i64, tz: Tz) -> Option<NaiveDate> {
    let time = OffsetDateTime::from_unix_timestamp(seconds).ok()?;
    localized_date(time, tz)
}

/// `YYYY-MM-DD` rendering used by sitemap `lastmod` values.
pub fn iso_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}
