//! Relative-age labels computed on calendar days in a fixed reference zone.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use time::OffsetDateTime;

use super::locale::Locale;
use super::timezone::{localized_date, localized_date_from_unix};

/// Maps a document timestamp to a short label such as "yesterday" or "3 weeks ago".
///
/// Both the timestamp and `now` are truncated to their local midnight in the reference
/// zone before differencing, so 23:59 yesterday and 00:01 today are one day apart.
#[derive(Debug, Clone, Copy)]
pub struct RelativeTimeFormatter {
    tz: Tz,
    locale: Locale,
}

impl RelativeTimeFormatter {
    pub fn new(tz: Tz, locale: Locale) -> Self {
        Self { tz, locale }
    }

    pub fn format(&self, timestamp: i64, now: OffsetDateTime) -> String {
        let (Some(date), Some(today)) = (
            localized_date_from_unix(timestamp, self.tz),
            localized_date(now, self.tz),
        ) else {
            return timestamp.to_string();
        };

        let days = today.signed_duration_since(date).num_days();
        match self.locale {
            Locale::En => match days {
                ..=0 => "today".to_string(),
                1 => "yesterday".to_string(),
                2..=6 => format!("{days} days ago"),
                7..=29 => format!("{} weeks ago", days / 7),
                30..=364 => format!("{} months ago", days / 30),
                _ => absolute_date(date, self.locale),
            },
            Locale::Ja => match days {
                ..=0 => "今日".to_string(),
                1 => "昨日".to_string(),
                2..=6 => format!("{days}日前"),
                7..=29 => format!("{}週間前", days / 7),
                30..=364 => format!("{}ヶ月前", days / 30),
                _ => absolute_date(date, self.locale),
            },
        }
    }
}

fn absolute_date(date: NaiveDate, locale: Locale) -> String {
    match locale {
        Locale::En => format!("{}/{}/{}", date.month(), date.day(), date.year()),
        Locale::Ja => format!("{}/{}/{}", date.year(), date.month(), date.day()),
    }
}
