//! Conversions between the server's local time and the UTC timestamps stored in the database.
//!
//! Local times are converted with the offset in force on that date, so dates
//! either side of a daylight saving change each get their own offset.

use time::{
    Date, Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset, macros::format_description,
    macros::time,
};
use time_tz::{Offset, OffsetDateTimeExt, OffsetResult, PrimitiveDateTimeExt, TimeZone, Tz};

use crate::Error;

/// Get a timezone from its canonical name, e.g. "Pacific/Auckland".
///
/// Returns `None` if the name is not a known timezone.
pub fn get_timezone(canonical_timezone: &str) -> Option<&'static Tz> {
    time_tz::timezones::get_by_name(canonical_timezone)
}

/// The current date and time in `timezone`.
pub fn local_now(timezone: &Tz) -> OffsetDateTime {
    OffsetDateTime::now_utc().to_timezone(timezone)
}

/// Convert a wall-clock time in `timezone` to UTC.
///
/// A time that occurs twice when the clocks go back resolves to its first
/// occurrence. A time skipped when the clocks go forward is read with the
/// offset from before the change. Returns `None` if the instant falls outside
/// the years that can be represented.
pub fn local_to_utc(date_time: PrimitiveDateTime, timezone: &Tz) -> Option<OffsetDateTime> {
    let offset = match date_time.assume_timezone(timezone) {
        OffsetResult::Some(local) | OffsetResult::Ambiguous(local, _) => local.offset(),
        OffsetResult::None => timezone
            .get_offset_utc(&date_time.checked_sub(Duration::DAY)?.assume_utc())
            .to_utc(),
    };

    date_time
        .assume_offset(offset)
        .checked_to_offset(UtcOffset::UTC)
}

/// Normalise a timestamp to UTC before it is stored or compared in the database.
///
/// # Errors
/// Returns [Error::DateOutOfRangeError] if the instant cannot be represented in UTC.
pub fn to_stored_utc(date_time: OffsetDateTime) -> Result<OffsetDateTime, Error> {
    date_time
        .checked_to_offset(UtcOffset::UTC)
        .ok_or(Error::DateOutOfRangeError(date_time))
}

/// Parse a date-time as sent by an HTML `datetime-local` input and convert it to UTC.
///
/// Accepts `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS`, and a plain `YYYY-MM-DD`
/// which is read as midnight. The value is interpreted in `timezone`.
pub fn parse_local_date_time(text: &str, timezone: &Tz) -> Option<OffsetDateTime> {
    let text = text.trim();

    let date_time = PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(text, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    })
    .or_else(|_| parse_date(text).map(Date::midnight).ok_or(()))
    .ok()?;

    local_to_utc(date_time, timezone)
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// The UTC instants of the very start of `start` and the very end of `end`, in local time.
///
/// Queries that take both bounds as inclusive will then cover every moment of
/// both days. Returns `None` if either instant cannot be represented in UTC.
pub fn local_day_bounds(
    start: Date,
    end: Date,
    timezone: &Tz,
) -> Option<(OffsetDateTime, OffsetDateTime)> {
    let start = local_to_utc(start.midnight(), timezone)?;
    let end = local_to_utc(end.with_time(time!(23:59:59.999999999)), timezone)?;

    Some((start, end))
}

/// The first and last day of the calendar month containing `date`.
pub fn month_containing(date: Date) -> (Date, Date) {
    let first_day = date - Duration::days(date.day() as i64 - 1);
    let days_in_month = date.month().length(date.year()) as i64;

    (first_day, first_day + Duration::days(days_in_month - 1))
}

/// Format a stored timestamp in local time as `YYYY-MM-DD HH:MM`.
pub fn format_local_date_time(date_time: OffsetDateTime, timezone: &Tz) -> String {
    let offset = timezone.get_offset_utc(&date_time).to_utc();
    let local = date_time.checked_to_offset(offset).unwrap_or(date_time);

    format!("{} {:02}:{:02}", local.date(), local.hour(), local.minute())
}
