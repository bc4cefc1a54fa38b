use super::config::{MIN_EXPIRY_SECS, SECONDS_PER_YEAR};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::America::New_York;

/// Hours added to "now" when a same-day expiry's nominal close has passed.
const AFTER_CLOSE_EXTENSION_HOURS: i64 = 6;

fn close_time() -> NaiveTime {
    NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Today's date on the exchange calendar.
pub fn exchange_date(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&New_York).date_naive()
}

/// Nominal 16:00 New York close on `date`, in UTC.
pub fn nominal_close(date: NaiveDate) -> DateTime<Utc> {
    let local = date.and_time(close_time());
    match New_York.from_local_datetime(&local).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        // 16:00 never falls in a DST gap; keep a sane value regardless.
        None => Utc.from_utc_datetime(&local),
    }
}

/// Year fraction from `now` until the nominal close of `expiry`.
///
/// A same-day expiry past the close is pushed out six hours. The distance is
/// floored at 60 seconds and divided by 365×24×3600.
pub fn time_to_expiry_years(now: DateTime<Utc>, expiry: NaiveDate) -> f64 {
    let mut close = nominal_close(expiry);
    if now > close && expiry == exchange_date(now) {
        close = now + Duration::hours(AFTER_CLOSE_EXTENSION_HOURS);
    }
    let secs = (close - now).num_milliseconds() as f64 / 1000.0;
    secs.max(MIN_EXPIRY_SECS) / SECONDS_PER_YEAR
}

/// Same-day expiry if listed, else the first listed on or after today,
/// else the first listed.
pub fn pick_expiry(expiries: &[NaiveDate], today: NaiveDate) -> Option<NaiveDate> {
    if expiries.contains(&today) {
        return Some(today);
    }
    expiries
        .iter()
        .copied()
        .find(|d| *d >= today)
        .or_else(|| expiries.first().copied())
}

/// Regular US cash session, weekdays 09:30–16:05 New York.
pub fn is_market_open(now: DateTime<Utc>) -> bool {
    let local = now.with_timezone(&New_York);
    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let hm = local.hour() * 100 + local.minute();
    (930..=1605).contains(&hm)
}
