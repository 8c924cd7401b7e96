use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, NaiveTime, TimeZone};

/// Latest hour probed when local midnight falls inside a DST gap.
const MAX_GAP_PROBE_HOURS: i64 = 3;

/// Returns the first instant of the calendar day after `now`, in `now`'s zone.
///
/// Ambiguous local midnights resolve to the earlier instant. When midnight
/// does not exist locally (DST gap) the first existing whole hour after it
/// is used. The result is always strictly later than `now`.
pub fn next_midnight_after<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let fallback = now.clone() + Duration::hours(24);

    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return fallback;
    };
    let midnight = NaiveDateTime::new(tomorrow, NaiveTime::MIN);

    for hour in 0..=MAX_GAP_PROBE_HOURS {
        let candidate = midnight + Duration::hours(hour);
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(at) => return at,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => continue,
        }
    }

    fallback
}
