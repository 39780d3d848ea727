use crate::model::Day;
use time::{Date, Duration, OffsetDateTime, UtcOffset, Weekday};

/// Current time in the local offset, or UTC when the offset is unknown.
pub fn local_now() -> OffsetDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset)
}

pub fn current_day(now: OffsetDateTime) -> Day {
    day_of(now.weekday())
}

pub fn day_of(weekday: Weekday) -> Day {
    match weekday {
        Weekday::Monday => Day::Monday,
        Weekday::Tuesday => Day::Tuesday,
        Weekday::Wednesday => Day::Wednesday,
        Weekday::Thursday => Day::Thursday,
        Weekday::Friday => Day::Friday,
        Weekday::Saturday => Day::Saturday,
        Weekday::Sunday => Day::Sunday,
    }
}

fn sunday_index(day: Day) -> i64 {
    ((day.index() + 1) % 7) as i64
}

/// Calendar date of `day` in the Sunday-started week containing `today`.
pub fn date_for_day(day: Day, today: Date) -> Date {
    let today_index = i64::from(today.weekday().number_days_from_sunday());
    let offset = sunday_index(day) - today_index;
    today + Duration::days(offset)
}
