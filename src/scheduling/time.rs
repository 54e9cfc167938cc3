//! Time utilities and interval arithmetic

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Combine a calendar date and a time of day into a UTC instant
pub fn combine(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(time))
}

/// Day of week with 0=Sunday .. 6=Saturday
pub fn day_of_week(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

/// Midnight-to-midnight bounds of a calendar date
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = combine(date, NaiveTime::MIN);
    (start, start + Duration::days(1))
}

/// A half-open time interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Standard half-open range overlap test
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `other` fits entirely inside this interval
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Expand on both ends by the given number of minutes
    pub fn expand(&self, minutes: i64) -> Interval {
        Interval {
            start: self.start - Duration::minutes(minutes),
            end: self.end + Duration::minutes(minutes),
        }
    }
}

/// Subtract a set of blocked intervals from a free window
///
/// Blocked ranges are sorted by start, the cursor walks forward past each
/// overlapping range, and the gaps in between are emitted.
pub fn subtract(free: Interval, blocked: &[Interval]) -> Vec<Interval> {
    if free.is_empty() {
        return Vec::new();
    }

    let mut blocked: Vec<Interval> = blocked
        .iter()
        .copied()
        .filter(|b| !b.is_empty() && b.overlaps(&free))
        .collect();
    blocked.sort_by_key(|b| b.start);

    let mut gaps = Vec::new();
    let mut cursor = free.start;
    for b in blocked {
        if b.start > cursor {
            gaps.push(Interval::new(cursor, b.start.min(free.end)));
        }
        cursor = cursor.max(b.end);
        if cursor >= free.end {
            return gaps;
        }
    }
    if cursor < free.end {
        gaps.push(Interval::new(cursor, free.end));
    }
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap() // a Monday
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        combine(date(), NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn day_of_week_is_zero_based_on_sunday() {
        assert_eq!(day_of_week(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()), 0); // Sunday
        assert_eq!(day_of_week(date()), 1); // Monday
        assert_eq!(day_of_week(NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()), 6); // Saturday
    }

    #[test]
    fn day_bounds_cover_24_hours() {
        let (start, end) = day_bounds(date());
        assert_eq!((end - start).num_hours(), 24);
        assert_eq!(start, at(0, 0));
    }

    #[test]
    fn half_open_intervals_touching_do_not_overlap() {
        let a = Interval::new(at(9, 0), at(10, 0));
        let b = Interval::new(at(10, 0), at(11, 0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.overlaps(&Interval::new(at(9, 59), at(10, 30))));
    }

    #[test]
    fn containment_includes_exact_fit() {
        let window = Interval::new(at(9, 0), at(10, 0));
        assert!(window.contains(&Interval::new(at(9, 0), at(10, 0))));
        assert!(window.contains(&Interval::new(at(9, 15), at(9, 45))));
        assert!(!window.contains(&Interval::new(at(9, 30), at(10, 1))));
    }

    #[test]
    fn subtract_emits_gaps_between_blocked_ranges() {
        let free = Interval::new(at(9, 0), at(17, 0));
        let blocked = vec![
            Interval::new(at(10, 0), at(10, 30)),
            Interval::new(at(12, 0), at(13, 0)),
        ];
        let gaps = subtract(free, &blocked);
        assert_eq!(
            gaps,
            vec![
                Interval::new(at(9, 0), at(10, 0)),
                Interval::new(at(10, 30), at(12, 0)),
                Interval::new(at(13, 0), at(17, 0)),
            ]
        );
    }

    #[test]
    fn subtract_handles_unsorted_and_overlapping_blocks() {
        let free = Interval::new(at(9, 0), at(12, 0));
        let blocked = vec![
            Interval::new(at(10, 30), at(11, 0)),
            Interval::new(at(10, 0), at(10, 45)),
            Interval::new(at(8, 0), at(9, 30)),
        ];
        let gaps = subtract(free, &blocked);
        assert_eq!(
            gaps,
            vec![
                Interval::new(at(9, 30), at(10, 0)),
                Interval::new(at(11, 0), at(12, 0)),
            ]
        );
    }

    #[test]
    fn subtract_with_fully_blocked_window_is_empty() {
        let free = Interval::new(at(9, 0), at(10, 0));
        let blocked = vec![Interval::new(at(8, 0), at(11, 0))];
        assert!(subtract(free, &blocked).is_empty());
    }

    #[test]
    fn expand_pads_both_ends() {
        let iv = Interval::new(at(10, 0), at(10, 30)).expand(10);
        assert_eq!(iv, Interval::new(at(9, 50), at(10, 40)));
    }
}
