//! Availability window resolution and slot quantization

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::models::availability::WindowRule;
use crate::scheduling::time::{combine, day_of_week, Interval};

/// Resolve the time ranges applicable to one calendar date
///
/// Exception rules for the date take precedence and completely replace the
/// recurring rules for that weekday; a day-off exception yields no ranges.
/// Several rules of the winning kind union.
pub fn applicable_ranges(date: NaiveDate, rules: &[WindowRule]) -> Vec<(NaiveTime, NaiveTime)> {
    let mut exception_ranges = Vec::new();
    let mut has_exception = false;

    for rule in rules {
        match rule {
            WindowRule::DayOff { date: d } if *d == date => has_exception = true,
            WindowRule::Exception { date: d, start, end } if *d == date => {
                has_exception = true;
                exception_ranges.push((*start, *end));
            }
            _ => {}
        }
    }
    if has_exception {
        return exception_ranges;
    }

    let dow = day_of_week(date);
    rules
        .iter()
        .filter_map(|rule| match rule {
            WindowRule::Recurring { day_of_week, start, end } if *day_of_week == dow => {
                Some((*start, *end))
            }
            _ => None,
        })
        .collect()
}

/// Open windows for a date, as UTC intervals sorted by start
pub fn open_windows(date: NaiveDate, rules: &[WindowRule]) -> Vec<Interval> {
    let mut windows: Vec<Interval> = applicable_ranges(date, rules)
        .into_iter()
        .map(|(start, end)| Interval::new(combine(date, start), combine(date, end)))
        .filter(|w| !w.is_empty())
        .collect();
    windows.sort_by_key(|w| w.start);
    windows
}

/// Clip window starts so no window begins before `now`
pub fn clip_to_now(windows: Vec<Interval>, now: DateTime<Utc>) -> Vec<Interval> {
    windows
        .into_iter()
        .filter_map(|w| {
            if w.end <= now {
                None
            } else {
                Some(Interval::new(w.start.max(now), w.end))
            }
        })
        .collect()
}

/// Free windows after removing buffered appointments, keeping only windows
/// long enough for `duration_minutes`
pub fn free_windows(
    open: &[Interval],
    appointments: &[Interval],
    buffer_minutes: i64,
    duration_minutes: i64,
) -> Vec<Interval> {
    let blocked: Vec<Interval> = appointments.iter().map(|a| a.expand(buffer_minutes)).collect();
    open.iter()
        .flat_map(|w| super::time::subtract(*w, &blocked))
        .filter(|gap| gap.duration_minutes() >= duration_minutes)
        .collect()
}

/// Quantize a free window into discrete bookable slots
///
/// Candidate starts are the multiples of `step_minutes` counted from midnight,
/// beginning at the first multiple at or after the window start. A slot is
/// kept only when it fits entirely inside the window.
pub fn quantize(window: &Interval, duration_minutes: i64, step_minutes: i64) -> Vec<Interval> {
    debug_assert!(step_minutes > 0 && duration_minutes > 0);

    let day_start = combine(window.start.date_naive(), NaiveTime::MIN);
    let offset_secs = (window.start - day_start).num_seconds();
    let step_secs = step_minutes * 60;
    let first_offset = ((offset_secs + step_secs - 1) / step_secs) * step_secs;

    let mut slots = Vec::new();
    let mut start = day_start + Duration::seconds(first_offset);
    let duration = Duration::minutes(duration_minutes);
    while start + duration <= window.end {
        slots.push(Interval::new(start, start + duration));
        start += Duration::minutes(step_minutes);
    }
    slots
}

/// Containment check used by the booking engine: the requested interval must
/// fit inside one applicable window, evaluated without buffer or now-clipping
pub fn window_contains(date: NaiveDate, rules: &[WindowRule], requested: &Interval) -> bool {
    open_windows(date, rules).iter().any(|w| w.contains(requested))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
        combine(date, t(h, m))
    }

    fn weekday_rules() -> Vec<WindowRule> {
        // Mon-Fri 09:00-17:00 (day_of_week 1..=5)
        (1..=5)
            .map(|dow| WindowRule::Recurring {
                day_of_week: dow,
                start: t(9, 0),
                end: t(17, 0),
            })
            .collect()
    }

    #[test]
    fn day_off_exception_overrides_recurring() {
        let mut rules = weekday_rules();
        rules.push(WindowRule::DayOff { date: monday() });

        assert!(open_windows(monday(), &rules).is_empty());

        // Other Mondays keep the recurring window.
        let next_monday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let windows = open_windows(next_monday, &rules);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0], Interval::new(at(next_monday, 9, 0), at(next_monday, 17, 0)));
    }

    #[test]
    fn timed_exception_replaces_rather_than_merges() {
        let mut rules = weekday_rules();
        rules.push(WindowRule::Exception {
            date: monday(),
            start: t(13, 0),
            end: t(15, 0),
        });

        let windows = open_windows(monday(), &rules);
        assert_eq!(windows, vec![Interval::new(at(monday(), 13, 0), at(monday(), 15, 0))]);
    }

    #[test]
    fn multiple_rules_for_one_day_union() {
        let rules = vec![
            WindowRule::Recurring { day_of_week: 1, start: t(9, 0), end: t(12, 0) },
            WindowRule::Recurring { day_of_week: 1, start: t(14, 0), end: t(18, 0) },
        ];
        let windows = open_windows(monday(), &rules);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start, at(monday(), 9, 0));
        assert_eq!(windows[1].start, at(monday(), 14, 0));
    }

    #[test]
    fn clip_discards_elapsed_windows_and_trims_starts() {
        let windows = vec![
            Interval::new(at(monday(), 9, 0), at(monday(), 12, 0)),
            Interval::new(at(monday(), 14, 0), at(monday(), 17, 0)),
        ];
        let now = at(monday(), 12, 30);
        let clipped = clip_to_now(windows, now);
        assert_eq!(clipped, vec![Interval::new(at(monday(), 14, 0), at(monday(), 17, 0))]);

        let windows = vec![Interval::new(at(monday(), 9, 0), at(monday(), 17, 0))];
        let clipped = clip_to_now(windows, at(monday(), 10, 7));
        assert_eq!(clipped, vec![Interval::new(at(monday(), 10, 7), at(monday(), 17, 0))]);
    }

    #[test]
    fn quantize_aligns_to_step_and_keeps_fitting_slots_only() {
        // Window starts off-grid at 10:40; first candidate is 10:45.
        let window = Interval::new(at(monday(), 10, 40), at(monday(), 12, 0));
        let slots = quantize(&window, 30, 15);
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(
            starts,
            vec![at(monday(), 10, 45), at(monday(), 11, 0), at(monday(), 11, 15), at(monday(), 11, 30)]
        );
        // Every slot ends inside the window.
        assert!(slots.iter().all(|s| s.end <= window.end));
    }

    #[test]
    fn quantize_exact_fit_window_yields_single_slot() {
        let window = Interval::new(at(monday(), 9, 0), at(monday(), 9, 30));
        let slots = quantize(&window, 30, 15);
        assert_eq!(slots, vec![Interval::new(at(monday(), 9, 0), at(monday(), 9, 30))]);
    }

    #[test]
    fn booked_appointment_with_buffer_excludes_surrounding_slots() {
        // Scenario: Mon-Fri 09:00-17:00, buffer 10, step 15, duration 30,
        // one appointment 10:00-10:30. Candidate starts in [09:40, 10:40)
        // must disappear.
        let rules = weekday_rules();
        let open = open_windows(monday(), &rules);
        let busy = vec![Interval::new(at(monday(), 10, 0), at(monday(), 10, 30))];

        let free = free_windows(&open, &busy, 10, 30);
        let slots: Vec<_> = free.iter().flat_map(|w| quantize(w, 30, 15)).collect();
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();

        assert!(starts.contains(&at(monday(), 9, 0)));
        assert!(starts.contains(&at(monday(), 9, 15)));
        // The buffered block is [09:50, 10:40): a 09:30 cut would end at
        // 10:00 inside it, so the last morning start is 09:15.
        assert!(!starts.contains(&at(monday(), 9, 30)));
        assert!(!starts.contains(&at(monday(), 9, 45)));
        assert!(!starts.contains(&at(monday(), 10, 0)));
        assert!(!starts.contains(&at(monday(), 10, 15)));
        assert!(!starts.contains(&at(monday(), 10, 30)));
        assert!(starts.contains(&at(monday(), 10, 45)));
        assert!(starts.contains(&at(monday(), 16, 30)));
        assert!(!starts.contains(&at(monday(), 16, 45)));
    }

    #[test]
    fn containment_check_uses_unbuffered_windows() {
        let rules = vec![WindowRule::Recurring {
            day_of_week: 1,
            start: t(9, 0),
            end: t(9, 30),
        }];
        // Exact span of the window succeeds.
        let exact = Interval::new(at(monday(), 9, 0), at(monday(), 9, 30));
        assert!(window_contains(monday(), &rules, &exact));
        // One minute past the end fails.
        let late = Interval::new(at(monday(), 9, 1), at(monday(), 9, 31));
        assert!(!window_contains(monday(), &rules, &late));
    }
}
