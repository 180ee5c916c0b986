// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, Weekday};

use crate::{CaseId, TimeEntry};

/// Monday of the week containing `date`.
pub fn week_start(date: Date) -> Date {
    let offset = i64::from(date.weekday().number_days_from_monday());
    date.saturating_sub(Duration::days(offset))
}

pub fn week_dates(date: Date) -> [Date; 7] {
    let monday = week_start(date);
    let mut dates = [monday; 7];
    for (offset, day) in dates.iter_mut().enumerate() {
        *day = monday.saturating_add(Duration::days(offset as i64));
    }
    dates
}

pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "man",
        Weekday::Tuesday => "tir",
        Weekday::Wednesday => "ons",
        Weekday::Thursday => "tor",
        Weekday::Friday => "fre",
        Weekday::Saturday => "lør",
        Weekday::Sunday => "søn",
    }
}

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[day].[month].[year]");
const DAY_MONTH_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[day].[month]");

/// `dd.mm.yyyy`, falling back to ISO form if formatting fails.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Short `dd.mm` used in the week table header.
pub fn format_day_month(date: Date) -> String {
    date.format(DAY_MONTH_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

pub fn entries_on(entries: &[TimeEntry], case_id: CaseId, date: Date) -> Vec<&TimeEntry> {
    entries
        .iter()
        .filter(|entry| entry.case_id == case_id && entry.date == date)
        .collect()
}

pub fn day_total(entries: &[TimeEntry], date: Date) -> f64 {
    entries
        .iter()
        .filter(|entry| entry.date == date)
        .fold(0.0, |total, entry| total + entry.hours)
}

pub fn case_week_total(entries: &[TimeEntry], case_id: CaseId, date: Date) -> f64 {
    let days = week_dates(date);
    entries
        .iter()
        .filter(|entry| entry.case_id == case_id && days.contains(&entry.date))
        .fold(0.0, |total, entry| total + entry.hours)
}

pub fn week_total(entries: &[TimeEntry], date: Date) -> f64 {
    week_dates(date)
        .into_iter()
        .map(|day| day_total(entries, day))
        .fold(0.0, |total, hours| total + hours)
}

#[cfg(test)]
mod tests {
    use super::{
        case_week_total, day_total, entries_on, format_date, format_day_month, week_dates,
        week_start, week_total, weekday_label,
    };
    use crate::{CaseId, TimeEntry, TimeEntryId};
    use time::Weekday;
    use time::macros::date;

    fn entry(id: i64, case_id: i64, date: time::Date, hours: f64) -> TimeEntry {
        TimeEntry {
            id: TimeEntryId::new(id),
            case_id: CaseId::new(case_id),
            date,
            hours,
            description: "Arbeid".to_owned(),
            activity_type: "Admin".to_owned(),
            billable: true,
            from_suggestion: false,
        }
    }

    #[test]
    fn weeks_start_on_monday() {
        assert_eq!(week_start(date!(2026 - 02 - 22)), date!(2026 - 02 - 16));
        assert_eq!(week_start(date!(2026 - 02 - 16)), date!(2026 - 02 - 16));
        let days = week_dates(date!(2026 - 03 - 01));
        assert_eq!(days[0], date!(2026 - 02 - 23));
        assert_eq!(days[6], date!(2026 - 03 - 01));
        assert_eq!(days[6].weekday(), Weekday::Sunday);
    }

    #[test]
    fn dates_render_in_norwegian_order() {
        assert_eq!(format_date(date!(2026 - 02 - 05)), "05.02.2026");
        assert_eq!(format_date(date!(2027 - 01 - 01)), "01.01.2027");
        assert_eq!(format_day_month(date!(2026 - 12 - 24)), "24.12");
        assert_eq!(format_day_month(date!(2026 - 03 - 09)), "09.03");
        assert_eq!(weekday_label(Weekday::Saturday), "lør");
    }

    #[test]
    fn totals_sum_cells_days_and_weeks() {
        let entries = vec![
            entry(1, 1, date!(2026 - 02 - 16), 2.0),
            entry(2, 1, date!(2026 - 02 - 16), 1.5),
            entry(3, 2, date!(2026 - 02 - 16), 0.5),
            entry(4, 1, date!(2026 - 02 - 20), 3.0),
            entry(5, 1, date!(2026 - 02 - 23), 8.0),
        ];
        assert_eq!(entries_on(&entries, CaseId::new(1), date!(2026 - 02 - 16)).len(), 2);
        assert_eq!(day_total(&entries, date!(2026 - 02 - 16)), 4.0);
        assert_eq!(case_week_total(&entries, CaseId::new(1), date!(2026 - 02 - 18)), 6.5);
        assert_eq!(week_total(&entries, date!(2026 - 02 - 18)), 7.0);
        assert_eq!(day_total(&entries, date!(2026 - 02 - 17)), 0.0);
    }
}
