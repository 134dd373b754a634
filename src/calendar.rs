// src/calendar.rs

use crate::config::HolidayRegion;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

pub trait BusinessCalendar {
    fn is_business_day(&self, date: NaiveDate) -> bool;

    /// Holidays between `start` and `end`, both inclusive
    fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate>;
}

/// Weekends plus a region's public holidays plus any extra dates
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    region: HolidayRegion,
    extra: BTreeSet<NaiveDate>,
    // regional holidays, filled one year at a time
    by_year: RefCell<BTreeMap<i32, BTreeSet<NaiveDate>>>,
}

impl HolidayCalendar {
    pub fn new(region: HolidayRegion) -> Self {
        Self { region, extra: BTreeSet::new(), by_year: RefCell::default() }
    }

    pub fn with_extra_holidays(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.extra.extend(dates);
        self
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        if self.extra.contains(&date) {
            return true;
        }
        self.by_year
            .borrow_mut()
            .entry(date.year())
            .or_insert_with(|| regional_holidays(self.region, date.year()).into_iter().collect())
            .contains(&date)
    }
}

impl BusinessCalendar for HolidayCalendar {
    fn is_business_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.is_holiday(date)
    }

    fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start.iter_days().take_while(|d| *d <= end).filter(|d| self.is_holiday(*d)).collect()
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn regional_holidays(region: HolidayRegion, year: i32) -> Vec<NaiveDate> {
    match region {
        HolidayRegion::Pt => portuguese_holidays(year),
        HolidayRegion::Weekends => Vec::new(),
    }
}

fn portuguese_holidays(year: i32) -> Vec<NaiveDate> {
    const FIXED: [(u32, u32); 10] = [
        (1, 1),   // Ano Novo
        (4, 25),  // Dia da Liberdade
        (5, 1),   // Dia do Trabalhador
        (6, 10),  // Dia de Portugal
        (8, 15),  // Assunção de Nossa Senhora
        (10, 5),  // Implantação da República
        (11, 1),  // Todos os Santos
        (12, 1),  // Restauração da Independência
        (12, 8),  // Imaculada Conceição
        (12, 25), // Natal
    ];

    let mut days: Vec<NaiveDate> = FIXED
        .iter()
        .filter_map(|&(month, day)| NaiveDate::from_ymd_opt(year, month, day))
        .collect();

    if let Some(easter) = easter_sunday(year) {
        days.extend(easter.checked_sub_days(Days::new(2))); // Sexta-feira Santa
        days.push(easter);
        days.extend(easter.checked_add_days(Days::new(60))); // Corpo de Deus
    }
    days
}

/// Gregorian Easter Sunday (anonymous algorithm)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Business days in `[start, end)`; zero when `end` is not after `start`
pub fn business_days_between(calendar: &dyn BusinessCalendar, start: NaiveDate, end: NaiveDate) -> i64 {
    start
        .iter_days()
        .take_while(|d| *d < end)
        .filter(|d| calendar.is_business_day(*d))
        .count() as i64
}

/// Rolls `date` forward to a business day, then moves `days` business days on
pub fn add_business_days(calendar: &dyn BusinessCalendar, date: NaiveDate, days: i64) -> NaiveDate {
    let mut business_days = date.iter_days().filter(|d| calendar.is_business_day(*d));
    let steps = usize::try_from(days.max(0)).unwrap_or(usize::MAX);
    business_days.nth(steps).unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn easter_dates() {
        assert_eq!(easter_sunday(2024), Some(date(2024, 3, 31)));
        assert_eq!(easter_sunday(2025), Some(date(2025, 4, 20)));
        assert_eq!(easter_sunday(2019), Some(date(2019, 4, 21)));
    }

    #[test]
    fn portuguese_movable_holidays() {
        let calendar = HolidayCalendar::new(HolidayRegion::Pt);
        assert!(calendar.is_holiday(date(2025, 4, 18)));
        assert!(calendar.is_holiday(date(2025, 6, 19)));
        assert!(!calendar.is_business_day(date(2024, 4, 25)));
        assert!(calendar.is_business_day(date(2024, 4, 24)));
    }

    #[test]
    fn weekends_only_region() {
        let calendar = HolidayCalendar::new(HolidayRegion::Weekends);
        assert!(calendar.is_business_day(date(2024, 12, 25)));
        assert!(!calendar.is_business_day(date(2024, 12, 28)));
    }

    #[test]
    fn extra_holidays_are_honoured() {
        let calendar = HolidayCalendar::new(HolidayRegion::Weekends).with_extra_holidays([date(2024, 12, 24)]);
        assert!(!calendar.is_business_day(date(2024, 12, 24)));
        assert_eq!(
            calendar.holidays_in_range(date(2024, 12, 1), date(2024, 12, 31)),
            vec![date(2024, 12, 24)]
        );
    }

    #[test]
    fn holidays_in_december() {
        let calendar = HolidayCalendar::new(HolidayRegion::Pt);
        assert_eq!(
            calendar.holidays_in_range(date(2024, 12, 1), date(2024, 12, 31)),
            vec![date(2024, 12, 1), date(2024, 12, 8), date(2024, 12, 25)]
        );
    }

    #[test]
    fn regional_holidays_are_computed_once_per_year() {
        let calendar = HolidayCalendar::new(HolidayRegion::Pt);
        let start = date(2024, 11, 1);

        assert_eq!(add_business_days(&calendar, start, 60), date(2025, 1, 29));
        assert_eq!(calendar.by_year.borrow().keys().copied().collect::<Vec<_>>(), vec![2024, 2025]);
        assert_eq!(calendar.by_year.borrow()[&2024].len(), 13);
    }

    #[test]
    fn counts_business_days_half_open() {
        let calendar = HolidayCalendar::new(HolidayRegion::Weekends);
        // Monday to Tuesday
        assert_eq!(business_days_between(&calendar, date(2024, 3, 4), date(2024, 3, 5)), 1);
        // Friday to Monday
        assert_eq!(business_days_between(&calendar, date(2024, 3, 8), date(2024, 3, 11)), 1);
        assert_eq!(business_days_between(&calendar, date(2024, 3, 4), date(2024, 3, 4)), 0);
        assert_eq!(business_days_between(&calendar, date(2024, 3, 5), date(2024, 3, 4)), 0);
    }

    #[test]
    fn holidays_are_not_counted() {
        let calendar = HolidayCalendar::new(HolidayRegion::Pt);
        // Wed 24th to Fri 26th April 2024 skips Liberty Day
        assert_eq!(business_days_between(&calendar, date(2024, 4, 24), date(2024, 4, 26)), 1);
    }

    #[test]
    fn adding_business_days_skips_weekends_and_holidays() {
        let calendar = HolidayCalendar::new(HolidayRegion::Pt);
        // Thursday + 1 lands on Friday
        assert_eq!(add_business_days(&calendar, date(2024, 3, 7), 1), date(2024, 3, 8));
        // Friday + 1 lands on Monday
        assert_eq!(add_business_days(&calendar, date(2024, 3, 8), 1), date(2024, 3, 11));
        // Saturday rolls to Monday first
        assert_eq!(add_business_days(&calendar, date(2024, 3, 9), 0), date(2024, 3, 11));
        // Wed 24th April + 1 skips Liberty Day
        assert_eq!(add_business_days(&calendar, date(2024, 4, 24), 1), date(2024, 4, 26));
    }
}
