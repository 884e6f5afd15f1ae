// src/calendar_tests.rs

#[cfg(test)]
mod tests {
    use crate::calendar::*;
    use chrono::{Datelike, NaiveDate, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_leap_year_rules() {
        // Century years are only leap when divisible by 400.
        let cases = [
            (1900, false),
            (2000, true),
            (2020, true),
            (2021, false),
            (2024, true),
            (2100, false),
            (2400, true),
        ];
        for (year, expected) in cases {
            assert_eq!(is_leap_year(year), expected, "year {}", year);
        }
    }

    #[test]
    fn test_days_in_year() {
        assert_eq!(days_in_year(2021), 365);
        assert_eq!(days_in_year(2020), 366);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(1, 2021), 31);
        assert_eq!(days_in_month(2, 2021), 28);
        assert_eq!(days_in_month(2, 2020), 29);
        assert_eq!(days_in_month(4, 2021), 30);
        assert_eq!(days_in_month(12, 2021), 31);
    }

    #[test]
    fn test_month_and_weekday_names() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        // Weeks start on Monday.
        assert_eq!(weekday_name(Weekday::Mon), "Monday");
        assert_eq!(weekday_name(Weekday::Sun), "Sunday");
    }

    #[test]
    fn test_build_month_march_2021() {
        // March 1st 2021 was a Monday, so the grid needs no leading gap.
        let grid = build_month(3, 2021).unwrap();
        assert_eq!(grid.name, "March");
        assert_eq!(grid.number, 3);
        assert_eq!(grid.year, 2021);
        assert_eq!(grid.offset, 0);
        assert_eq!(grid.days.len(), 31);
        assert_eq!(grid.days[0].weekday, "Monday");
        assert_eq!(grid.days[0].date, date(2021, 3, 1));
        assert_eq!(grid.days[30].date, date(2021, 3, 31));
    }

    #[test]
    fn test_build_month_offset_matches_first_weekday() {
        for year in [2020, 2021, 2024] {
            for month in 1..=12u32 {
                let grid = build_month(month, year).unwrap();
                let first = date(year, month, 1);
                assert_eq!(
                    grid.offset,
                    first.weekday().num_days_from_monday(),
                    "{}-{}",
                    year,
                    month
                );
                assert_eq!(grid.days.len(), days_in_month(month, year) as usize);
                // Every cell carries a real date within the month.
                for (i, cell) in grid.days.iter().enumerate() {
                    assert_eq!(cell.number as usize, i + 1);
                    assert_eq!(cell.date.month(), month);
                    assert!(cell.events.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_month_grid_serde_round_trip() {
        // Grids cross a serialization boundary on their way to clients.
        let grid = build_month(3, 2021).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        let back: MonthGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "March");
        assert_eq!(back.days.len(), grid.days.len());
        assert_eq!(back.days[0].weekday, "Monday");
        assert_eq!(back.days[0].date, date(2021, 3, 1));
        assert_eq!(back.offset, grid.offset);
    }

    #[test]
    fn test_build_month_rejects_invalid() {
        assert!(build_month(0, 2021).is_none());
        assert!(build_month(13, 2021).is_none());
    }

    #[test]
    fn test_year_offset() {
        // January 1st 2021 was a Friday.
        assert_eq!(year_offset(2021), Some(4));
        // January 1st 2024 was a Monday.
        assert_eq!(year_offset(2024), Some(0));
    }

    #[test]
    fn test_month_row_gaps() {
        let gaps = month_row_gaps(2021).unwrap();
        assert_eq!(gaps.len(), 12);
        // February 2021 started on a Monday: 28 days fill exactly four
        // rows, so the trailing gap collapses to three.
        assert_eq!(gaps[1], 3);
        for (i, gap) in gaps.iter().enumerate() {
            assert!((3..=6).contains(gap), "month {} gap {}", i + 1, gap);
        }
    }

    #[test]
    fn test_iso_week_start() {
        // ISO week 1 of 2021 began Monday January 4th.
        assert_eq!(iso_week_start(2021, 1), Some(date(2021, 1, 4)));
        // 2020 had 53 ISO weeks; week 53 began December 28th.
        assert_eq!(iso_week_start(2020, 53), Some(date(2020, 12, 28)));
        // 2021 only has 52 weeks.
        assert_eq!(iso_week_start(2021, 53), None);
        assert_eq!(iso_week_start(2021, 0), None);
        assert_eq!(iso_week_start(2021, 54), None);
    }

    #[test]
    fn test_iso_week_start_lands_on_monday() {
        for week in 1..=52u32 {
            let start = iso_week_start(2022, week).unwrap();
            assert_eq!(start.weekday(), Weekday::Mon);
            assert_eq!(start.iso_week().week(), week);
            assert_eq!(start.iso_week().year(), 2022);
        }
    }

    #[test]
    fn test_year_progress_midyear() {
        let progress = year_progress(2021, date(2021, 7, 2));
        assert_eq!(progress.total_days, 365);
        assert_eq!(progress.days_passed, date(2021, 7, 2).ordinal());
        assert!(progress.percent_passed > 50.0 && progress.percent_passed < 51.0);
        // 2021 had 52 Saturdays and 52 Sundays.
        assert_eq!(progress.weekend_days, 104);
    }

    #[test]
    fn test_year_progress_end_of_leap_year() {
        let progress = year_progress(2020, date(2020, 12, 31));
        assert_eq!(progress.total_days, 366);
        assert_eq!(progress.days_passed, 366);
        assert!((progress.percent_passed - 100.0).abs() < f32::EPSILON);
    }
}
