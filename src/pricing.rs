// Per-day pricing and availability calendar for a single product
use crate::catalog::{self, ServiceKind};
use crate::types::{AvailableDate, DepartureWindow, Rate};
use crate::xml_response::ParsedOption;
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::Serialize;

/// Longest range a single calendar request may cover.
pub const MAX_CALENDAR_DAYS: i64 = 400;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: String,
    pub day_of_week: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Rate>,
    pub display_price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingCalendar {
    pub product_code: String,
    pub product_name: String,
    pub date_from: String,
    pub date_to: String,
    pub quote_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub departure_windows: Vec<DepartureWindow>,
    pub available_dates: Vec<AvailableDate>,
    pub days: Vec<CalendarDay>,
}

pub fn is_rail(code: &str) -> bool {
    catalog::service_kind(code) == Some(ServiceKind::Rail)
        || catalog::rail_product_codes().contains(&code)
}

pub fn is_cruise(code: &str) -> bool {
    catalog::service_kind(code) == Some(ServiceKind::Cruise)
        || catalog::cruise_availability(code).is_some()
}

/// Default end of the calendar: six months out, twelve for rail journeys.
pub fn default_range_end(code: &str, from: NaiveDate) -> NaiveDate {
    let months = if is_rail(code) { 12 } else { 6 };
    from.checked_add_months(Months::new(months)).unwrap_or(from)
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?.trim(), "%Y-%m-%d").ok()
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn rate_for_day(rates: &[Rate], day: NaiveDate) -> Option<&Rate> {
    let in_range = rates.iter().find(|rate| {
        match (parse_date(rate.date_from.as_deref()), parse_date(rate.date_to.as_deref())) {
            (Some(from), Some(to)) => from <= day && day <= to,
            (Some(from), None) => from == day,
            _ => false,
        }
    });
    in_range.or_else(|| rates.iter().find(|rate| !rate.is_price_on_application()))
}

fn within_windows(windows: &[DepartureWindow], day: NaiveDate, weekday: &str) -> bool {
    windows.iter().any(|window| {
        let from = NaiveDate::parse_from_str(&window.date_from, "%Y-%m-%d");
        let to = NaiveDate::parse_from_str(&window.date_to, "%Y-%m-%d");
        let in_range = match (from, to) {
            (Ok(from), Ok(to)) => from <= day && day <= to,
            _ => false,
        };
        in_range
            && (window.departure_days.is_empty()
                || window.departure_days.iter().any(|d| d == weekday))
    })
}

/// Build the calendar for `[from, to]` from a pricing reply whose `OptAvail` starts at `from`.
pub fn build_calendar(option: &ParsedOption, from: NaiveDate, to: NaiveDate) -> PricingCalendar {
    let product = &option.product;
    let code = product.code.as_str();

    let mut quote_only = false;
    let mut notes = None;
    let mut forced_days: Option<&'static [&'static str]> = None;

    if is_rail(code) {
        let record = catalog::rail_availability(code);
        if catalog::rail_bookable(code) {
            forced_days = record.map(|r| r.departure_days);
        } else {
            quote_only = true;
            notes = record.map(|r| r.notes.to_string());
        }
    } else if is_cruise(code) && !catalog::cruise_bookable(code) {
        quote_only = true;
        notes = catalog::cruise_availability(code).map(|record| record.notes.to_string());
    }

    let span = (to - from).num_days().clamp(0, MAX_CALENDAR_DAYS - 1);
    let days = (0..=span)
        .map(|offset| {
            let day = from + Duration::days(offset);
            let weekday = weekday_name(day.weekday());
            let availability = option.opt_avail.get(offset as usize).copied();
            let rate = rate_for_day(&product.rates, day).cloned();

            let available = if quote_only {
                false
            } else if let Some(departure_days) = forced_days {
                departure_days.contains(&weekday)
            } else if !option.opt_avail.is_empty() {
                availability.unwrap_or(0) > 0
            } else if !option.departure_windows.is_empty() {
                within_windows(&option.departure_windows, day, weekday)
            } else {
                rate.as_ref().is_some_and(|r| !r.is_price_on_application())
            };

            CalendarDay {
                date: day.format("%Y-%m-%d").to_string(),
                day_of_week: weekday.to_string(),
                available,
                availability,
                display_price: rate
                    .as_ref()
                    .map(Rate::display_price)
                    .unwrap_or_else(|| "POA".to_string()),
                rate,
            }
        })
        .collect();

    let last_day = to.format("%Y-%m-%d").to_string();
    let available_dates = if quote_only {
        Vec::new()
    } else {
        option
            .available_dates(from)
            .into_iter()
            .filter(|d| d.date <= last_day)
            .collect()
    };

    PricingCalendar {
        product_code: code.to_string(),
        product_name: product.name.clone(),
        date_from: from.format("%Y-%m-%d").to_string(),
        date_to: last_day,
        quote_only,
        notes,
        departure_windows: option.departure_windows.clone(),
        available_dates,
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use test_case::test_case;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn option(code: &str, rates: Vec<Rate>, opt_avail: Vec<i64>) -> ParsedOption {
        ParsedOption {
            product: Product {
                code: code.to_string(),
                name: "Sample".to_string(),
                rates,
                ..Product::default()
            },
            opt_avail,
            departure_windows: vec![],
        }
    }

    fn twin(amount: i64, from: &str, to: &str) -> Rate {
        Rate {
            currency: "AUD".to_string(),
            rate_name: "Season".to_string(),
            date_from: Some(from.to_string()),
            date_to: Some(to.to_string()),
            twin_rate: amount,
            ..Rate::default()
        }
    }

    #[test]
    fn test_opt_avail_drives_availability() {
        let option = option(
            "NBOGTARP001CKSE",
            vec![twin(400_000, "2025-03-01", "2025-03-31")],
            vec![0, 3, 0, 4],
        );
        let calendar = build_calendar(&option, date("2025-03-03"), date("2025-03-05"));
        let available: Vec<bool> = calendar.days.iter().map(|d| d.available).collect();
        assert_eq!(available, vec![false, true, false]);
        assert_eq!(calendar.days[1].availability, Some(3));
        assert_eq!(calendar.days[1].display_price, "AUD $2,000");
        assert!(!calendar.quote_only);

        // the trailing count falls outside the requested range
        assert_eq!(calendar.available_dates.len(), 1);
        assert_eq!(calendar.available_dates[0].date, "2025-03-04");
        assert_eq!(calendar.available_dates[0].day_of_week, "Tuesday");
    }

    #[test]
    fn test_rate_selected_by_date_range() {
        let option = option(
            "NBOGTARP001CKSE",
            vec![
                twin(400_000, "2025-01-01", "2025-03-31"),
                twin(500_000, "2025-04-01", "2025-12-31"),
            ],
            vec![],
        );
        let calendar = build_calendar(&option, date("2025-03-31"), date("2025-04-01"));
        assert_eq!(calendar.days[0].rate.as_ref().unwrap().twin_rate, 400_000);
        assert_eq!(calendar.days[1].rate.as_ref().unwrap().twin_rate, 500_000);
        assert!(calendar.days.iter().all(|d| d.available));
    }

    #[test]
    fn test_departure_windows_limit_weekdays() {
        let mut option = option("NBOGTARP001CKSE", vec![Rate::price_on_application()], vec![]);
        option.departure_windows = vec![DepartureWindow {
            date_from: "2025-03-01".to_string(),
            date_to: "2025-03-31".to_string(),
            departure_days: vec!["Friday".to_string()],
        }];
        // 2025-03-07 is a Friday
        let calendar = build_calendar(&option, date("2025-03-06"), date("2025-03-08"));
        let available: Vec<bool> = calendar.days.iter().map(|d| d.available).collect();
        assert_eq!(available, vec![false, true, false]);
        assert_eq!(calendar.days[1].display_price, "POA");
    }

    #[test]
    fn test_rail_record_overrides_vendor_calendar() {
        let option = option("PRYRLROV001PRCPPM", vec![], vec![1, 1, 1, 1, 1, 1, 1]);
        let calendar = build_calendar(&option, date("2025-03-03"), date("2025-03-09"));
        let open: Vec<&str> = calendar
            .days
            .iter()
            .filter(|d| d.available)
            .map(|d| d.day_of_week.as_str())
            .collect();
        assert_eq!(open, vec!["Friday"]);
    }

    #[test_case("CPTRLROV001CTPRRO"; "rail without availability")]
    #[test_case("CPTRLROV999XXXXXX"; "unknown rail")]
    #[test_case("BBKCRTVT001ZAM2NS"; "cruise without availability")]
    fn test_quote_only_products(code: &str) {
        let option = option(code, vec![twin(400_000, "2025-01-01", "2025-12-31")], vec![1, 1]);
        let calendar = build_calendar(&option, date("2025-03-03"), date("2025-03-04"));
        assert!(calendar.quote_only);
        assert!(calendar.days.iter().all(|d| !d.available));
        assert!(calendar.available_dates.is_empty());
    }

    #[test]
    fn test_default_range_end() {
        let from = date("2025-01-31");
        assert_eq!(default_range_end("NBOGTARP001CKSE", from), date("2025-07-31"));
        assert_eq!(default_range_end("PRYRLROV001PRCPPM", from), date("2026-01-31"));
    }
}
