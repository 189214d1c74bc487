// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::aggregate::{aggregate_countries, longest_route, top_n, total_weighted_distance, LongestRoute};
use crate::model::{FlightRecord, Weight};
use crate::snapshot::Dataset;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Locale used for displayed integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NumberLocale {
    #[default]
    #[serde(rename = "de-AT")]
    DeAt,
    #[serde(rename = "en")]
    En,
}

impl NumberLocale {
    pub fn thousands_separator(self) -> char {
        match self {
            NumberLocale::DeAt => '.',
            NumberLocale::En => ',',
        }
    }
}

/// Formats an integer with a thousands separator, e.g. `12345` -> `12.345`.
pub fn format_int(n: u64, separator: char) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Rounds a distance to whole kilometres for display.
pub fn format_km(km: f64, separator: char) -> String {
    let rounded = if km.is_finite() && km > 0.0 { km.round() as u64 } else { 0 };
    format!("{} km", format_int(rounded, separator))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub label: String,
    pub value: Weight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub segments: usize,
    pub airports: usize,
    pub countries: usize,
    pub total_km: f64,
    pub longest: LongestRoute,
    pub first_flight: Option<NaiveDate>,
    pub last_flight: Option<NaiveDate>,
    pub top_airports: Vec<TableRow>,
    pub top_countries: Vec<TableRow>,
    pub top_routes: Vec<TableRow>,
}

impl Report {
    pub fn compute(dataset: &Dataset, top: usize) -> Self {
        let flights = dataset.flights();
        let countries = aggregate_countries(&dataset.points, &dataset.airports);

        let (first_flight, last_flight) = date_span(flights);

        let top_airports = top_n(&dataset.points, |p| p.w, top)
            .into_iter()
            .map(|p| TableRow {
                label: p.iata.clone(),
                value: p.w,
            })
            .collect();
        let top_countries = top_n(countries.entries(), |c| c.1, top)
            .into_iter()
            .map(|(country, w)| TableRow {
                label: country.clone(),
                value: *w,
            })
            .collect();
        let top_routes = top_n(&dataset.routes, |r| r.w(), top)
            .into_iter()
            .map(|r| TableRow {
                label: r.label(),
                value: r.w(),
            })
            .collect();

        Self {
            segments: flights.len(),
            airports: dataset.points.len(),
            countries: countries.len(),
            total_km: total_weighted_distance(&dataset.routes),
            longest: longest_route(&dataset.routes),
            first_flight,
            last_flight,
            top_airports,
            top_countries,
            top_routes,
        }
    }

    /// KPI labels with display-formatted values.
    pub fn kpis(&self, locale: NumberLocale) -> Vec<(&'static str, String)> {
        let sep = locale.thousands_separator();
        let longest = match &self.longest {
            LongestRoute::Route { label, km } => format!("{} ({})", label, format_km(*km, sep)),
            LongestRoute::NoData => "no data".to_string(),
        };
        let date = |d: Option<NaiveDate>| match (d, locale) {
            (Some(d), NumberLocale::DeAt) => d.format("%d.%m.%Y").to_string(),
            (Some(d), NumberLocale::En) => d.format("%Y-%m-%d").to_string(),
            (None, _) => "–".to_string(),
        };

        vec![
            ("Segments", format_int(self.segments as u64, sep)),
            ("Airports", format_int(self.airports as u64, sep)),
            ("Countries", format_int(self.countries as u64, sep)),
            ("Total distance", format_km(self.total_km, sep)),
            ("Longest route", longest),
            ("First flight", date(self.first_flight)),
            ("Last flight", date(self.last_flight)),
        ]
    }
}

/// Earliest and latest `YYYY-MM-DD` date among the flights; others are ignored.
pub fn date_span(flights: &[serde_json::Value]) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let dates = flights
        .iter()
        .filter_map(FlightRecord::from_value)
        .filter_map(|f| f.date)
        .filter_map(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());

    let mut first: Option<NaiveDate> = None;
    let mut last: Option<NaiveDate> = None;
    for d in dates {
        first = Some(first.map_or(d, |f| f.min(d)));
        last = Some(last.map_or(d, |l| l.max(d)));
    }
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_int() {
        assert_eq!(format_int(0, '.'), "0");
        assert_eq!(format_int(999, '.'), "999");
        assert_eq!(format_int(1000, '.'), "1.000");
        assert_eq!(format_int(1234567, ','), "1,234,567");
        assert_eq!(format_int(100000, '.'), "100.000");
    }

    #[test]
    fn test_format_km_rounds() {
        assert_eq!(format_km(12345.6, '.'), "12.346 km");
        assert_eq!(format_km(0.0, '.'), "0 km");
        assert_eq!(format_km(f64::NAN, '.'), "0 km");
    }

    #[test]
    fn test_date_span_ignores_bad_dates() {
        let flights = vec![
            json!({"from": "VIE", "to": "FRA", "date": "2024-03-01"}),
            json!({"from": "FRA", "to": "VIE", "date": "01.02.2024"}),
            json!({"from": "VIE", "to": "LHR", "date": "2023-11-20"}),
            json!({"from": "LHR", "to": "VIE"}),
        ];
        let (first, last) = date_span(&flights);
        assert_eq!(first, NaiveDate::from_ymd_opt(2023, 11, 20));
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 3, 1));

        assert_eq!(date_span(&[]), (None, None));
    }
}
