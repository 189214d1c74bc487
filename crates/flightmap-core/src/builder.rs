// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Generates the point and route snapshots from a flight log and an airport directory.

use crate::airports::AirportDirectory;
use crate::model::{AirportPoint, Route, Weight};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Trims and uppercases a code; accepted only when exactly three characters long.
pub fn normalize_iata(raw: &str) -> Option<String> {
    let code = raw.trim().to_uppercase();
    if code.chars().count() == 3 {
        Some(code)
    } else {
        None
    }
}

fn endpoint(flight: &Value, key: &str) -> Option<String> {
    match flight.get(key)? {
        Value::String(s) => normalize_iata(s),
        Value::Null => None,
        other => normalize_iata(&other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingAirport {
    pub iata: String,
    pub count: Weight,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PointsBuild {
    pub points: Vec<AirportPoint>,
    pub missing: Vec<MissingAirport>,
}

/// Counter that ranks keys by descending count, ties by first insertion.
#[derive(Default)]
struct Tally {
    order: Vec<String>,
    counts: HashMap<String, Weight>,
}

impl Tally {
    fn bump(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(c) => *c += 1,
            None => {
                self.order.push(key.to_string());
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    fn most_common(self) -> Vec<(String, Weight)> {
        let Tally { order, counts } = self;
        let mut ranked: Vec<(String, Weight)> = order
            .into_iter()
            .map(|k| {
                let c = counts.get(&k).copied().unwrap_or(0);
                (k, c)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

/// Counts departures and arrivals per airport.
///
/// Codes the directory knows (with coordinates) become points; the rest are
/// reported as missing.
pub fn build_points(flights: &[Value], airports: &AirportDirectory) -> PointsBuild {
    let mut known = Tally::default();
    let mut missing = Tally::default();

    for flight in flights.iter().filter(|f| f.is_object()) {
        for key in ["from", "to"] {
            let Some(code) = endpoint(flight, key) else {
                continue;
            };
            if airports.contains(&code) {
                known.bump(&code);
            } else {
                missing.bump(&code);
            }
        }
    }

    let points = known
        .most_common()
        .into_iter()
        .filter_map(|(iata, w)| {
            let (lat, lon) = airports.get(&iata)?.position()?;
            Some(AirportPoint { iata, lat, lon, w })
        })
        .collect();
    let missing = missing
        .most_common()
        .into_iter()
        .map(|(iata, count)| MissingAirport { iata, count })
        .collect();

    PointsBuild { points, missing }
}

/// Aggregates flights into one route per unordered airport pair.
///
/// Endpoint order follows the first flight seen for the pair. Flights with an
/// unknown endpoint, or departing and arriving at the same airport, are skipped.
pub fn build_routes(flights: &[Value], airports: &AirportDirectory) -> Vec<Route> {
    let mut routes: Vec<Route> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for flight in flights.iter().filter(|f| f.is_object()) {
        let (Some(from), Some(to)) = (endpoint(flight, "from"), endpoint(flight, "to")) else {
            continue;
        };
        if from == to {
            continue;
        }
        let (Some(a_pos), Some(b_pos)) = (
            airports.get(&from).and_then(|a| a.position()),
            airports.get(&to).and_then(|a| a.position()),
        ) else {
            continue;
        };

        let key = if from <= to {
            (from.clone(), to.clone())
        } else {
            (to.clone(), from.clone())
        };
        match index.get(&key) {
            Some(&i) => routes[i].w += 1,
            None => {
                index.insert(key, routes.len());
                routes.push(Route {
                    a: from,
                    b: to,
                    a_lat: a_pos.0,
                    a_lon: a_pos.1,
                    b_lat: b_pos.0,
                    b_lon: b_pos.1,
                    w: 1,
                });
            }
        }
    }

    log::info!("Built routes — flights={} routes={}", flights.len(), routes.len());
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airports::AirportInfo;
    use serde_json::json;

    fn directory() -> AirportDirectory {
        let mut dir = AirportDirectory::default();
        for (iata, country, lat, lon) in [
            ("VIE", "AT", 48.11, 16.57),
            ("FRA", "DE", 50.03, 8.57),
            ("LHR", "GB", 51.47, -0.45),
        ] {
            dir.0.insert(
                iata.to_string(),
                AirportInfo {
                    iata: Some(iata.to_string()),
                    country: Some(country.to_string()),
                    lat: Some(lat),
                    lon: Some(lon),
                    ..Default::default()
                },
            );
        }
        dir.0.insert("NOP".to_string(), AirportInfo::default());
        dir
    }

    #[test]
    fn test_normalize_iata() {
        assert_eq!(normalize_iata(" vie "), Some("VIE".to_string()));
        assert_eq!(normalize_iata("LOWW"), None);
        assert_eq!(normalize_iata(""), None);
    }

    #[test]
    fn test_build_points_counts_both_ends() {
        let flights = vec![
            json!({"from": "VIE", "to": "FRA"}),
            json!({"from": "fra", "to": "LHR"}),
            json!({"from": "LHR", "to": "VIE"}),
            json!({"from": "VIE", "to": "XYZ"}),
            json!({"from": "VIE", "to": null}),
            json!("not a flight"),
        ];
        let built = build_points(&flights, &directory());

        let summary: Vec<_> = built.points.iter().map(|p| (p.iata.as_str(), p.w)).collect();
        assert_eq!(summary, vec![("VIE", 4), ("FRA", 2), ("LHR", 2)]);
        assert_eq!(
            built.missing,
            vec![MissingAirport {
                iata: "XYZ".to_string(),
                count: 1
            }]
        );
    }

    #[test]
    fn test_build_points_skips_known_without_position() {
        let flights = vec![json!({"from": "NOP", "to": "VIE"})];
        let built = build_points(&flights, &directory());
        assert_eq!(built.points.len(), 1);
        assert!(built.missing.is_empty());
    }

    #[test]
    fn test_build_routes_merges_directions() {
        let flights = vec![
            json!({"from": "VIE", "to": "FRA"}),
            json!({"from": "FRA", "to": "VIE"}),
            json!({"from": "VIE", "to": "LHR"}),
            json!({"from": "VIE", "to": "VIE"}),
            json!({"from": "VIE", "to": "XYZ"}),
        ];
        let routes = build_routes(&flights, &directory());

        assert_eq!(routes.len(), 2);
        assert_eq!((routes[0].a.as_str(), routes[0].b.as_str(), routes[0].w), ("VIE", "FRA", 2));
        assert_eq!((routes[1].a.as_str(), routes[1].b.as_str(), routes[1].w), ("VIE", "LHR", 1));
        assert_eq!(routes[0].a_lat, 48.11);
        assert_eq!(routes[0].b_lon, 8.57);
    }
}
