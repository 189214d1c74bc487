// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::geo;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Observed frequency count (airport visits or route traversals).
pub type Weight = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportPoint {
    pub iata: String,
    pub lat: f64,
    pub lon: f64,
    pub w: Weight,
}

/// A segment between two airports as stored in `flights_routes.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub a: String,
    pub b: String,
    pub a_lat: f64,
    pub a_lon: f64,
    pub b_lat: f64,
    pub b_lon: f64,
    pub w: Weight,
}

impl Route {
    pub fn label(&self) -> String {
        format!("{}–{}", self.a, self.b)
    }
}

/// A route with its great-circle length computed once at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRecord {
    #[serde(flatten)]
    pub route: Route,
    km: f64,
}

impl RouteRecord {
    pub fn new(route: Route) -> Self {
        let km = geo::distance_km(route.a_lat, route.a_lon, route.b_lat, route.b_lon);
        Self { route, km }
    }

    pub fn km(&self) -> f64 {
        self.km
    }

    pub fn w(&self) -> Weight {
        self.route.w
    }

    pub fn label(&self) -> String {
        self.route.label()
    }
}

/// Minimal view of a located flight entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightRecord<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub date: Option<&'a str>,
}

impl<'a> FlightRecord<'a> {
    /// Reads `from`/`to` (and optionally `date`) string fields; `None` for anything else.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        let obj = value.as_object()?;
        let from = obj.get("from")?.as_str()?;
        let to = obj.get("to")?.as_str()?;
        let date = obj.get("date").and_then(Value::as_str);
        Some(Self { from, to, date })
    }
}

/// Applies the ingestion policy to a raw weight.
///
/// Returns `None` when the value is missing, not numeric, non-finite,
/// negative or too large for a `Weight`; callers record those as zero.
/// Fractions are truncated.
pub fn sanitize_weight(raw: Option<&Value>) -> Option<Weight> {
    match raw? {
        Value::Number(n) => {
            if let Some(w) = n.as_u64() {
                return Some(w);
            }
            n.as_f64().and_then(weight_from_f64)
        }
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(weight_from_f64),
        _ => None,
    }
}

fn weight_from_f64(v: f64) -> Option<Weight> {
    if v.is_finite() && v >= 0.0 && v < Weight::MAX as f64 {
        Some(v.trunc() as Weight)
    } else {
        None
    }
}

fn finite_f64(raw: Option<&Value>) -> Option<f64> {
    let v = match raw? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn code(raw: Option<&Value>) -> Option<String> {
    let s = raw?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn weight_or_zero(raw: Option<&Value>, what: &str, key: &str, zeroed: &mut usize) -> Weight {
    match sanitize_weight(raw) {
        Some(w) => w,
        None => {
            *zeroed += 1;
            warn!(
                "Invalid weight zeroed — {}={} raw={}",
                what,
                key,
                raw.map(Value::to_string).unwrap_or_else(|| "<missing>".to_string())
            );
            0
        }
    }
}

/// Reads airport points leniently. Records without an `iata` code or finite
/// coordinates are skipped.
pub fn ingest_points(values: &[Value]) -> Vec<AirportPoint> {
    let mut points = Vec::with_capacity(values.len());
    let mut zeroed = 0usize;

    for value in values {
        let obj = match value.as_object() {
            Some(o) => o,
            None => {
                warn!("Skipping non-object airport point — raw={}", value);
                continue;
            }
        };
        let (iata, lat, lon) = match (
            code(obj.get("iata")),
            finite_f64(obj.get("lat")),
            finite_f64(obj.get("lon")),
        ) {
            (Some(iata), Some(lat), Some(lon)) => (iata, lat, lon),
            _ => {
                warn!("Skipping airport point without iata/coordinates — raw={}", value);
                continue;
            }
        };
        let w = weight_or_zero(obj.get("w"), "iata", &iata, &mut zeroed);
        points.push(AirportPoint { iata, lat, lon, w });
    }

    log::debug!(
        "Ingested airport points — kept={} skipped={} zeroed={}",
        points.len(),
        values.len() - points.len(),
        zeroed
    );
    points
}

/// Reads route records leniently and computes each route's distance once.
pub fn ingest_routes(values: &[Value]) -> Vec<RouteRecord> {
    let mut routes = Vec::with_capacity(values.len());
    let mut zeroed = 0usize;

    for value in values {
        let Some(obj) = value.as_object() else {
            warn!("Skipping non-object route — raw={}", value);
            continue;
        };
        let parsed = (|| {
            Some((
                code(obj.get("a"))?,
                code(obj.get("b"))?,
                finite_f64(obj.get("a_lat"))?,
                finite_f64(obj.get("a_lon"))?,
                finite_f64(obj.get("b_lat"))?,
                finite_f64(obj.get("b_lon"))?,
            ))
        })();
        let Some((a, b, a_lat, a_lon, b_lat, b_lon)) = parsed else {
            warn!("Skipping route without endpoints/coordinates — raw={}", value);
            continue;
        };
        let label = format!("{}–{}", a, b);
        let w = weight_or_zero(obj.get("w"), "route", &label, &mut zeroed);
        routes.push(Route {
            a,
            b,
            a_lat,
            a_lon,
            b_lat,
            b_lon,
            w,
        });
    }

    log::debug!(
        "Ingested routes — kept={} skipped={} zeroed={}",
        routes.len(),
        values.len() - routes.len(),
        zeroed
    );
    compute_route_distances(routes)
}

/// Attaches the cached great-circle distance to every route.
pub fn compute_route_distances(routes: Vec<Route>) -> Vec<RouteRecord> {
    routes.into_iter().map(RouteRecord::new).collect()
}
