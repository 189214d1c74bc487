// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::airports::AirportDirectory;
use crate::model::{AirportPoint, RouteRecord, Weight};
use serde::Serialize;
use std::collections::HashMap;

/// Per-country weight totals, kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CountryWeights {
    entries: Vec<(String, Weight)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CountryWeights {
    pub fn add(&mut self, country: &str, w: Weight) {
        match self.index.get(country) {
            Some(&i) => self.entries[i].1 = self.entries[i].1.saturating_add(w),
            None => {
                self.index.insert(country.to_string(), self.entries.len());
                self.entries.push((country.to_string(), w));
            }
        }
    }

    pub fn get(&self, country: &str) -> Option<Weight> {
        self.index.get(country).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> Weight {
        self.entries
            .iter()
            .fold(0, |acc: Weight, (_, w)| acc.saturating_add(*w))
    }

    pub fn entries(&self) -> &[(String, Weight)] {
        &self.entries
    }
}

/// Sums point weights per resolved country. Unresolved airports land in `"??"`.
pub fn aggregate_countries(points: &[AirportPoint], airports: &AirportDirectory) -> CountryWeights {
    let mut totals = CountryWeights::default();
    for p in points {
        totals.add(airports.country_of(&p.iata), p.w);
    }
    totals
}

/// Sum of `km * w` over all routes.
pub fn total_weighted_distance(routes: &[RouteRecord]) -> f64 {
    routes.iter().map(|r| r.km() * r.w() as f64).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LongestRoute {
    NoData,
    Route { label: String, km: f64 },
}

/// The route with the greatest distance; the earliest one wins a tie.
pub fn longest_route(routes: &[RouteRecord]) -> LongestRoute {
    let mut best: Option<&RouteRecord> = None;
    for r in routes {
        if best.map_or(true, |b| r.km() > b.km()) {
            best = Some(r);
        }
    }
    match best {
        Some(r) => LongestRoute::Route {
            label: r.label(),
            km: r.km(),
        },
        None => LongestRoute::NoData,
    }
}

/// Descending sort by `key`, truncated to `n` (clamped to the collection size).
///
/// The sort is stable, so equal keys keep their order in `items`.
pub fn top_n<T, K, F>(items: &[T], key: F, n: usize) -> Vec<&T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by(|a, b| key(b).cmp(&key(a)));
    ranked.truncate(n.min(items.len()));
    ranked
}
