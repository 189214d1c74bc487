// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::airports::AirportDirectory;
use crate::locator::locate_flight_array;
use crate::model::{ingest_points, ingest_routes, AirportPoint, RouteRecord};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to load {url}: HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("Failed to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// File names of the four snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotNames {
    pub points: String,
    pub airports: String,
    pub flights: String,
    pub routes: String,
}

impl Default for SnapshotNames {
    fn default() -> Self {
        Self {
            points: "flights_points.json".to_string(),
            airports: "airports.json".to_string(),
            flights: "flights.json".to_string(),
            routes: "flights_routes.json".to_string(),
        }
    }
}

/// Where snapshots are fetched from.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    Directory(PathBuf),
    Http {
        base_url: String,
        client: reqwest::blocking::Client,
    },
}

impl SnapshotSource {
    pub fn directory<P: AsRef<Path>>(path: P) -> Self {
        SnapshotSource::Directory(path.as_ref().to_path_buf())
    }

    pub fn http(base_url: &str) -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|source| LoadError::Http {
                url: base_url.to_string(),
                source,
            })?;
        Ok(SnapshotSource::Http {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn describe(&self) -> String {
        match self {
            SnapshotSource::Directory(dir) => dir.display().to_string(),
            SnapshotSource::Http { base_url, .. } => base_url.clone(),
        }
    }

    /// Fetches and parses one JSON snapshot.
    pub fn fetch_json(&self, name: &str) -> Result<Value, LoadError> {
        let bytes = match self {
            SnapshotSource::Directory(dir) => {
                let path = dir.join(name);
                std::fs::read(&path).map_err(|source| LoadError::Io { path, source })?
            }
            SnapshotSource::Http { base_url, client } => {
                let url = format!("{}/{}", base_url, name);
                let response = client.get(&url).send().map_err(|source| LoadError::Http {
                    url: url.clone(),
                    source,
                })?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        url,
                        status: status.as_u16(),
                    });
                }
                response
                    .bytes()
                    .map_err(|source| LoadError::Http { url, source })?
                    .to_vec()
            }
        };

        debug!("Fetched snapshot — name={} bytes={}", name, bytes.len());
        serde_json::from_slice(&bytes).map_err(|source| LoadError::Parse {
            name: name.to_string(),
            source,
        })
    }
}

/// The four snapshots of one viewing session, immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub points: Vec<AirportPoint>,
    pub airports: AirportDirectory,
    pub flights: Value,
    pub routes: Vec<RouteRecord>,
}

impl Dataset {
    /// Loads all four snapshots concurrently.
    ///
    /// Fails as a whole if any snapshot fails; the first failure in
    /// points/airports/flights/routes order is reported.
    pub fn load(source: &SnapshotSource, names: &SnapshotNames) -> Result<Self, LoadError> {
        info!("Loading snapshots — source={}", source.describe());

        let fetch = |name: &str| source.fetch_json(name);
        let ((points, airports), (flights, routes)) = rayon::join(
            || rayon::join(|| fetch(&names.points), || fetch(&names.airports)),
            || rayon::join(|| fetch(&names.flights), || fetch(&names.routes)),
        );
        let (points, airports, flights, routes) = (points?, airports?, flights?, routes?);

        Self::from_values(names, points, airports, flights, routes)
    }

    /// Ingests already-parsed snapshot values.
    pub fn from_values(
        names: &SnapshotNames,
        points: Value,
        airports: Value,
        flights: Value,
        routes: Value,
    ) -> Result<Self, LoadError> {
        let parse_err = |name: &str| {
            let name = name.to_string();
            move |source: serde_json::Error| LoadError::Parse { name, source }
        };

        let raw_points: Vec<Value> =
            serde_json::from_value(points).map_err(parse_err(&names.points))?;
        let airports: AirportDirectory =
            serde_json::from_value(airports).map_err(parse_err(&names.airports))?;
        let raw_routes: Vec<Value> =
            serde_json::from_value(routes).map_err(parse_err(&names.routes))?;

        let dataset = Self {
            points: ingest_points(&raw_points),
            airports,
            flights,
            routes: ingest_routes(&raw_routes),
        };

        info!(
            "Snapshots loaded — points={} airports={} flights={} routes={}",
            dataset.points.len(),
            dataset.airports.len(),
            dataset.flights().len(),
            dataset.routes.len()
        );
        Ok(dataset)
    }

    /// The located flight list (empty when the payload has none).
    pub fn flights(&self) -> &[Value] {
        locate_flight_array(&self.flights)
    }
}
