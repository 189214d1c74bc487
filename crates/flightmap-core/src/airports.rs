// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::snapshot::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Country bucket for airports the directory cannot resolve.
pub const UNKNOWN_COUNTRY: &str = "??";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirportInfo {
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl AirportInfo {
    /// The country code, or [`UNKNOWN_COUNTRY`] when absent or empty.
    pub fn country_code(&self) -> &str {
        match self.country.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => UNKNOWN_COUNTRY,
        }
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Read-only `iata -> AirportInfo` lookup, ordered by code for stable output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AirportDirectory(pub BTreeMap<String, AirportInfo>);

impl AirportDirectory {
    pub fn get(&self, iata: &str) -> Option<&AirportInfo> {
        self.0.get(iata)
    }

    pub fn contains(&self, iata: &str) -> bool {
        self.0.contains_key(iata)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves the country for an airport code, falling back to [`UNKNOWN_COUNTRY`].
    pub fn country_of(&self, iata: &str) -> &str {
        self.get(iata)
            .map(AirportInfo::country_code)
            .unwrap_or(UNKNOWN_COUNTRY)
    }

    pub fn parse_ourairports_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ourairports_csv(file)
    }

    /// Builds a directory from an OurAirports `airports.csv` export.
    ///
    /// Only rows with a three-letter IATA code and parseable coordinates are kept.
    pub fn from_ourairports_csv<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let mut airports = BTreeMap::new();
        let mut skipped = 0usize;

        for row in rdr.deserialize::<OurAirportsRow>() {
            let row = row?;
            let Some(iata) = crate::builder::normalize_iata(&row.iata_code) else {
                skipped += 1;
                continue;
            };
            let (Some(lat), Some(lon)) = (to_float(&row.latitude_deg), to_float(&row.longitude_deg))
            else {
                skipped += 1;
                continue;
            };

            airports.insert(
                iata.clone(),
                AirportInfo {
                    iata: Some(iata),
                    icao: non_empty(&row.ident).map(|s| s.to_uppercase()),
                    name: non_empty(&row.name),
                    city: non_empty(&row.municipality),
                    country: non_empty(&row.iso_country).map(|s| s.to_uppercase()),
                    lat: Some(lat),
                    lon: Some(lon),
                },
            );
        }

        log::info!(
            "Parsed OurAirports CSV — airports={} skipped={}",
            airports.len(),
            skipped
        );
        Ok(Self(airports))
    }
}

#[derive(Debug, Deserialize)]
struct OurAirportsRow {
    #[serde(default)]
    ident: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    latitude_deg: String,
    #[serde(default)]
    longitude_deg: String,
    #[serde(default)]
    iso_country: String,
    #[serde(default)]
    municipality: String,
    #[serde(default)]
    iata_code: String,
}

fn to_float(v: &str) -> Option<f64> {
    v.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

fn non_empty(v: &str) -> Option<String> {
    let v = v.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_ourairports() {
        let data = "\
id,ident,type,name,latitude_deg,longitude_deg,elevation_ft,continent,iso_country,iso_region,municipality,scheduled_service,gps_code,iata_code,local_code
2,LOWW,large_airport,Vienna International Airport,48.110298,16.5697,600,EU,AT,AT-9,Vienna,yes,LOWW,vie,
3,EDDF,large_airport,Frankfurt am Main Airport,50.033333,8.570556,364,EU,DE,DE-HE,Frankfurt,yes,EDDF,FRA,
4,XX01,heliport,No Code Pad,10.0,10.0,0,EU,DE,DE-HE,,no,,,
5,XX02,small_airport,Bad Coords,,8.5,0,EU,DE,DE-HE,,no,,ABC,
6,XX03,small_airport,Long Code,1.0,1.0,0,EU,,,,no,,ABCD,
7,XX04,small_airport,Nowhere,1.0,2.0,0,EU,,,,no,,NOW,
";
        let dir = AirportDirectory::from_ourairports_csv(Cursor::new(data)).unwrap();

        assert_eq!(dir.len(), 3);
        let vie = dir.get("VIE").unwrap();
        assert_eq!(vie.country.as_deref(), Some("AT"));
        assert_eq!(vie.icao.as_deref(), Some("LOWW"));
        assert_eq!(vie.city.as_deref(), Some("Vienna"));
        assert_eq!(vie.position(), Some((48.110298, 16.5697)));

        assert!(!dir.contains("ABC"));
        assert!(!dir.contains("ABCD"));
        assert_eq!(dir.country_of("NOW"), UNKNOWN_COUNTRY);

        let keys: Vec<_> = dir.0.keys().cloned().collect();
        assert_eq!(keys, vec!["FRA", "NOW", "VIE"]);
    }

    #[test]
    fn test_country_fallbacks() {
        let dir: AirportDirectory = serde_json::from_str(
            r#"{
                "VIE": {"country": "AT", "lat": 48.1, "lon": 16.5},
                "EMP": {"country": ""},
                "NUL": {"country": null},
                "BAR": {}
            }"#,
        )
        .unwrap();

        assert_eq!(dir.country_of("VIE"), "AT");
        assert_eq!(dir.country_of("EMP"), UNKNOWN_COUNTRY);
        assert_eq!(dir.country_of("NUL"), UNKNOWN_COUNTRY);
        assert_eq!(dir.country_of("BAR"), UNKNOWN_COUNTRY);
        assert_eq!(dir.country_of("XXX"), UNKNOWN_COUNTRY);
    }
}
