// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod aggregate;
pub mod airports;
pub mod builder;
pub mod config;
pub mod geo;
pub mod locator;
pub mod model;
pub mod render;
pub mod report;
pub mod snapshot;
pub mod view;

pub use airports::{AirportDirectory, AirportInfo, UNKNOWN_COUNTRY};
pub use config::FlightmapConfig;
pub use model::{AirportPoint, FlightRecord, Route, RouteRecord, Weight};
pub use snapshot::{Dataset, LoadError, SnapshotNames, SnapshotSource};
pub use view::{ViewError, ViewMode, ViewParameters, ViewState};
