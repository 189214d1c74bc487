// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::aggregate::top_n;
use crate::geo::BoundingBox;
use crate::model::{AirportPoint, RouteRecord, Weight};
use crate::render::{LayerData, LayerHandle, LayerKind, LayerStyle, RenderAdapter};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ViewError {
    #[error("Unknown view parameter: {0}")]
    UnknownParameter(String),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
    #[error("Value out of range for {name}: {value}")]
    OutOfRange { name: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Airports,
    Routes,
    #[default]
    Combined,
}

impl ViewMode {
    pub fn heat_visible(self) -> bool {
        matches!(self, ViewMode::Airports | ViewMode::Combined)
    }

    pub fn routes_visible(self) -> bool {
        matches!(self, ViewMode::Routes | ViewMode::Combined)
    }
}

impl FromStr for ViewMode {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "airports" => Ok(ViewMode::Airports),
            "routes" => Ok(ViewMode::Routes),
            "combined" => Ok(ViewMode::Combined),
            _ => Err(ViewError::InvalidValue {
                name: "mode".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViewMode::Airports => "airports",
            ViewMode::Routes => "routes",
            ViewMode::Combined => "combined",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewParameters {
    pub radius: u32,
    pub blur: u32,
    #[serde(alias = "max_routes")]
    pub max_routes: usize,
    #[serde(alias = "route_strength")]
    pub route_strength: f64,
    #[serde(alias = "viewMode")]
    pub mode: ViewMode,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            radius: 25,
            blur: 15,
            max_routes: 200,
            route_strength: 1.0,
            mode: ViewMode::Combined,
        }
    }
}

impl ViewParameters {
    pub fn validate(&self) -> Result<(), ViewError> {
        check_positive("radius", self.radius)?;
        check_positive("blur", self.blur)?;
        check_strength(self.route_strength)
    }
}

fn check_positive(name: &str, v: u32) -> Result<(), ViewError> {
    if v == 0 {
        return Err(ViewError::OutOfRange {
            name: name.to_string(),
            value: v.to_string(),
        });
    }
    Ok(())
}

fn check_strength(v: f64) -> Result<(), ViewError> {
    if !v.is_finite() || v <= 0.0 {
        return Err(ViewError::OutOfRange {
            name: "routeStrength".to_string(),
            value: v.to_string(),
        });
    }
    Ok(())
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> Result<T, ViewError> {
    value.trim().parse::<T>().map_err(|_| ViewError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Extra rendering knobs that are not user-adjustable at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub heat_max_zoom: u8,
    pub viewport_padding: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            heat_max_zoom: 6,
            viewport_padding: 0.2,
        }
    }
}

pub const MIN_LINE_WEIGHT: f64 = 0.5;
pub const MAX_LINE_WEIGHT: f64 = 20.0;

fn share(w: Weight, max_w: Weight) -> f64 {
    if max_w == 0 {
        0.0
    } else {
        w as f64 / max_w as f64
    }
}

/// Stroke width for a route relative to the heaviest displayed route.
pub fn route_line_weight(w: Weight, max_w: Weight, strength: f64) -> f64 {
    let base = (1.0 + 6.0 * share(w, max_w).sqrt()).clamp(1.0, 7.0);
    (base * strength).clamp(MIN_LINE_WEIGHT, MAX_LINE_WEIGHT)
}

pub fn route_line_opacity(w: Weight, max_w: Weight) -> f64 {
    (0.15 + 0.75 * share(w, max_w)).clamp(0.15, 0.9)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLine {
    pub label: String,
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub w: Weight,
    pub weight: f64,
    pub opacity: f64,
}

/// Ranks routes by weight, keeps the first `max_routes` and styles them
/// against the heaviest route in that slice.
pub fn derive_route_lines(routes: &[RouteRecord], max_routes: usize, strength: f64) -> Vec<RouteLine> {
    let slice = top_n(routes, |r| r.w(), max_routes);
    let max_w = slice.iter().map(|r| r.w()).max().unwrap_or(0);

    slice
        .into_iter()
        .map(|r| RouteLine {
            label: r.label(),
            from: (r.route.a_lat, r.route.a_lon),
            to: (r.route.b_lat, r.route.b_lon),
            w: r.w(),
            weight: route_line_weight(r.w(), max_w, strength),
            opacity: route_line_opacity(r.w(), max_w),
        })
        .collect()
}

/// Owns the view parameters and keeps the adapter's layers in sync with them.
///
/// Every mutating call returns only after the attached layers are rebuilt.
pub struct ViewState<A: RenderAdapter> {
    params: ViewParameters,
    options: RenderOptions,
    heat_points: Vec<(f64, f64, f64)>,
    routes: Vec<RouteRecord>,
    route_lines: Vec<RouteLine>,
    heat_layer: Option<LayerHandle>,
    route_layers: Option<Vec<LayerHandle>>,
    adapter: A,
}

impl<A: RenderAdapter> ViewState<A> {
    /// Fits the viewport to the airport points and attaches the layers for `params.mode`.
    pub fn new(
        points: &[AirportPoint],
        routes: Vec<RouteRecord>,
        params: ViewParameters,
        options: RenderOptions,
        adapter: A,
    ) -> Result<Self, ViewError> {
        params.validate()?;

        let heat_points = points.iter().map(|p| (p.lat, p.lon, p.w as f64)).collect();
        let route_lines = derive_route_lines(&routes, params.max_routes, params.route_strength);

        let mut state = Self {
            params,
            options,
            heat_points,
            routes,
            route_lines,
            heat_layer: None,
            route_layers: None,
            adapter,
        };

        if let Some(bounds) = BoundingBox::enclosing(points.iter().map(|p| (p.lat, p.lon))) {
            let padding = state.options.viewport_padding;
            state.adapter.set_viewport(bounds, padding);
        }
        state.sync_mode();
        Ok(state)
    }

    pub fn params(&self) -> &ViewParameters {
        &self.params
    }

    pub fn route_lines(&self) -> &[RouteLine] {
        &self.route_lines
    }

    pub fn heat_attached(&self) -> bool {
        self.heat_layer.is_some()
    }

    pub fn routes_attached(&self) -> bool {
        self.route_layers.is_some()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    /// Applies a parameter edit delivered as text (slider/select input).
    pub fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), ViewError> {
        match name {
            "radius" => self.set_radius(parse_value(name, value)?),
            "blur" => self.set_blur(parse_value(name, value)?),
            "maxRoutes" | "max_routes" => {
                self.set_max_routes(parse_value(name, value)?);
                Ok(())
            }
            "routeStrength" | "route_strength" => self.set_route_strength(parse_value(name, value)?),
            "mode" | "viewMode" => {
                self.set_mode(value.parse()?);
                Ok(())
            }
            _ => Err(ViewError::UnknownParameter(name.to_string())),
        }
    }

    pub fn set_radius(&mut self, radius: u32) -> Result<(), ViewError> {
        check_positive("radius", radius)?;
        self.params.radius = radius;
        self.rebuild_heat();
        Ok(())
    }

    pub fn set_blur(&mut self, blur: u32) -> Result<(), ViewError> {
        check_positive("blur", blur)?;
        self.params.blur = blur;
        self.rebuild_heat();
        Ok(())
    }

    pub fn set_max_routes(&mut self, max_routes: usize) {
        self.params.max_routes = max_routes;
        self.rebuild_routes();
    }

    pub fn set_route_strength(&mut self, strength: f64) -> Result<(), ViewError> {
        check_strength(strength)?;
        self.params.route_strength = strength;
        self.rebuild_routes();
        Ok(())
    }

    /// Toggles layer attachment only; derived route lines are reused as-is.
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.params.mode = mode;
        self.sync_mode();
    }

    /// Rebuilds every derived table and every visible layer from scratch.
    pub fn recompute(&mut self) {
        self.route_lines =
            derive_route_lines(&self.routes, self.params.max_routes, self.params.route_strength);
        self.detach_heat();
        self.detach_routes();
        self.sync_mode();
    }

    fn sync_mode(&mut self) {
        let mode = self.params.mode;
        match (mode.heat_visible(), self.heat_layer.is_some()) {
            (true, false) => self.attach_heat(),
            (false, true) => self.detach_heat(),
            _ => {}
        }
        match (mode.routes_visible(), self.route_layers.is_some()) {
            (true, false) => self.attach_routes(),
            (false, true) => self.detach_routes(),
            _ => {}
        }
    }

    fn rebuild_heat(&mut self) {
        if self.heat_layer.is_some() {
            self.detach_heat();
            self.attach_heat();
        }
    }

    fn rebuild_routes(&mut self) {
        self.route_lines =
            derive_route_lines(&self.routes, self.params.max_routes, self.params.route_strength);
        if self.route_layers.is_some() {
            self.detach_routes();
            self.attach_routes();
        }
    }

    fn attach_heat(&mut self) {
        let style = LayerStyle::Heat {
            radius: self.params.radius,
            blur: self.params.blur,
            max_zoom: self.options.heat_max_zoom,
        };
        let handle = self.adapter.add_layer(
            LayerKind::Heat,
            LayerData::Heat(self.heat_points.clone()),
            style,
        );
        debug!(
            "Heat layer attached — radius={} blur={} points={}",
            self.params.radius,
            self.params.blur,
            self.heat_points.len()
        );
        self.heat_layer = Some(handle);
    }

    fn detach_heat(&mut self) {
        if let Some(handle) = self.heat_layer.take() {
            self.adapter.remove_layer(handle);
        }
    }

    fn attach_routes(&mut self) {
        let mut handles = Vec::with_capacity(self.route_lines.len());
        for line in &self.route_lines {
            let handle = self.adapter.add_layer(
                LayerKind::Route,
                LayerData::Polyline(vec![line.from, line.to]),
                LayerStyle::Route {
                    weight: line.weight,
                    opacity: line.opacity,
                },
            );
            handles.push(handle);
        }
        debug!(
            "Route layer attached — lines={} max_routes={} strength={}",
            handles.len(),
            self.params.max_routes,
            self.params.route_strength
        );
        self.route_layers = Some(handles);
    }

    fn detach_routes(&mut self) {
        if let Some(handles) = self.route_layers.take() {
            for handle in handles {
                self.adapter.remove_layer(handle);
            }
        }
    }
}
