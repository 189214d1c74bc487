// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::geo::BoundingBox;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Heat,
    Route,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayerHandle(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerData {
    /// `(lat, lon, weight)` triples for a density layer.
    Heat(Vec<(f64, f64, f64)>),
    /// `(lat, lon)` vertices of one line.
    Polyline(Vec<(f64, f64)>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerStyle {
    Heat { radius: u32, blur: u32, max_zoom: u8 },
    Route { weight: f64, opacity: f64 },
}

/// The map toolkit surface driven by [`crate::view::ViewState`].
pub trait RenderAdapter {
    fn add_layer(&mut self, kind: LayerKind, data: LayerData, style: LayerStyle) -> LayerHandle;
    fn remove_layer(&mut self, handle: LayerHandle);
    fn set_viewport(&mut self, bounds: BoundingBox, padding: f64);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCall {
    Add {
        handle: LayerHandle,
        kind: LayerKind,
    },
    Remove {
        handle: LayerHandle,
    },
    Viewport {
        bounds: BoundingBox,
        padding: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachedLayer {
    pub handle: LayerHandle,
    pub kind: LayerKind,
    pub data: LayerData,
    pub style: LayerStyle,
}

/// In-memory adapter that records every call and tracks attached layers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordingAdapter {
    next_handle: u64,
    pub calls: Vec<RenderCall>,
    pub attached: Vec<AttachedLayer>,
    pub viewport: Option<(BoundingBox, f64)>,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached_of(&self, kind: LayerKind) -> impl Iterator<Item = &AttachedLayer> {
        self.attached.iter().filter(move |l| l.kind == kind)
    }

    pub fn count_of(&self, kind: LayerKind) -> usize {
        self.attached_of(kind).count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl RenderAdapter for RecordingAdapter {
    fn add_layer(&mut self, kind: LayerKind, data: LayerData, style: LayerStyle) -> LayerHandle {
        self.next_handle += 1;
        let handle = LayerHandle(self.next_handle);
        self.calls.push(RenderCall::Add { handle, kind });
        self.attached.push(AttachedLayer {
            handle,
            kind,
            data,
            style,
        });
        handle
    }

    fn remove_layer(&mut self, handle: LayerHandle) {
        self.calls.push(RenderCall::Remove { handle });
        self.attached.retain(|l| l.handle != handle);
    }

    fn set_viewport(&mut self, bounds: BoundingBox, padding: f64) {
        self.calls.push(RenderCall::Viewport { bounds, padding });
        self.viewport = Some((bounds, padding));
    }
}
