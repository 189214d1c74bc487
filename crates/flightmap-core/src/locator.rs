// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Finds the flight list inside a payload whose wrapper layout is not fixed.
//!
//! The producer of `flights.json` has shipped the list bare, under a `flights`
//! key and inside several levels of wrapper objects. Rather than pinning one
//! layout, the locator walks the document breadth-first and returns the first
//! array whose leading elements look like flights.

use serde_json::Value;
use std::collections::{HashSet, VecDeque};

/// Containers deeper than this are not visited.
pub const MAX_DEPTH: usize = 10;

/// Only the first elements of a candidate array are inspected.
pub const SAMPLE_SIZE: usize = 10;

/// Returns the flight array found in `payload`, or an empty slice.
///
/// Never fails: malformed or unrelated payloads simply yield no flights.
pub fn locate_flight_array(payload: &Value) -> &[Value] {
    if let Value::Array(items) = payload {
        if is_flight_like_array(items) {
            return items;
        }
    }

    let mut seen: HashSet<*const Value> = HashSet::new();
    let mut queue: VecDeque<(&Value, usize)> = VecDeque::new();
    queue.push_back((payload, 0));

    while let Some((value, depth)) = queue.pop_front() {
        if depth > MAX_DEPTH {
            continue;
        }
        if !matches!(value, Value::Object(_) | Value::Array(_)) {
            continue;
        }
        if !seen.insert(value as *const Value) {
            continue;
        }

        // Arrays directly under this node win over anything deeper.
        for child in children(value) {
            if let Value::Array(items) = child {
                if is_flight_like_array(items) {
                    return items;
                }
            }
        }

        for child in children(value) {
            if matches!(child, Value::Object(_) | Value::Array(_)) {
                queue.push_back((child, depth + 1));
            }
        }
    }

    log::debug!("No flight-like array found in payload");
    &[]
}

fn children(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Object(map) => Box::new(map.values()),
        Value::Array(items) => Box::new(items.iter()),
        _ => Box::new(std::iter::empty()),
    }
}

/// True when at least one of the first [`SAMPLE_SIZE`] elements is an object
/// with string `from` and `to` fields.
pub fn is_flight_like_array(items: &[Value]) -> bool {
    items.iter().take(SAMPLE_SIZE).any(is_flight_like)
}

fn is_flight_like(value: &Value) -> bool {
    match value.as_object() {
        Some(obj) => {
            obj.get("from").is_some_and(Value::is_string)
                && obj.get("to").is_some_and(Value::is_string)
        }
        None => false,
    }
}
