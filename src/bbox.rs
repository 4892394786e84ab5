// Copyright 2026 The geolayer Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bounding boxes over GeoJSON geometries.

use geojson::{FeatureCollection, Value};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Position;

/// Axis-aligned box `[minX, minY, maxX, maxY]` in WGS84 longitude/latitude.
///
/// A box that bounds nothing keeps its `(+∞, +∞, −∞, −∞)` starting values, so
/// `min_x > max_x` and [`BoundingBox::is_empty`] both tell it apart from a real
/// zero-area box around a single point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn empty() -> Self {
        BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn extend(&mut self, (x, y): (f64, f64)) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    pub fn of_geometry(value: &Value) -> Self {
        let mut bbox = BoundingBox::empty();
        for xy in coordinates(value) {
            bbox.extend(xy);
        }
        bbox
    }

    /// Box enclosing every coordinate of every feature; features without geometry
    /// contribute nothing.
    pub fn of_collection(collection: &FeatureCollection) -> Self {
        let mut bbox = BoundingBox::empty();
        for xy in collection
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .flat_map(|g| coordinates(&g.value))
        {
            bbox.extend(xy);
        }
        bbox
    }

    pub fn to_array(&self) -> Option<[f64; 4]> {
        if self.is_empty() {
            None
        } else {
            Some([self.min_x, self.min_y, self.max_x, self.max_y])
        }
    }

    /// Closed ring tracing the box counter-clockwise from its south-west corner.
    pub fn to_ring(&self) -> Vec<Position> {
        vec![
            vec![self.min_x, self.min_y],
            vec![self.max_x, self.min_y],
            vec![self.max_x, self.max_y],
            vec![self.min_x, self.max_y],
            vec![self.min_x, self.min_y],
        ]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::empty()
    }
}

// Serialized as `[minX, minY, maxX, maxY]`, or `null` when nothing was bounded.
impl Serialize for BoundingBox {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BoundingBox {
    fn deserialize<D>(deserializer: D) -> Result<BoundingBox, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<[f64; 4]>::deserialize(deserializer)? {
            Some([min_x, min_y, max_x, max_y]) => BoundingBox {
                min_x,
                min_y,
                max_x,
                max_y,
            },
            None => BoundingBox::empty(),
        })
    }
}

/// Lazily flatten a geometry into its `(x, y)` pairs, dropping any elevation.
///
/// Collections are walked child by child; positions with fewer than two values are
/// skipped rather than reported.
pub fn coordinates(value: &Value) -> Box<dyn Iterator<Item = (f64, f64)> + '_> {
    match *value {
        Value::Point(ref pos) => Box::new(xy(pos).into_iter()),
        Value::MultiPoint(ref line) | Value::LineString(ref line) => {
            Box::new(line.iter().filter_map(xy))
        }
        Value::MultiLineString(ref lines) | Value::Polygon(ref lines) => {
            Box::new(lines.iter().flatten().filter_map(xy))
        }
        Value::MultiPolygon(ref polygons) => {
            Box::new(polygons.iter().flatten().flatten().filter_map(xy))
        }
        Value::GeometryCollection(ref geometries) => {
            Box::new(geometries.iter().flat_map(|g| coordinates(&g.value)))
        }
    }
}

/// A geometry is empty when no coordinate pair can be reached from it.
pub fn is_empty_geometry(value: &Value) -> bool {
    coordinates(value).next().is_none()
}

fn xy(pos: &Position) -> Option<(f64, f64)> {
    match pos.as_slice() {
        [x, y, ..] => Some((*x, *y)),
        _ => None,
    }
}
