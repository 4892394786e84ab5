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

use std::fmt;

use geojson::Value;

/// The geometry type taxonomy shared by ingestion and export
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryType {
    /// Point
    ///
    /// [GeoJSON Format Specification § 3.1.2](https://tools.ietf.org/html/rfc7946#section-3.1.2)
    Point,

    /// MultiPoint
    ///
    /// [GeoJSON Format Specification § 3.1.3](https://tools.ietf.org/html/rfc7946#section-3.1.3)
    MultiPoint,

    /// LineString
    ///
    /// [GeoJSON Format Specification § 3.1.4](https://tools.ietf.org/html/rfc7946#section-3.1.4)
    LineString,

    /// MultiLineString
    ///
    /// [GeoJSON Format Specification § 3.1.5](https://tools.ietf.org/html/rfc7946#section-3.1.5)
    MultiLineString,

    /// Polygon
    ///
    /// [GeoJSON Format Specification § 3.1.6](https://tools.ietf.org/html/rfc7946#section-3.1.6)
    Polygon,

    /// MultiPolygon
    ///
    /// [GeoJSON Format Specification § 3.1.7](https://tools.ietf.org/html/rfc7946#section-3.1.7)
    MultiPolygon,

    /// GeometryCollection
    ///
    /// [GeoJSON Format Specification § 3.1.8](https://tools.ietf.org/html/rfc7946#section-3.1.8)
    GeometryCollection,
}

impl GeometryType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Point" => Some(GeometryType::Point),
            "MultiPoint" => Some(GeometryType::MultiPoint),
            "LineString" => Some(GeometryType::LineString),
            "MultiLineString" => Some(GeometryType::MultiLineString),
            "Polygon" => Some(GeometryType::Polygon),
            "MultiPolygon" => Some(GeometryType::MultiPolygon),
            "GeometryCollection" => Some(GeometryType::GeometryCollection),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::LineString => "LineString",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::GeometryCollection => "GeometryCollection",
        }
    }

    pub fn of(value: &Value) -> Self {
        match *value {
            Value::Point(..) => GeometryType::Point,
            Value::MultiPoint(..) => GeometryType::MultiPoint,
            Value::LineString(..) => GeometryType::LineString,
            Value::MultiLineString(..) => GeometryType::MultiLineString,
            Value::Polygon(..) => GeometryType::Polygon,
            Value::MultiPolygon(..) => GeometryType::MultiPolygon,
            Value::GeometryCollection(..) => GeometryType::GeometryCollection,
        }
    }

    /// Only areal geometries can serve as an area of interest.
    pub fn is_areal(self) -> bool {
        matches!(self, GeometryType::Polygon | GeometryType::MultiPolygon)
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
