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

//! Areas of interest: a single Polygon or MultiPolygon drawn or imported by the user.

use std::path::Path;

use geojson::{Feature, Geometry, PolygonType, Value};
use log::{debug, warn};

use crate::bbox::BoundingBox;
use crate::json::{JsonObject, JsonValue};
use crate::{source, util, Error, GeometryType, Position};

/// A validated area of interest.
///
/// Construction guarantees the geometry is a Polygon or MultiPolygon with at least one
/// non-empty outer ring.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaOfInterest {
    geometry: Geometry,
    properties: Option<JsonObject>,
}

impl AreaOfInterest {
    /// Validate a raw GeoJSON value as an AOI Feature.
    pub fn from_json_value(value: &JsonValue) -> Result<Self, Error> {
        let object = util::expect_object(value).map_err(Error::InvalidAoi)?;
        let ty = util::expect_string(object, "type").map_err(Error::InvalidAoi)?;
        if ty != "Feature" {
            return Err(Error::InvalidAoi(format!("expected a Feature, found '{}'", ty)));
        }
        let geometry = util::expect_property(object, "geometry")
            .and_then(util::expect_object)
            .map_err(Error::InvalidAoi)?;
        let geometry_type = util::expect_geometry_type(geometry).map_err(Error::InvalidAoi)?;
        if !geometry_type.is_areal() {
            return Err(Error::InvalidAoi(format!(
                "geometry type is {}",
                geometry_type
            )));
        }
        let feature: Feature =
            serde_json::from_value(value.clone()).map_err(|e| Error::InvalidAoi(e.to_string()))?;
        AreaOfInterest::from_feature(feature)
    }

    pub fn from_feature(feature: Feature) -> Result<Self, Error> {
        let geometry = match feature.geometry {
            Some(g) => g,
            None => return Err(Error::InvalidAoi("missing 'geometry' member".to_owned())),
        };
        let geometry_type = GeometryType::of(&geometry.value);
        if !geometry_type.is_areal() {
            return Err(Error::InvalidAoi(format!(
                "geometry type is {}",
                geometry_type
            )));
        }
        let aoi = AreaOfInterest {
            geometry,
            properties: feature.properties,
        };
        match aoi.outer_ring() {
            Some(ring) if !ring.is_empty() => Ok(aoi),
            _ => Err(Error::InvalidAoi("polygon has no outer ring".to_owned())),
        }
    }

    /// Build an AOI out of polygons: one polygon stays a Polygon, more become a MultiPolygon.
    pub fn from_polygons(mut polygons: Vec<PolygonType>, name: &str) -> Result<Self, Error> {
        let value = match polygons.len() {
            0 => return Err(Error::InvalidAoi("no polygon given".to_owned())),
            1 => Value::Polygon(polygons.remove(0)),
            _ => Value::MultiPolygon(polygons),
        };
        AreaOfInterest::from_feature(named_feature(value, name))
    }

    /// Extract an AOI from a KML or KMZ file.
    ///
    /// Every polygon found in the document contributes; a document without polygons yields
    /// the bounding box of whatever geometry it holds.
    pub fn from_kml_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let ext = util::extension(path);
        if ext != ".kml" && ext != ".kmz" {
            return Err(Error::UnsupportedFormat(
                "Please select a .kml or .kmz file.".to_owned(),
            ));
        }
        let dataset = source::load(path)?;
        let mut polygons = Vec::new();
        let mut extent = BoundingBox::empty();
        for geometry in dataset.rows.iter().filter_map(|r| r.geometry.as_ref()) {
            collect_polygons(&geometry.value, &mut polygons);
            let bbox = BoundingBox::of_geometry(&geometry.value);
            if !bbox.is_empty() {
                extent.extend((bbox.min_x, bbox.min_y));
                extent.extend((bbox.max_x, bbox.max_y));
            }
        }
        debug!("{} polygon(s) found in {}", polygons.len(), path.display());
        if !polygons.is_empty() {
            return AreaOfInterest::from_polygons(polygons, "AOI from KML/KMZ");
        }
        if extent.is_empty() {
            return Err(Error::InvalidAoi(
                "No polygons or measurable geometry found.".to_owned(),
            ));
        }
        warn!(
            "no polygon in {}, using the bounding box of its geometry as AOI",
            path.display()
        );
        AreaOfInterest::from_feature(named_feature(
            Value::Polygon(vec![extent.to_ring()]),
            "AOI (bbox from KML/KMZ)",
        ))
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn geometry_type(&self) -> GeometryType {
        GeometryType::of(&self.geometry.value)
    }

    /// Outer ring of the (first) polygon.
    pub fn outer_ring(&self) -> Option<&[Position]> {
        match self.geometry.value {
            Value::Polygon(ref rings) => rings.first().map(|r| r.as_slice()),
            Value::MultiPolygon(ref polygons) => polygons
                .first()
                .and_then(|rings| rings.first())
                .map(|r| r.as_slice()),
            _ => None,
        }
    }

    pub fn to_feature(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(self.geometry.clone()),
            id: None,
            properties: self.properties.clone(),
            foreign_members: None,
        }
    }
}

fn named_feature(value: Value, name: &str) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_owned(), JsonValue::from(name));
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collect_polygons(value: &Value, polygons: &mut Vec<PolygonType>) {
    match *value {
        Value::Polygon(ref rings) => polygons.push(rings.clone()),
        Value::MultiPolygon(ref many) => polygons.extend(many.iter().cloned()),
        Value::GeometryCollection(ref geometries) => {
            for g in geometries {
                collect_polygons(&g.value, polygons);
            }
        }
        _ => {}
    }
}
