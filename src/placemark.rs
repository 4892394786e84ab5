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

//! Conversion of styled GeoJSON geometries into KML placemarks.
//!
//! KML placemarks built here are deliberately simple: Multi geometries keep only their first
//! component and polygons keep only their outer ring. Everything dropped is counted in the
//! [`EncodeReport`].

use geojson::{Geometry, Value};
use log::{debug, warn};

use crate::color::abgr_hex;
use crate::{config, AreaOfInterest, EncodeReport, Error, GeometryType, Position, Style};

/// Geometry of a single placemark.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Point(Position),
    LineString(Vec<Position>),
    /// A polygon reduced to its outer ring.
    Polygon(Vec<Position>),
}

/// Inline style of a placemark, colors already in KML `aabbggrr` form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlacemarkStyle {
    Line { color: String, width: u32 },
    Poly {
        line_color: String,
        width: u32,
        fill_color: String,
    },
    Icon { color: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Placemark {
    pub name: String,
    pub shape: Shape,
    pub style: PlacemarkStyle,
}

/// Encode one geometry of layer `name` drawn with `style`.
///
/// Points yield one placemark per position, lines and polygons a single placemark, and
/// geometry collections none at all.
pub fn encode_geometry(
    name: &str,
    geometry: &Geometry,
    style: &Style,
    report: &mut EncodeReport,
) -> Result<Vec<Placemark>, Error> {
    let geometry_type = GeometryType::of(&geometry.value);
    let placemark = |shape: Shape, drawn: PlacemarkStyle| Placemark {
        name: name.to_owned(),
        shape,
        style: drawn,
    };
    match geometry.value {
        Value::Point(ref p) => {
            let style = icon_style(style)?;
            Ok(vec![placemark(Shape::Point(position(p, geometry_type)?), style)])
        }
        Value::MultiPoint(ref points) => {
            if points.is_empty() {
                return Err(Error::malformed(geometry_type.as_str(), "no point"));
            }
            let style = icon_style(style)?;
            points
                .iter()
                .map(|p| -> Result<Placemark, Error> {
                    Ok(placemark(Shape::Point(position(p, geometry_type)?), style.clone()))
                })
                .collect()
        }
        Value::LineString(ref line) => Ok(vec![placemark(
            Shape::LineString(line_string(line, geometry_type)?),
            line_style(style)?,
        )]),
        Value::MultiLineString(ref lines) => {
            let first = match lines.first() {
                Some(first) => first,
                None => return Err(Error::malformed(geometry_type.as_str(), "no line")),
            };
            let shape = Shape::LineString(line_string(first, geometry_type)?);
            drop_components(report, name, geometry_type, lines.len() - 1);
            Ok(vec![placemark(shape, line_style(style)?)])
        }
        Value::Polygon(ref rings) => {
            let shape = Shape::Polygon(outer_ring(rings, geometry_type)?);
            drop_components(report, name, geometry_type, rings.len() - 1);
            Ok(vec![placemark(shape, poly_style(style)?)])
        }
        Value::MultiPolygon(ref polygons) => {
            let first = match polygons.first() {
                Some(first) => first,
                None => return Err(Error::malformed(geometry_type.as_str(), "no polygon")),
            };
            let shape = Shape::Polygon(outer_ring(first, geometry_type)?);
            let holes = first.len() - 1;
            drop_components(report, name, geometry_type, polygons.len() - 1 + holes);
            Ok(vec![placemark(shape, poly_style(style)?)])
        }
        Value::GeometryCollection(..) => {
            warn!("layer '{}': skipping unsupported {}", name, geometry_type);
            report.skipped_geometries += 1;
            Ok(Vec::new())
        }
    }
}

/// Encode the area of interest with its fixed style, whatever the layers look like.
pub fn encode_aoi(aoi: &AreaOfInterest, report: &mut EncodeReport) -> Result<Vec<Placemark>, Error> {
    encode_geometry(config::AOI_NAME, aoi.geometry(), &aoi_style(), report)
}

pub fn aoi_style() -> Style {
    Style {
        color: config::AOI_STROKE_COLOR.to_owned(),
        width: config::AOI_STROKE_WIDTH,
        fill_color: Some(config::AOI_FILL_COLOR.to_owned()),
        fill_opacity: config::AOI_FILL_OPACITY,
    }
}

fn drop_components(report: &mut EncodeReport, name: &str, geometry_type: GeometryType, count: usize) {
    if count > 0 {
        warn!(
            "layer '{}': dropped {} component(s) of a {}",
            name, count, geometry_type
        );
        report.dropped_components += count;
    }
}

fn position(p: &Position, geometry_type: GeometryType) -> Result<Position, Error> {
    if p.len() < 2 {
        return Err(Error::malformed(
            geometry_type.as_str(),
            format!("position has {} coordinate(s)", p.len()),
        ));
    }
    Ok(p.clone())
}

fn line_string(line: &[Position], geometry_type: GeometryType) -> Result<Vec<Position>, Error> {
    if line.len() < 2 {
        return Err(Error::malformed(
            geometry_type.as_str(),
            format!("line has {} position(s)", line.len()),
        ));
    }
    line.iter().map(|p| position(p, geometry_type)).collect()
}

fn outer_ring(rings: &[Vec<Position>], geometry_type: GeometryType) -> Result<Vec<Position>, Error> {
    match rings.first() {
        Some(ring) if !ring.is_empty() => {
            debug!("outer ring of {} position(s)", ring.len());
            ring.iter().map(|p| position(p, geometry_type)).collect()
        }
        _ => Err(Error::malformed(geometry_type.as_str(), "no outer ring")),
    }
}

// Stroke is always opaque.
fn line_style(style: &Style) -> Result<PlacemarkStyle, Error> {
    Ok(PlacemarkStyle::Line {
        color: abgr_hex(&style.color, 1.0)?,
        width: style.width,
    })
}

fn poly_style(style: &Style) -> Result<PlacemarkStyle, Error> {
    Ok(PlacemarkStyle::Poly {
        line_color: abgr_hex(&style.color, 1.0)?,
        width: style.width,
        fill_color: abgr_hex(style.fill_color(), style.fill_opacity)?,
    })
}

fn icon_style(style: &Style) -> Result<PlacemarkStyle, Error> {
    Ok(PlacemarkStyle::Icon {
        color: abgr_hex(&style.color, 1.0)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn geometry(value: serde_json::Value) -> Geometry {
        serde_json::from_value(value).unwrap()
    }

    fn encode(value: serde_json::Value) -> (Result<Vec<Placemark>, Error>, EncodeReport) {
        let mut report = EncodeReport::default();
        let result = encode_geometry("roads", &geometry(value), &Style::default(), &mut report);
        (result, report)
    }

    #[test]
    fn multilinestring_keeps_first_line() {
        let (placemarks, report) = encode(json!({"type": "MultiLineString", "coordinates": [
            [[0, 0], [1, 1]],
            [[2, 2], [3, 3]],
            [[4, 4], [5, 5]]
        ]}));
        let placemarks = placemarks.unwrap();
        assert_eq!(placemarks.len(), 1);
        assert_eq!(
            placemarks[0].shape,
            Shape::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]])
        );
        assert_eq!(
            placemarks[0].style,
            PlacemarkStyle::Line {
                color: "ff5ec522".to_owned(),
                width: 4
            }
        );
        assert_eq!(report.dropped_components, 2);
    }

    #[test]
    fn multipolygon_keeps_first_outer_ring() {
        let (placemarks, report) = encode(json!({"type": "MultiPolygon", "coordinates": [
            [[[0, 0], [4, 0], [4, 4], [0, 0]], [[1, 1], [2, 1], [2, 2], [1, 1]]],
            [[[9, 9], [8, 9], [8, 8], [9, 9]]]
        ]}));
        let placemarks = placemarks.unwrap();
        assert_eq!(placemarks.len(), 1);
        assert_eq!(
            placemarks[0].shape,
            Shape::Polygon(vec![
                vec![0.0, 0.0],
                vec![4.0, 0.0],
                vec![4.0, 4.0],
                vec![0.0, 0.0]
            ])
        );
        assert_eq!(
            placemarks[0].style,
            PlacemarkStyle::Poly {
                line_color: "ff5ec522".to_owned(),
                width: 4,
                fill_color: "335ec522".to_owned(),
            }
        );
        // second polygon plus the hole of the first
        assert_eq!(report.dropped_components, 2);
    }

    #[test]
    fn points_yield_one_placemark_each() {
        let (placemarks, report) =
            encode(json!({"type": "MultiPoint", "coordinates": [[0, 0], [1, 1, 10], [2, 2]]}));
        let placemarks = placemarks.unwrap();
        assert_eq!(placemarks.len(), 3);
        assert_eq!(placemarks[1].shape, Shape::Point(vec![1.0, 1.0, 10.0]));
        assert!(placemarks
            .iter()
            .all(|p| p.name == "roads" && p.style == PlacemarkStyle::Icon { color: "ff5ec522".to_owned() }));
        assert_eq!(report, EncodeReport::default());

        let (placemarks, _) = encode(json!({"type": "Point", "coordinates": [5, 6]}));
        assert_eq!(placemarks.unwrap().len(), 1);
    }

    #[test]
    fn collections_are_skipped() {
        let (placemarks, report) = encode(json!({"type": "GeometryCollection", "geometries": [
            {"type": "Point", "coordinates": [0, 0]}
        ]}));
        assert!(placemarks.unwrap().is_empty());
        assert_eq!(report.skipped_geometries, 1);
    }

    #[test]
    fn malformed_geometries_fail() {
        for value in [
            json!({"type": "LineString", "coordinates": [[0, 0]]}),
            json!({"type": "Polygon", "coordinates": []}),
            json!({"type": "MultiPolygon", "coordinates": []}),
            json!({"type": "MultiLineString", "coordinates": []}),
            json!({"type": "MultiPoint", "coordinates": []}),
        ] {
            let (result, _) = encode(value.clone());
            assert!(
                matches!(result, Err(Error::MalformedGeometry { .. })),
                "{} should be malformed",
                value
            );
        }

        // geojson refuses short positions when parsing, so build one directly
        let mut report = EncodeReport::default();
        let short = Geometry::new(Value::Point(vec![1.0]));
        assert!(matches!(
            encode_geometry("pins", &short, &Style::default(), &mut report),
            Err(Error::MalformedGeometry { .. })
        ));
    }

    #[test]
    fn bad_style_color_fails() {
        let style = Style {
            color: "green".to_owned(),
            ..Style::default()
        };
        let mut report = EncodeReport::default();
        let result = encode_geometry(
            "roads",
            &geometry(json!({"type": "Point", "coordinates": [0, 0]})),
            &style,
            &mut report,
        );
        assert_eq!(result, Err(Error::InvalidColor("green".to_owned())));
    }

    #[test]
    fn aoi_uses_fixed_style() {
        let aoi = AreaOfInterest::from_json_value(&json!({"type": "Feature", "properties": {}, "geometry": {
            "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]
        }}))
        .unwrap();
        let mut report = EncodeReport::default();
        let placemarks = encode_aoi(&aoi, &mut report).unwrap();
        assert_eq!(placemarks.len(), 1);
        assert_eq!(placemarks[0].name, "AOI");
        assert_eq!(
            placemarks[0].style,
            PlacemarkStyle::Poly {
                line_color: "ff5f5aff".to_owned(),
                width: 2,
                fill_color: "4da29aff".to_owned(),
            }
        );
    }
}
