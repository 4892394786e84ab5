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

//! Normalizing source coordinates to WGS84 longitude/latitude.
//!
//! The reference system a dataset is read in is resolved in this order:
//!
//! 1. a caller supplied EPSG code *replaces* whatever the source declares;
//! 2. otherwise the source's own declaration (GeoJSON `crs` member, Shapefile `.prj`, KML);
//! 3. otherwise WGS84 is assumed, and reported as an assumption.

use std::convert::TryFrom;
use std::sync::OnceLock;

use geojson::Value;
use log::{debug, warn};
use proj4rs::Proj;
use regex::Regex;

use crate::config::{
    CANONICAL_EPSG, DEGREE_LIKE_RATIO, DEGREE_SAMPLE_PAIRS, KNOWN_CRS, WEB_MERCATOR_ALIASES,
};
use crate::source::{Dataset, Row};
use crate::{bbox, CrsOrigin, Error, Position, SourceCrs};

const WEB_MERCATOR: u32 = 3857;

/// Rows whose coordinates are WGS84 longitude/latitude.
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized {
    pub rows: Vec<Row>,
    pub crs: SourceCrs,
}

/// Decide which reference system the source coordinates are in.
pub fn resolve(declared: Option<u32>, override_epsg: Option<u32>) -> SourceCrs {
    match (override_epsg, declared) {
        (Some(epsg), _) => SourceCrs {
            epsg,
            origin: CrsOrigin::Override,
        },
        (None, Some(epsg)) => SourceCrs {
            epsg,
            origin: CrsOrigin::Declared,
        },
        (None, None) => SourceCrs {
            epsg: CANONICAL_EPSG,
            origin: CrsOrigin::Assumed,
        },
    }
}

/// Reproject every row of `dataset` to WGS84.
pub fn normalize(dataset: Dataset, override_epsg: Option<u32>) -> Result<Normalized, Error> {
    let crs = resolve(dataset.declared_epsg, override_epsg);
    match crs.origin {
        CrsOrigin::Assumed => warn!(
            "source declares no reference system, assuming EPSG:{}",
            CANONICAL_EPSG
        ),
        CrsOrigin::Override => {
            if let Some(declared) = dataset.declared_epsg.filter(|d| *d != crs.epsg) {
                debug!("EPSG:{} overrides declared EPSG:{}", crs.epsg, declared);
            }
        }
        CrsOrigin::Declared => {
            if canonical_code(crs.epsg) == WEB_MERCATOR && looks_like_degrees(&dataset.rows) {
                return Err(Error::UnsupportedFormat(format!(
                    "source declares EPSG:{} but its coordinates look like degrees; \
                     pass the source EPSG explicitly",
                    crs.epsg
                )));
            }
        }
    }

    let reprojection = Reprojection::to_wgs84(crs.epsg)?;
    let mut rows = dataset.rows;
    if !reprojection.is_identity() {
        for geometry in rows.iter_mut().filter_map(|r| r.geometry.as_mut()) {
            reprojection.apply(&mut geometry.value)?;
            geometry.bbox = None;
        }
        debug!("reprojected {} row(s) from EPSG:{}", rows.len(), crs.epsg);
    }
    Ok(Normalized { rows, crs })
}

/// Coordinate transformation from one EPSG code to WGS84 longitude/latitude.
pub struct Reprojection {
    epsg: u32,
    projs: Option<(Proj, Proj)>,
}

impl Reprojection {
    pub fn to_wgs84(epsg: u32) -> Result<Self, Error> {
        if canonical_code(epsg) == CANONICAL_EPSG {
            return Ok(Reprojection { epsg, projs: None });
        }
        let src = proj_for(epsg)?;
        let dst = proj_for(CANONICAL_EPSG)?;
        Ok(Reprojection {
            epsg,
            projs: Some((src, dst)),
        })
    }

    pub fn is_identity(&self) -> bool {
        self.projs.is_none()
    }

    /// Transform every position of `value` in place. Elevation is carried along untouched.
    pub fn apply(&self, value: &mut Value) -> Result<(), Error> {
        match *value {
            Value::Point(ref mut pos) => self.position(pos),
            Value::MultiPoint(ref mut line) | Value::LineString(ref mut line) => {
                line.iter_mut().try_for_each(|p| self.position(p))
            }
            Value::MultiLineString(ref mut lines) | Value::Polygon(ref mut lines) => lines
                .iter_mut()
                .flatten()
                .try_for_each(|p| self.position(p)),
            Value::MultiPolygon(ref mut polygons) => polygons
                .iter_mut()
                .flatten()
                .flatten()
                .try_for_each(|p| self.position(p)),
            Value::GeometryCollection(ref mut geometries) => geometries
                .iter_mut()
                .try_for_each(|g| self.apply(&mut g.value)),
        }
    }

    fn position(&self, pos: &mut Position) -> Result<(), Error> {
        let (src, dst) = match self.projs {
            Some((ref src, ref dst)) => (src, dst),
            None => return Ok(()),
        };
        if pos.len() < 2 {
            return Ok(());
        }
        let mut point = if src.is_latlong() {
            (pos[0].to_radians(), pos[1].to_radians(), 0.0)
        } else {
            (pos[0], pos[1], 0.0)
        };
        proj4rs::transform::transform(src, dst, &mut point).map_err(|e| Error::Reprojection {
            epsg: self.epsg,
            reason: e.to_string(),
        })?;
        let (x, y) = if dst.is_latlong() {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::Reprojection {
                epsg: self.epsg,
                reason: format!("position {:?} has no WGS84 equivalent", pos),
            });
        }
        pos[0] = x;
        pos[1] = y;
        Ok(())
    }
}

/// Fold vendor aliases onto the EPSG code they stand for.
pub fn canonical_code(epsg: u32) -> u32 {
    if WEB_MERCATOR_ALIASES.contains(&epsg) {
        WEB_MERCATOR
    } else {
        epsg
    }
}

fn proj_for(epsg: u32) -> Result<Proj, Error> {
    let code = canonical_code(epsg);
    let definition = match KNOWN_CRS.iter().find(|(known, _)| *known == code) {
        Some((_, definition)) => *definition,
        None => u16::try_from(code)
            .ok()
            .and_then(crs_definitions::from_code)
            .map(|def| def.proj4)
            .ok_or_else(|| Error::Reprojection {
                epsg,
                reason: "unknown EPSG code".to_owned(),
            })?,
    };
    Proj::from_proj_string(definition).map_err(|e| Error::Reprojection {
        epsg,
        reason: e.to_string(),
    })
}

fn epsg_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)epsg[^\d]*(\d{3,6})").ok())
        .as_ref()
}

fn first_epsg_group(text: &str) -> Option<u32> {
    epsg_pattern()?
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// EPSG code named by a GeoJSON `crs` member: `EPSG:3857`, `urn:ogc:def:crs:EPSG::3857`,
/// or the OGC `CRS84` longitude/latitude name.
pub fn epsg_from_crs_name(name: &str) -> Option<u32> {
    if name.to_lowercase().ends_with("crs84") {
        return Some(CANONICAL_EPSG);
    }
    first_epsg_group(name)
}

/// Guess the EPSG code a Shapefile `.prj` (ESRI WKT) describes.
pub fn detect_epsg_from_prj(prj: &str) -> Option<u32> {
    let s = prj.to_lowercase();
    if s.trim().is_empty() {
        return None;
    }
    if ["auxiliary_sphere", "web_mercator", "102100", "102113"]
        .iter()
        .any(|needle| s.contains(needle))
    {
        return Some(WEB_MERCATOR);
    }
    if ["north_american_1983", "nad_1983", "nad83"]
        .iter()
        .any(|needle| s.contains(needle))
    {
        return Some(4269);
    }
    if s.contains("wgs_1984") || s.contains("wgs 1984") {
        return Some(CANONICAL_EPSG);
    }
    first_epsg_group(prj)
}

/// Whether the first coordinates of the rows look like longitude/latitude degrees.
pub fn looks_like_degrees(rows: &[Row]) -> bool {
    let (mut pairs, mut in_range) = (0usize, 0usize);
    let sample = rows
        .iter()
        .filter_map(|r| r.geometry.as_ref())
        .flat_map(|g| bbox::coordinates(&g.value))
        .take(DEGREE_SAMPLE_PAIRS);
    for (x, y) in sample {
        pairs += 1;
        if x.abs() <= 180.0 && y.abs() <= 90.0 {
            in_range += 1;
        }
    }
    pairs > 0 && in_range as f64 / pairs as f64 >= DEGREE_LIKE_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceFormat;
    use crate::json::JsonObject;
    use geojson::Geometry;

    fn dataset(values: Vec<Value>, declared_epsg: Option<u32>) -> Dataset {
        Dataset {
            format: SourceFormat::GeoJson,
            rows: values
                .into_iter()
                .map(|v| Row {
                    geometry: Some(Geometry::new(v)),
                    properties: JsonObject::new(),
                })
                .collect(),
            declared_epsg,
        }
    }

    fn point(normalized: &Normalized, i: usize) -> Vec<f64> {
        match normalized.rows[i].geometry.as_ref().unwrap().value {
            Value::Point(ref p) => p.clone(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn override_replaces_declaration() {
        assert_eq!(
            resolve(Some(3857), Some(4269)),
            SourceCrs {
                epsg: 4269,
                origin: CrsOrigin::Override
            }
        );
        assert_eq!(
            resolve(Some(3857), None),
            SourceCrs {
                epsg: 3857,
                origin: CrsOrigin::Declared
            }
        );
        assert_eq!(
            resolve(None, None),
            SourceCrs {
                epsg: 4326,
                origin: CrsOrigin::Assumed
            }
        );
    }

    #[test]
    fn wgs84_is_left_untouched() {
        let normalized =
            normalize(dataset(vec![Value::Point(vec![-87.9065, 43.0389, 12.0])], None), None)
                .unwrap();
        assert_eq!(normalized.crs.origin, CrsOrigin::Assumed);
        assert_eq!(point(&normalized, 0), vec![-87.9065, 43.0389, 12.0]);
    }

    #[test]
    fn web_mercator_to_wgs84() {
        let normalized = normalize(
            dataset(
                vec![
                    Value::Point(vec![0.0, 0.0]),
                    Value::Point(vec![-9_785_706.817, 5_317_894.699]),
                ],
                Some(3857),
            ),
            None,
        )
        .unwrap();
        let origin = point(&normalized, 0);
        assert!(origin[0].abs() < 1e-9 && origin[1].abs() < 1e-9);
        let milwaukee = point(&normalized, 1);
        assert!((milwaukee[0] - -87.9065).abs() < 1e-3, "{:?}", milwaukee);
        assert!((milwaukee[1] - 43.0389).abs() < 1e-3, "{:?}", milwaukee);
    }

    #[test]
    fn esri_alias_behaves_like_web_mercator() {
        let normalized = normalize(
            dataset(vec![Value::Point(vec![-9_785_706.817, 5_317_894.699])], Some(102100)),
            None,
        )
        .unwrap();
        assert!((point(&normalized, 0)[0] - -87.9065).abs() < 1e-3);
    }

    #[test]
    fn override_reprojects_undeclared_source() {
        let normalized = normalize(
            dataset(vec![Value::Point(vec![-9_785_706.817, 5_317_894.699])], None),
            Some(3857),
        )
        .unwrap();
        assert_eq!(normalized.crs.origin, CrsOrigin::Override);
        assert!((point(&normalized, 0)[1] - 43.0389).abs() < 1e-3);
    }

    #[test]
    fn declared_mercator_with_degree_coordinates_is_contradictory() {
        let result = normalize(
            dataset(vec![Value::LineString(vec![vec![-87.9, 43.0], vec![-87.8, 43.1]])], Some(3857)),
            None,
        );
        assert!(matches!(result, Err(Error::UnsupportedFormat(..))));

        // an explicit override is trusted as is
        let result = normalize(
            dataset(vec![Value::Point(vec![-87.9, 43.0])], Some(4326)),
            Some(3857),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn unknown_code_fails_reprojection() {
        let result = normalize(dataset(vec![Value::Point(vec![1.0, 2.0])], Some(999_999)), None);
        assert!(matches!(
            result,
            Err(Error::Reprojection { epsg: 999_999, .. })
        ));
    }

    #[test]
    fn prj_detection() {
        let web_mercator = r#"PROJCS["WGS_1984_Web_Mercator_Auxiliary_Sphere",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]]],PROJECTION["Mercator_Auxiliary_Sphere"]]"#;
        assert_eq!(detect_epsg_from_prj(web_mercator), Some(3857));
        let nad83 = r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]]]"#;
        assert_eq!(detect_epsg_from_prj(nad83), Some(4269));
        let wgs84 = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]]]"#;
        assert_eq!(detect_epsg_from_prj(wgs84), Some(4326));
        let utm = r#"PROJCS["ETRS89 / UTM zone 32N",AUTHORITY["EPSG","25832"]]"#;
        assert_eq!(detect_epsg_from_prj(utm), Some(25832));
        assert_eq!(detect_epsg_from_prj("  "), None);
        assert_eq!(detect_epsg_from_prj(r#"LOCAL_CS["site grid"]"#), None);
    }

    #[test]
    fn crs_member_names() {
        assert_eq!(epsg_from_crs_name("EPSG:3857"), Some(3857));
        assert_eq!(epsg_from_crs_name("urn:ogc:def:crs:EPSG::2154"), Some(2154));
        assert_eq!(epsg_from_crs_name("urn:ogc:def:crs:OGC:1.3:CRS84"), Some(4326));
        assert_eq!(epsg_from_crs_name("somewhere"), None);
    }

    #[test]
    fn degree_heuristic() {
        let degrees = dataset(vec![Value::Point(vec![-87.9, 43.0])], None);
        assert!(looks_like_degrees(&degrees.rows));
        let meters = dataset(vec![Value::Point(vec![-9_785_706.817, 5_317_894.699])], None);
        assert!(!looks_like_degrees(&meters.rows));
        assert!(!looks_like_degrees(&[]));
    }
}
