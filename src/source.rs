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

//! Reading vector files into rows of geometry and attributes.
//!
//! Supported inputs are GeoJSON (`.geojson`, `.json`), ESRI Shapefile (`.shp` with its
//! `.dbf` and optional `.prj`) and KML (`.kml`, `.kmz`).

use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use geojson::{GeoJson, Geometry, Value};
use log::debug;
use shapefile::dbase::FieldValue;
use shapefile::Shape;

use crate::json::{JsonObject, JsonValue};
use crate::{archive, crs, kml_reader, util, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    GeoJson,
    Shapefile,
    Kml,
    Kmz,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        match util::extension(path).as_str() {
            ".geojson" | ".json" => Ok(SourceFormat::GeoJson),
            ".shp" => Ok(SourceFormat::Shapefile),
            ".kml" => Ok(SourceFormat::Kml),
            ".kmz" => Ok(SourceFormat::Kmz),
            "" => Err(Error::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            ext => Err(Error::UnsupportedFormat(format!(
                "unknown file type '{}'",
                ext
            ))),
        }
    }
}

/// One source row: a possibly missing geometry plus its attribute columns.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub geometry: Option<Geometry>,
    pub properties: JsonObject,
}

/// The rows of a vector file, in file order, with the reference system the file declares.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub format: SourceFormat,
    pub rows: Vec<Row>,
    pub declared_epsg: Option<u32>,
}

/// Read a vector file.
///
/// Fails with `SourceNotFound` if `path` is not a readable file and with
/// `UnsupportedFormat` if its content cannot be read as vector data.
pub fn load(path: &Path) -> Result<Dataset, Error> {
    if !path.is_file() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }
    let format = SourceFormat::from_path(path)?;
    let dataset = match format {
        SourceFormat::GeoJson => read_geojson(&read_text(path)?)?,
        SourceFormat::Shapefile => read_shapefile(path)?,
        SourceFormat::Kml => read_kml(&read_text(path)?, SourceFormat::Kml)?,
        SourceFormat::Kmz => read_kml(&archive::read_kml(path)?, SourceFormat::Kmz)?,
    };
    debug!(
        "read {} row(s) from {} ({:?}, declared EPSG {:?})",
        dataset.rows.len(),
        path.display(),
        dataset.format,
        dataset.declared_epsg
    );
    Ok(dataset)
}

/// Read a text file. Content that is not UTF-8 is `UnsupportedFormat`.
pub fn read_text(path: &Path) -> Result<String, Error> {
    String::from_utf8(fs::read(path)?).map_err(|_| {
        Error::UnsupportedFormat(format!("{} is not UTF-8 text", path.display()))
    })
}

/// Parse GeoJSON text. A FeatureCollection yields one row per feature, a lone Feature or
/// Geometry yields a single row.
pub fn read_geojson(text: &str) -> Result<Dataset, Error> {
    let geojson = text
        .parse::<GeoJson>()
        .map_err(|e| Error::UnsupportedFormat(e.to_string()))?;
    let (rows, crs_name) = match geojson {
        GeoJson::FeatureCollection(fc) => {
            let crs_name = util::get_crs_name(fc.foreign_members.as_ref()).map(str::to_owned);
            let rows = fc
                .features
                .into_iter()
                .map(|f| Row {
                    geometry: f.geometry,
                    properties: f.properties.unwrap_or_default(),
                })
                .collect();
            (rows, crs_name)
        }
        GeoJson::Feature(f) => {
            let crs_name = util::get_crs_name(f.foreign_members.as_ref()).map(str::to_owned);
            let row = Row {
                geometry: f.geometry,
                properties: f.properties.unwrap_or_default(),
            };
            (vec![row], crs_name)
        }
        GeoJson::Geometry(g) => {
            let crs_name = util::get_crs_name(g.foreign_members.as_ref()).map(str::to_owned);
            let row = Row {
                geometry: Some(g),
                properties: JsonObject::new(),
            };
            (vec![row], crs_name)
        }
    };
    let declared_epsg = match crs_name {
        Some(name) => Some(crs::epsg_from_crs_name(&name).ok_or_else(|| {
            Error::UnsupportedFormat(format!("unreadable 'crs' member '{}'", name))
        })?),
        None => None,
    };
    Ok(Dataset {
        format: SourceFormat::GeoJson,
        rows,
        declared_epsg,
    })
}

fn read_shapefile(path: &Path) -> Result<Dataset, Error> {
    let mut reader = shapefile::Reader::from_path(path)
        .map_err(|e| Error::UnsupportedFormat(format!("{}: {}", path.display(), e)))?;
    let mut rows = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) =
            result.map_err(|e| Error::UnsupportedFormat(format!("{}: {}", path.display(), e)))?;
        let geometry = match shape {
            Shape::NullShape => None,
            shape => {
                let geometry = geo_types::Geometry::<f64>::try_from(shape).map_err(|e| {
                    Error::UnsupportedFormat(format!("{}: {:?}", path.display(), e))
                })?;
                Some(Geometry::new(Value::from(&geometry)))
            }
        };
        let properties = record
            .into_iter()
            .map(|(name, value)| (name, field_to_json(value)))
            .collect();
        rows.push(Row {
            geometry,
            properties,
        });
    }

    let prj = path.with_extension("prj");
    let declared_epsg = if prj.is_file() {
        crs::detect_epsg_from_prj(&read_text(&prj)?)
    } else {
        None
    };
    Ok(Dataset {
        format: SourceFormat::Shapefile,
        rows,
        declared_epsg,
    })
}

// KML coordinates are WGS84 longitude/latitude by definition.
fn read_kml(text: &str, format: SourceFormat) -> Result<Dataset, Error> {
    let rows = kml_reader::parse(text)?
        .into_iter()
        .map(|placemark| {
            let mut properties = JsonObject::new();
            if let Some(name) = placemark.name {
                properties.insert("name".to_owned(), JsonValue::from(name));
            }
            if let Some(description) = placemark.description {
                properties.insert("description".to_owned(), JsonValue::from(description));
            }
            Row {
                geometry: placemark.geometry,
                properties,
            }
        })
        .collect();
    Ok(Dataset {
        format,
        rows,
        declared_epsg: Some(crate::config::CANONICAL_EPSG),
    })
}

/// dBase attribute values keep their native scalar type: numbers stay numbers.
fn field_to_json(value: FieldValue) -> JsonValue {
    match value {
        FieldValue::Character(s) => s.map(JsonValue::from).unwrap_or(JsonValue::Null),
        FieldValue::Memo(s) => JsonValue::from(s),
        FieldValue::Numeric(n) => n.map(number_to_json).unwrap_or(JsonValue::Null),
        FieldValue::Float(n) => n
            .map(|v| number_to_json(f64::from(v)))
            .unwrap_or(JsonValue::Null),
        FieldValue::Double(n) | FieldValue::Currency(n) => number_to_json(n),
        FieldValue::Integer(n) => JsonValue::from(n),
        FieldValue::Logical(b) => b.map(JsonValue::from).unwrap_or(JsonValue::Null),
        FieldValue::Date(d) => d
            .map(|d| JsonValue::from(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())))
            .unwrap_or(JsonValue::Null),
        #[allow(unreachable_patterns)]
        other => JsonValue::from(format!("{:?}", other)),
    }
}

fn number_to_json(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        JsonValue::from(n as i64)
    } else {
        JsonValue::from(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn geojson_collection_rows_in_order() {
        let dataset = read_geojson(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"name":"a","lanes":2},"geometry":{"type":"Point","coordinates":[1,2]}},
                {"type":"Feature","properties":null,"geometry":null},
                {"type":"Feature","properties":{"name":"c"},"geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(dataset.rows.len(), 3);
        assert_eq!(dataset.rows[0].properties["lanes"], json!(2));
        assert!(dataset.rows[1].geometry.is_none());
        assert!(dataset.rows[1].properties.is_empty());
        assert_eq!(dataset.rows[2].properties["name"], json!("c"));
        assert_eq!(dataset.declared_epsg, None);
    }

    #[test]
    fn geojson_declared_crs() {
        let dataset = read_geojson(
            r#"{"type":"FeatureCollection","crs":{"type":"name","properties":{"name":"urn:ogc:def:crs:EPSG::3857"}},"features":[]}"#,
        )
        .unwrap();
        assert_eq!(dataset.declared_epsg, Some(3857));

        let dataset = read_geojson(
            r#"{"type":"Point","coordinates":[1,2],"crs":{"type":"name","properties":{"name":"urn:ogc:def:crs:OGC:1.3:CRS84"}}}"#,
        )
        .unwrap();
        assert_eq!(dataset.declared_epsg, Some(4326));
        assert_eq!(dataset.rows.len(), 1);

        let err = read_geojson(
            r#"{"type":"FeatureCollection","crs":{"type":"name","properties":{"name":"local grid"}},"features":[]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedFormat("unreadable 'crs' member 'local grid'".to_owned())
        );
    }

    #[test]
    fn invalid_geojson_is_unsupported() {
        assert!(matches!(
            read_geojson("{\"type\":\"Topology\"}"),
            Err(Error::UnsupportedFormat(..))
        ));
        assert!(matches!(
            read_geojson("not json"),
            Err(Error::UnsupportedFormat(..))
        ));
    }

    #[test]
    fn load_checks_path_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.geojson");
        assert_eq!(load(&missing), Err(Error::SourceNotFound(missing.clone())));

        let csv = dir.path().join("points.csv");
        fs::write(&csv, "x,y\n1,2\n").unwrap();
        assert_eq!(
            load(&csv),
            Err(Error::UnsupportedFormat("unknown file type '.csv'".to_owned()))
        );
    }

    #[test]
    fn binary_content_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["bin.geojson", "bin.kml"] {
            let path = dir.path().join(name);
            fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();
            let err = load(&path).unwrap_err();
            assert_eq!(
                err,
                Error::UnsupportedFormat(format!("{} is not UTF-8 text", path.display()))
            );
            assert_eq!(err.status(), 400);
        }
    }

    #[test]
    fn load_kml_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pins.kml");
        fs::write(
            &path,
            r#"<kml><Document><Placemark><name>Pin</name><description>here</description><Point><coordinates>-87.9,43.0</coordinates></Point></Placemark></Document></kml>"#,
        )
        .unwrap();
        let dataset = load(&path).unwrap();
        assert_eq!(dataset.format, SourceFormat::Kml);
        assert_eq!(dataset.declared_epsg, Some(4326));
        assert_eq!(dataset.rows[0].properties["name"], json!("Pin"));
        assert_eq!(dataset.rows[0].properties["description"], json!("here"));
        assert_eq!(
            dataset.rows[0].geometry.as_ref().unwrap().value,
            Value::Point(vec![-87.9, 43.0])
        );
    }

    #[test]
    fn numeric_fields_stay_numeric() {
        assert_eq!(field_to_json(FieldValue::Numeric(Some(3.0))), json!(3));
        assert_eq!(field_to_json(FieldValue::Numeric(Some(2.5))), json!(2.5));
        assert_eq!(field_to_json(FieldValue::Numeric(None)), JsonValue::Null);
        assert_eq!(field_to_json(FieldValue::Integer(7)), json!(7));
        assert_eq!(field_to_json(FieldValue::Logical(Some(true))), json!(true));
        assert_eq!(
            field_to_json(FieldValue::Character(Some("Main St".to_owned()))),
            json!("Main St")
        );
    }
}
