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

//! Streaming reader for the placemarks of a KML document.
//!
//! Only the parts a vector layer needs are read: placemark `name` and `description`, and the
//! `Point`, `LineString`, `LinearRing`, `Polygon` and `MultiGeometry` geometries. Styles,
//! folders and everything else are skipped.

use geojson::{Geometry, Value};
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::{Error, Position};

/// A placemark as read from KML, geometry already in GeoJSON form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Placemark {
    pub name: Option<String>,
    pub description: Option<String>,
    pub geometry: Option<Geometry>,
}

/// Read every placemark of a KML document, in document order.
pub fn parse(text: &str) -> Result<Vec<Placemark>, Error> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut state = State::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                state.open(tag);
            }
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"kml" {
                    state.saw_root = true;
                }
            }
            Ok(Event::End(ref e)) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                state.close(&tag);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().map_err(invalid)?;
                state.text(&text)?;
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e).into_owned();
                state.text(&text)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(invalid(err)),
        }
        buf.clear();
    }

    if !state.saw_root {
        return Err(Error::UnsupportedFormat(
            "not a KML document: no <kml> element".to_owned(),
        ));
    }
    debug!("read {} placemark(s) from KML", state.placemarks.len());
    Ok(state.placemarks)
}

fn invalid(err: quick_xml::Error) -> Error {
    Error::UnsupportedFormat(format!("invalid KML: {}", err))
}

/// A geometry element being read.
enum Part {
    Point(Vec<Position>),
    LineString(Vec<Position>),
    LinearRing(Vec<Position>),
    Polygon {
        outer: Option<Vec<Position>>,
        inner: Vec<Vec<Position>>,
    },
    Multi(Vec<Geometry>),
}

impl Part {
    fn open(tag: &str) -> Option<Part> {
        match tag {
            "Point" => Some(Part::Point(Vec::new())),
            "LineString" => Some(Part::LineString(Vec::new())),
            "LinearRing" => Some(Part::LinearRing(Vec::new())),
            "Polygon" => Some(Part::Polygon {
                outer: None,
                inner: Vec::new(),
            }),
            "MultiGeometry" => Some(Part::Multi(Vec::new())),
            _ => None,
        }
    }

    fn set_coordinates(&mut self, positions: Vec<Position>) {
        match *self {
            Part::Point(ref mut p) | Part::LineString(ref mut p) | Part::LinearRing(ref mut p) => {
                *p = positions
            }
            _ => {}
        }
    }

    fn into_geometry(self) -> Option<Geometry> {
        let value = match self {
            Part::Point(positions) => Value::Point(positions.into_iter().next()?),
            Part::LineString(line) if !line.is_empty() => Value::LineString(line),
            // A ring on its own bounds an area.
            Part::LinearRing(ring) if !ring.is_empty() => Value::Polygon(vec![ring]),
            Part::Polygon {
                outer: Some(outer),
                inner,
            } => {
                let mut rings = vec![outer];
                rings.extend(inner);
                Value::Polygon(rings)
            }
            Part::Multi(geometries) if !geometries.is_empty() => {
                Value::GeometryCollection(geometries)
            }
            _ => return None,
        };
        Some(Geometry::new(value))
    }
}

#[derive(Default)]
struct State {
    saw_root: bool,
    path: Vec<String>,
    current: Option<Placemark>,
    parts: Vec<Part>,
    placemarks: Vec<Placemark>,
}

impl State {
    fn open(&mut self, tag: String) {
        match tag.as_str() {
            "kml" => self.saw_root = true,
            "Placemark" => {
                self.current = Some(Placemark::default());
                self.parts.clear();
            }
            _ => {
                if self.current.is_some() {
                    if let Some(part) = Part::open(&tag) {
                        self.parts.push(part);
                    }
                }
            }
        }
        self.path.push(tag);
    }

    fn close(&mut self, tag: &str) {
        self.path.pop();
        if tag == "Placemark" {
            if let Some(placemark) = self.current.take() {
                self.placemarks.push(placemark);
            }
            return;
        }
        if self.current.is_none() || Part::open(tag).is_none() {
            return;
        }
        let part = match self.parts.pop() {
            Some(part) => part,
            None => return,
        };
        let inner_boundary = self.path.last().map_or(false, |t| t == "innerBoundaryIs");
        let part = match (part, self.parts.last_mut()) {
            (Part::LinearRing(ring), Some(Part::Polygon { outer, inner })) => {
                if !ring.is_empty() {
                    if inner_boundary {
                        inner.push(ring);
                    } else {
                        *outer = Some(ring);
                    }
                }
                return;
            }
            (part, _) => part,
        };
        if let Some(geometry) = part.into_geometry() {
            self.attach(geometry);
        }
    }

    fn attach(&mut self, geometry: Geometry) {
        if let Some(Part::Multi(ref mut geometries)) = self.parts.last_mut() {
            geometries.push(geometry);
            return;
        }
        if let Some(ref mut placemark) = self.current {
            if placemark.geometry.is_none() {
                placemark.geometry = Some(geometry);
            }
        }
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        let len = self.path.len();
        let (tag, parent) = match len {
            0 => return Ok(()),
            1 => (self.path[0].as_str(), None),
            _ => (self.path[len - 1].as_str(), Some(self.path[len - 2].as_str())),
        };
        match (tag, parent) {
            ("coordinates", _) => {
                let positions = parse_coordinates(text)?;
                if let Some(part) = self.parts.last_mut() {
                    part.set_coordinates(positions);
                }
            }
            ("name", Some("Placemark")) => {
                if let Some(ref mut placemark) = self.current {
                    placemark.name = Some(text.to_owned());
                }
            }
            ("description", Some("Placemark")) => {
                if let Some(ref mut placemark) = self.current {
                    placemark.description = Some(text.to_owned());
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Parse KML `lon,lat[,alt]` tuples separated by whitespace.
pub fn parse_coordinates(text: &str) -> Result<Vec<Position>, Error> {
    text.split_whitespace()
        .map(|tuple| {
            let position = tuple
                .split(',')
                .map(|c| c.parse::<f64>())
                .collect::<Result<Position, _>>()
                .map_err(|_| {
                    Error::UnsupportedFormat(format!("invalid KML coordinate '{}'", tuple))
                })?;
            if position.len() < 2 {
                return Err(Error::UnsupportedFormat(format!(
                    "invalid KML coordinate '{}'",
                    tuple
                )));
            }
            Ok(position)
        })
        .collect()
}
