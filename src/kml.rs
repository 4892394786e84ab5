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

//! KML document rendering.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::placemark::{Placemark, PlacemarkStyle, Shape};
use crate::{config, Error, Position};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Render a KML document named `name` holding `placemarks` in order.
///
/// Each placemark carries its own inline `<Style>`.
pub fn render_document(name: &str, placemarks: &[Placemark]) -> Result<Vec<u8>, Error> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    write_document(&mut writer, name, placemarks).map_err(|e| Error::Io(e.to_string()))?;
    Ok(writer.into_inner().into_inner())
}

fn write_document(
    writer: &mut XmlWriter,
    name: &str,
    placemarks: &[Placemark],
) -> quick_xml::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("kml").with_attributes([("xmlns", config::KML_NAMESPACE)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("Document")))?;
    text_element(writer, "name", name)?;
    for placemark in placemarks {
        write_placemark(writer, placemark)?;
    }
    writer.write_event(Event::End(BytesEnd::new("Document")))?;
    writer.write_event(Event::End(BytesEnd::new("kml")))?;
    Ok(())
}

fn write_placemark(writer: &mut XmlWriter, placemark: &Placemark) -> quick_xml::Result<()> {
    start(writer, "Placemark")?;
    text_element(writer, "name", &placemark.name)?;
    write_style(writer, &placemark.style)?;
    match placemark.shape {
        Shape::Point(ref p) => {
            start(writer, "Point")?;
            text_element(writer, "coordinates", &coordinates(std::slice::from_ref(p)))?;
            end(writer, "Point")?;
        }
        Shape::LineString(ref line) => {
            start(writer, "LineString")?;
            text_element(writer, "tessellate", "1")?;
            text_element(writer, "coordinates", &coordinates(line))?;
            end(writer, "LineString")?;
        }
        Shape::Polygon(ref ring) => {
            start(writer, "Polygon")?;
            start(writer, "outerBoundaryIs")?;
            start(writer, "LinearRing")?;
            text_element(writer, "coordinates", &coordinates(ring))?;
            end(writer, "LinearRing")?;
            end(writer, "outerBoundaryIs")?;
            end(writer, "Polygon")?;
        }
    }
    end(writer, "Placemark")
}

fn write_style(writer: &mut XmlWriter, style: &PlacemarkStyle) -> quick_xml::Result<()> {
    start(writer, "Style")?;
    match *style {
        PlacemarkStyle::Line { ref color, width } => {
            line_style(writer, color, width)?;
        }
        PlacemarkStyle::Poly {
            ref line_color,
            width,
            ref fill_color,
        } => {
            line_style(writer, line_color, width)?;
            start(writer, "PolyStyle")?;
            text_element(writer, "color", fill_color)?;
            end(writer, "PolyStyle")?;
        }
        PlacemarkStyle::Icon { ref color } => {
            start(writer, "IconStyle")?;
            text_element(writer, "color", color)?;
            end(writer, "IconStyle")?;
        }
    }
    end(writer, "Style")
}

fn line_style(writer: &mut XmlWriter, color: &str, width: u32) -> quick_xml::Result<()> {
    start(writer, "LineStyle")?;
    text_element(writer, "color", color)?;
    text_element(writer, "width", &width.to_string())?;
    end(writer, "LineStyle")
}

fn start(writer: &mut XmlWriter, tag: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))
}

fn end(writer: &mut XmlWriter, tag: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag)))
}

fn text_element(writer: &mut XmlWriter, tag: &str, text: &str) -> quick_xml::Result<()> {
    start(writer, tag)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, tag)
}

/// KML tuples: `lon,lat[,alt]` separated by spaces.
fn coordinates(positions: &[Position]) -> String {
    positions
        .iter()
        .map(|p| {
            p.iter()
                .take(3)
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join(" ")
}
