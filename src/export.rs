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

//! Export of styled layers and an area of interest to a KMZ archive.

use std::path::{Path, PathBuf};

use geojson::Geometry;
use log::{info, warn};
use serde::Serialize;

use crate::placemark::{encode_aoi, encode_geometry};
use crate::{archive, config, kml, AreaOfInterest, Error, ExportRequest, Style};

/// What an export left out of the archive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeReport {
    /// Secondary lines and polygons of Multi geometries, and polygon holes.
    pub dropped_components: usize,
    /// Geometries of a type KML placemarks are not built for.
    pub skipped_geometries: usize,
    pub features_without_geometry: usize,
}

/// Confirmation of a written archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportOutcome {
    pub ok: bool,
    pub path: PathBuf,
    pub placemarks: usize,
    pub report: EncodeReport,
}

/// A geometry to draw, with the name and style of its layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Unit<'a> {
    pub name: &'a str,
    pub geometry: &'a Geometry,
    pub style: &'a Style,
}

/// Flatten every layer of `request` into drawable units, in layer then feature order.
///
/// Features without a geometry are counted in `report` and left out.
pub fn flatten<'a>(request: &'a ExportRequest, report: &mut EncodeReport) -> Vec<Unit<'a>> {
    let mut units = Vec::new();
    for layer in &request.layers {
        for feature in &layer.geojson.features {
            match feature.geometry {
                Some(ref geometry) => units.push(Unit {
                    name: &layer.name,
                    geometry,
                    style: &layer.style,
                }),
                None => report.features_without_geometry += 1,
            }
        }
    }
    units
}

/// Write the KMZ described by `request` into `dest_dir`.
///
/// Every geometry is encoded before anything touches the disk: a failure leaves no file
/// behind and is returned as [`Error::Export`].
pub fn export(request: &ExportRequest, dest_dir: &Path) -> Result<ExportOutcome, Error> {
    write_archive(request, dest_dir).map_err(|source| Error::Export {
        name: request.name.clone(),
        source: Box::new(source),
    })
}

fn write_archive(request: &ExportRequest, dest_dir: &Path) -> Result<ExportOutcome, Error> {
    let mut report = EncodeReport::default();
    let mut placemarks = Vec::new();

    if let Some(ref value) = request.aoi {
        let aoi = AreaOfInterest::from_json_value(value)?;
        placemarks.extend(encode_aoi(&aoi, &mut report)?);
    }
    for unit in flatten(request, &mut report) {
        placemarks.extend(encode_geometry(unit.name, unit.geometry, unit.style, &mut report)?);
    }
    if report.features_without_geometry > 0 {
        warn!(
            "{} feature(s) without geometry left out of '{}'",
            report.features_without_geometry, request.name
        );
    }

    let document = kml::render_document(&request.name, &placemarks)?;
    let path = archive::write_kmz(&output_path(dest_dir, &request.name), &document)?;
    info!(
        "exported {} placemark(s) from {} layer(s) to {}",
        placemarks.len(),
        request.layers.len(),
        path.display()
    );
    Ok(ExportOutcome {
        ok: true,
        path,
        placemarks: placemarks.len(),
        report,
    })
}

/// File stem for a suggested archive name.
///
/// A trailing `.kmz` is removed and anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn output_name(suggested: &str) -> String {
    let trimmed = suggested.trim();
    let stem = match trimmed.len().checked_sub(4) {
        Some(i) if trimmed.is_char_boundary(i) && trimmed[i..].eq_ignore_ascii_case(".kmz") => {
            &trimmed[..i]
        }
        _ => trimmed,
    };
    let name: String = stem
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();
    if name.is_empty() {
        config::DEFAULT_EXPORT_NAME.to_owned()
    } else {
        name
    }
}

/// Where the archive for a suggested name is written: `dest_dir/<name>.kmz`.
pub fn output_path(dest_dir: &Path, suggested: &str) -> PathBuf {
    dest_dir.join(format!("{}.{}", output_name(suggested), config::KMZ_EXTENSION))
}
