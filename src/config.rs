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

//! Named constants shared by the ingestion and export pipelines.

/// WGS84 longitude/latitude, the only reference system coordinates leave the crate in.
pub const CANONICAL_EPSG: u32 = 4326;

/// Feature id prefix when the caller does not supply one.
pub const DEFAULT_ID_PREFIX: &str = "feat";
/// Feature id prefix used by file ingestion.
pub const INGEST_ID_PREFIX: &str = "ing";

pub const DEFAULT_STROKE_COLOR: &str = "#22c55e";
pub const DEFAULT_STROKE_WIDTH: u32 = 4;
pub const DEFAULT_FILL_OPACITY: f64 = 0.2;

/// Area of interest styling, applied regardless of what the caller asks for.
pub const AOI_NAME: &str = "AOI";
pub const AOI_FILL_COLOR: &str = "#ff9aa2";
pub const AOI_FILL_OPACITY: f64 = 0.3;
pub const AOI_STROKE_COLOR: &str = "#ff5a5f";
pub const AOI_STROKE_WIDTH: u32 = 2;

pub const DEFAULT_EXPORT_NAME: &str = "export";
pub const DEFAULT_LAYER_NAME: &str = "Layer";
pub const KMZ_EXTENSION: &str = "kmz";
/// Name of the single KML entry inside an exported KMZ.
pub const KMZ_DOCUMENT_ENTRY: &str = "doc.kml";
pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Proj definitions resolved without consulting the EPSG registry.
///
/// EPSG:3857 is Web Mercator on a sphere; the ellipsoidal variant shifts features north.
/// 102100 and 102113 are the ESRI codes `.prj` files commonly carry for it.
pub const KNOWN_CRS: &[(u32, &str)] = &[
    (4326, "+proj=longlat +datum=WGS84 +no_defs +type=crs"),
    (4269, "+proj=longlat +datum=NAD83 +no_defs +type=crs"),
    (
        3857,
        "+proj=merc +a=6378137 +b=6378137 +lat_ts=0.0 +lon_0=0.0 +x_0=0 +y_0=0 +k=1.0 \
         +units=m +no_defs +type=crs",
    ),
];

pub const WEB_MERCATOR_ALIASES: &[u32] = &[102100, 102113];

/// Share of sampled coordinate pairs that must fall in degree range for a source to
/// "look like" longitude/latitude.
pub const DEGREE_LIKE_RATIO: f64 = 0.7;
/// Maximum number of coordinate pairs sampled by the degree heuristic.
pub const DEGREE_SAMPLE_PAIRS: usize = 1000;
