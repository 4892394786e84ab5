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

//! # Introduction
//!
//! This crate is the geometry core of a map workspace backend. It works in two directions,
//! both speaking [GeoJSON](https://tools.ietf.org/html/rfc7946) through the
//! [`geojson`](https://docs.rs/geojson) crate types:
//!
//! * **ingestion**: read a vector file (GeoJSON, Shapefile, KML/KMZ), reproject it to
//!   WGS84 longitude/latitude, encode its rows as a `FeatureCollection` and compute its
//!   bounding box, producing a [`Layer`].
//! * **export**: take styled feature collections and an optional area of interest and write
//!   them as a single compressed KML document (a KMZ archive).
//!
//! # Example
//!
//! ```rust,no_run
//! use geolayer::{ingest, IngestOptions};
//!
//! let layer = ingest("parcels.shp", &IngestOptions::default()).unwrap();
//! if let Some([min_x, min_y, max_x, max_y]) = layer.bbox.to_array() {
//!     println!("{} spans {},{} .. {},{}", layer.name, min_x, min_y, max_x, max_y);
//! }
//! ```
//!
//! Exporting:
//!
//! ```rust,no_run
//! use geolayer::{export, ExportRequest};
//!
//! let request: ExportRequest = serde_json::from_str(r#"{"name":"site","layers":[]}"#).unwrap();
//! let outcome = export(&request, std::path::Path::new("/tmp")).unwrap();
//! println!("written to {}", outcome.path.display());
//! ```

mod json {
    pub use serde_json::{Map, Value as JsonValue};
    pub type JsonObject = Map<String, JsonValue>;
}

pub mod aoi;
pub mod archive;
pub mod bbox;
pub mod color;
pub mod config;
pub mod crs;
pub mod encode;
mod error;
pub mod export;
mod geometry;
pub mod ingest;
pub mod kml;
pub mod kml_reader;
mod model;
pub mod placemark;
pub mod source;
mod util;

pub use crate::aoi::AreaOfInterest;
pub use crate::bbox::BoundingBox;
pub use crate::error::{Error, ErrorResponse};
pub use crate::export::{export, EncodeReport, ExportOutcome};
pub use crate::geometry::GeometryType;
pub use crate::ingest::{ingest, IngestOptions};
pub use crate::model::{CrsOrigin, ExportRequest, Layer, LayerExport, SourceCrs, Style};

/// Positions are GeoJSON positions: longitude, latitude and an optional elevation.
pub type Position = geojson::Position;
