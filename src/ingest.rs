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

//! File to layer: read, reproject, encode, bound.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use log::info;

use crate::{config, crs, encode, source, util, BoundingBox, Error, Layer, Style};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestOptions {
    /// EPSG code that replaces whatever reference system the source declares.
    pub src_epsg: Option<u32>,
    /// Display name; defaults to the file name.
    pub name: Option<String>,
    pub id_prefix: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            src_epsg: None,
            name: None,
            id_prefix: config::INGEST_ID_PREFIX.to_owned(),
        }
    }
}

/// Read a vector file into a visible [`Layer`] with the default style.
///
/// Any failure is returned as [`Error::Ingest`] carrying the path and the original cause.
pub fn ingest<P: AsRef<Path>>(path: P, options: &IngestOptions) -> Result<Layer, Error> {
    let path = path.as_ref();
    build_layer(path, options).map_err(|source| Error::Ingest {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

fn build_layer(path: &Path, options: &IngestOptions) -> Result<Layer, Error> {
    let dataset = source::load(path)?;
    let normalized = crs::normalize(dataset, options.src_epsg)?;
    let geojson = encode::to_feature_collection(normalized.rows, &options.id_prefix);
    let bbox = BoundingBox::of_collection(&geojson);

    let name = match options.name {
        Some(ref name) if !name.trim().is_empty() => name.clone(),
        _ => path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .unwrap_or_else(|| util::file_stem(path)),
    };
    info!(
        "ingested {} feature(s) from {} (EPSG:{} {:?})",
        geojson.features.len(),
        path.display(),
        normalized.crs.epsg,
        normalized.crs.origin
    );
    Ok(Layer {
        id: layer_id(path),
        name,
        geojson,
        bbox,
        style: Style::default(),
        visible: true,
        source_crs: normalized.crs,
    })
}

/// Stable per path: ingesting the same file twice yields the same id.
pub fn layer_id(path: &Path) -> String {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    format!("layer_{:x}", hasher.finish() & 0xfff_ffff)
}
