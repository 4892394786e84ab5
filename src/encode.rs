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

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection};
use log::warn;

use crate::bbox::is_empty_geometry;
use crate::config;
use crate::source::Row;

/// Build the `Feature` of one row, or `None` if the row has no usable geometry.
///
/// The id is `{prefix}_{ordinal}`, `ordinal` being the row's zero-based position in the
/// source.
pub fn to_feature(row: Row, prefix: &str, ordinal: usize) -> Option<Feature> {
    let geometry = match row.geometry {
        Some(g) if !is_empty_geometry(&g.value) => g,
        _ => return None,
    };
    Some(Feature {
        bbox: None,
        geometry: Some(geometry),
        id: Some(Id::String(format!("{}_{}", prefix, ordinal))),
        properties: Some(row.properties),
        foreign_members: None,
    })
}

/// Convert rows to a FeatureCollection, keeping source order.
///
/// Rows with a null or empty geometry are skipped; they still consume their ordinal so ids
/// stay traceable to source rows.
pub fn to_feature_collection(rows: Vec<Row>, prefix: &str) -> FeatureCollection {
    let total = rows.len();
    let features: Vec<Feature> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(ordinal, row)| to_feature(row, prefix, ordinal))
        .collect();
    if features.len() < total {
        warn!(
            "skipped {} row(s) without geometry",
            total - features.len()
        );
    }
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// [`to_feature_collection`] with ids prefixed `feat`.
pub fn to_default_feature_collection(rows: Vec<Row>) -> FeatureCollection {
    to_feature_collection(rows, config::DEFAULT_ID_PREFIX)
}
