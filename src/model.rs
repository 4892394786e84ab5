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

use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::json::{JsonObject, JsonValue};
use crate::BoundingBox;

/// Drawing style of a layer: `{color, width, fillColor, fillOpacity}`.
///
/// Stroke is always drawn opaque; only the fill carries an opacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default = "default_fill_opacity")]
    pub fill_opacity: f64,
}

impl Style {
    /// The fill color, falling back to the stroke color.
    pub fn fill_color(&self) -> &str {
        self.fill_color.as_deref().unwrap_or(&self.color)
    }
}

impl Default for Style {
    fn default() -> Self {
        Style {
            color: default_color(),
            width: default_width(),
            fill_color: Some(default_color()),
            fill_opacity: default_fill_opacity(),
        }
    }
}

fn default_color() -> String {
    config::DEFAULT_STROKE_COLOR.to_owned()
}

fn default_width() -> u32 {
    config::DEFAULT_STROKE_WIDTH
}

fn default_fill_opacity() -> f64 {
    config::DEFAULT_FILL_OPACITY
}

/// Where the reference system a source was read in came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrsOrigin {
    /// The source's own metadata named it.
    Declared,
    /// The caller named it, replacing whatever the source declared.
    Override,
    /// Nobody named it; WGS84 was assumed.
    Assumed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCrs {
    pub epsg: u32,
    pub origin: CrsOrigin,
}

/// An ingested vector layer, ready to be handed to the map client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub geojson: FeatureCollection,
    pub bbox: BoundingBox,
    pub style: Style,
    pub visible: bool,
    pub source_crs: SourceCrs,
}

/// One styled collection of an export request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerExport {
    #[serde(default = "default_layer_name")]
    pub name: String,
    pub geojson: FeatureCollection,
    #[serde(default)]
    pub style: Style,
}

fn default_layer_name() -> String {
    config::DEFAULT_LAYER_NAME.to_owned()
}

/// Everything needed to produce one KMZ archive.
///
/// The AOI is kept as raw JSON so that a malformed AOI is reported as such instead of
/// failing the whole request at deserialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aoi: Option<JsonValue>,
    #[serde(default)]
    pub layers: Vec<LayerExport>,
    #[serde(default = "default_export_name")]
    pub name: String,
    /// Format specific options, reserved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<JsonObject>,
}

fn default_export_name() -> String {
    config::DEFAULT_EXPORT_NAME.to_owned()
}
