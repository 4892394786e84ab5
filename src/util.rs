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

use std::path::Path;

use crate::json::{JsonObject, JsonValue};
use crate::GeometryType;

/// Why a raw JSON value did not have the expected shape.
pub type Expected = String;

pub fn expect_object(value: &JsonValue) -> Result<&JsonObject, Expected> {
    match value.as_object() {
        Some(v) => Ok(v),
        None => Err("expected an object".to_owned()),
    }
}

pub fn expect_property<'a>(obj: &'a JsonObject, name: &str) -> Result<&'a JsonValue, Expected> {
    match obj.get(name) {
        Some(JsonValue::Null) | None => Err(format!("missing '{}' member", name)),
        Some(v) => Ok(v),
    }
}

pub fn expect_string<'a>(obj: &'a JsonObject, name: &str) -> Result<&'a str, Expected> {
    match expect_property(obj, name)? {
        JsonValue::String(s) => Ok(s),
        _ => Err(format!("'{}' must be a string", name)),
    }
}

/// Read the `type` member of a raw GeoJSON geometry object.
pub fn expect_geometry_type(obj: &JsonObject) -> Result<GeometryType, Expected> {
    let ty = expect_string(obj, "type")?;
    GeometryType::from_str(ty).ok_or_else(|| format!("unknown geometry type '{}'", ty))
}

/// The `properties.name` of a legacy GeoJSON `crs` member, if any.
///
/// `{"crs": {"type": "name", "properties": {"name": "EPSG:3857"}}}`
pub fn get_crs_name(foreign_members: Option<&JsonObject>) -> Option<&str> {
    foreign_members?
        .get("crs")?
        .as_object()?
        .get("properties")?
        .as_object()?
        .get("name")?
        .as_str()
}

/// Lower-cased extension of a path, with its leading dot.
pub fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// File name without extension, used as a default display name.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_owned()
}
