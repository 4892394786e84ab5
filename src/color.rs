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

//! KML color encoding.
//!
//! KML orders channels alpha, blue, green, red (`aabbggrr`), the reverse of CSS `#rrggbbaa`.

use crate::Error;

/// Parse `#rgb` or `#rrggbb` (the `#` is optional) into its red, green and blue bytes.
pub fn parse_rgb(color: &str) -> Result<[u8; 3], Error> {
    let invalid = || Error::InvalidColor(color.to_owned());
    let hex = color.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_owned(),
        _ => return Err(invalid()),
    };
    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&expanded[2 * i..2 * i + 2], 16).map_err(|_| invalid())?;
    }
    Ok(rgb)
}

/// Alpha byte of an opacity in `[0, 1]`: `round(opacity * 255)`, clamped.
///
/// A NaN opacity is treated as fully transparent.
pub fn alpha(opacity: f64) -> u8 {
    if opacity.is_nan() {
        return 0;
    }
    (opacity * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Encode an RGB color and an opacity as a lowercase KML `aabbggrr` string.
pub fn abgr_hex(color: &str, opacity: f64) -> Result<String, Error> {
    let [r, g, b] = parse_rgb(color)?;
    Ok(format!("{:02x}{:02x}{:02x}{:02x}", alpha(opacity), b, g, r))
}
