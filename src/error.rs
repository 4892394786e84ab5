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

use std::path::PathBuf;

use serde::Serialize;

/// Error raised while ingesting a vector source or exporting an archive
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Unsupported vector source: {0}")]
    UnsupportedFormat(String),
    #[error("AOI must be a Polygon/MultiPolygon Feature: {0}")]
    InvalidAoi(String),
    #[error("Reprojection from EPSG:{epsg} failed: {reason}")]
    Reprojection { epsg: u32, reason: String },
    #[error("Malformed {geometry} geometry: {reason}")]
    MalformedGeometry { geometry: String, reason: String },
    #[error("Invalid color '{0}', expected #rgb or #rrggbb")]
    InvalidColor(String),
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Failed to ingest {}: {source}", .path.display())]
    Ingest {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
    #[error("Failed to export '{name}': {source}")]
    Export {
        name: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// HTTP-style status for the error: 404 for missing sources, 400 for anything the caller
    /// supplied, 500 for failures on our side.
    pub fn status(&self) -> u16 {
        match *self {
            Error::SourceNotFound(..) => 404,
            Error::UnsupportedFormat(..)
            | Error::InvalidAoi(..)
            | Error::Reprojection { .. }
            | Error::MalformedGeometry { .. }
            | Error::InvalidColor(..) => 400,
            Error::Io(..) => 500,
            Error::Ingest { ref source, .. } | Error::Export { ref source, .. } => source.status(),
        }
    }

    /// The innermost error of a wrapped chain.
    pub fn root_cause(&self) -> &Error {
        match *self {
            Error::Ingest { ref source, .. } | Error::Export { ref source, .. } => {
                source.root_cause()
            }
            _ => self,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status: self.status(),
            detail: self.to_string(),
        }
    }

    pub(crate) fn malformed(geometry: &str, reason: impl Into<String>) -> Self {
        Error::MalformedGeometry {
            geometry: geometry.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// The single user-facing shape every failure is reported in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub detail: String,
}
