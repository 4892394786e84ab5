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

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;
use serde_json::json;

use geolayer::source::{self, SourceFormat};
use geolayer::{export, ingest, AreaOfInterest, Error, ExportRequest, IngestOptions};

/// Vector layer ingestion and KMZ export. Results are printed as JSON on stdout.
#[derive(Parser)]
#[command(name = "geolayer", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read a GeoJSON, Shapefile, KML or KMZ file into a layer
    Ingest {
        path: PathBuf,
        /// EPSG code of the source coordinates, replacing what the file declares
        #[arg(long)]
        epsg: Option<u32>,
        /// Display name of the layer
        #[arg(long)]
        name: Option<String>,
    },
    /// Write the KMZ described by a JSON export request
    Export {
        request: PathBuf,
        #[arg(long, env = "UR_EXPORT_DIR", default_value = ".")]
        out_dir: PathBuf,
    },
    /// Validate an area of interest from a KML/KMZ file or a GeoJSON Feature file
    Aoi { path: PathBuf },
    /// Print the service name and version
    Version,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let response = err.to_response();
            eprintln!(
                "{}",
                serde_json::to_string(&response).unwrap_or_else(|_| response.detail.clone())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<String, Error> {
    match command {
        Command::Ingest { path, epsg, name } => {
            let options = IngestOptions {
                src_epsg: epsg,
                name,
                ..IngestOptions::default()
            };
            to_json(&ingest(&path, &options)?)
        }
        Command::Export { request, out_dir } => {
            debug!("export request {}", request.display());
            let text = read(&request)?;
            let request: ExportRequest = serde_json::from_str(&text)
                .map_err(|e| Error::UnsupportedFormat(format!("invalid export request: {}", e)))?;
            to_json(&export(&request, &out_dir)?)
        }
        Command::Aoi { path } => {
            let aoi = match SourceFormat::from_path(&path) {
                Ok(SourceFormat::Kml) | Ok(SourceFormat::Kmz) => {
                    AreaOfInterest::from_kml_file(&path)?
                }
                _ => {
                    let value: serde_json::Value = serde_json::from_str(&read(&path)?)
                        .map_err(|e| Error::InvalidAoi(e.to_string()))?;
                    AreaOfInterest::from_json_value(&value)?
                }
            };
            to_json(&aoi.to_feature())
        }
        Command::Version => to_json(&json!({
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    }
}

fn read(path: &Path) -> Result<String, Error> {
    if !path.is_file() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }
    source::read_text(path)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Io(e.to_string()))
}
