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

//! KMZ archives: a zip holding one KML document.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::{config, Error};

/// Write `kml` as the single `doc.kml` entry of a KMZ at `dest`, replacing any file there.
///
/// The archive is built in a temporary file next to `dest` and renamed into place once
/// complete, so `dest` is either untouched or holds the full archive.
pub fn write_kmz(dest: &Path, kml: &[u8]) -> Result<PathBuf, Error> {
    let dir = match dest.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut zip = ZipWriter::new(tmp.as_file_mut());
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(config::KMZ_DOCUMENT_ENTRY, options)
            .map_err(zip_error)?;
        zip.write_all(kml)?;
        zip.finish().map_err(zip_error)?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| Error::Io(e.error.to_string()))?;
    debug!("wrote {} ({} bytes of KML)", dest.display(), kml.len());
    Ok(dest.to_path_buf())
}

/// Read the KML document of a KMZ: `doc.kml` when present, else the first `.kml` entry.
pub fn read_kml(path: &Path) -> Result<String, Error> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| Error::UnsupportedFormat(format!("invalid KMZ archive: {}", e)))?;

    let entry = if archive.file_names().any(|n| n == config::KMZ_DOCUMENT_ENTRY) {
        Some(config::KMZ_DOCUMENT_ENTRY.to_owned())
    } else {
        let mut names: Vec<&str> = archive
            .file_names()
            .filter(|n| n.to_lowercase().ends_with(".kml"))
            .collect();
        names.sort_unstable();
        names.first().map(|n| (*n).to_owned())
    };
    let entry = match entry {
        Some(entry) => entry,
        None => {
            return Err(Error::UnsupportedFormat(
                "KMZ does not contain any .kml file.".to_owned(),
            ))
        }
    };

    let mut bytes = Vec::new();
    archive
        .by_name(&entry)
        .map_err(zip_error)?
        .read_to_end(&mut bytes)?;
    debug!("read {} from {}", entry, path.display());
    String::from_utf8(bytes)
        .map_err(|_| Error::UnsupportedFormat(format!("{} in KMZ is not UTF-8 text", entry)))
}

fn zip_error(err: zip::result::ZipError) -> Error {
    Error::Io(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn written_archive_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("site.kmz");
        let kml = b"<kml><Document><name>Site</name></Document></kml>";
        assert_eq!(write_kmz(&dest, kml).unwrap(), dest);

        let mut archive = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(
            archive.by_index(0).unwrap().compression(),
            CompressionMethod::Deflated
        );
        assert_eq!(read_kml(&dest).unwrap().as_bytes(), &kml[..]);
        // nothing but the archive is left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("site.kmz");
        write_kmz(&dest, b"<kml><Document><name>first</name></Document></kml>").unwrap();
        write_kmz(&dest, b"<kml><Document><name>second</name></Document></kml>").unwrap();
        let kml = read_kml(&dest).unwrap();
        assert!(kml.contains("second"));
        assert!(!kml.contains("first"));
    }

    #[test]
    fn kml_entry_is_found_without_doc_kml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.kmz");
        {
            let mut zip = ZipWriter::new(File::create(&path).unwrap());
            let options = FileOptions::default();
            zip.start_file("images/icon.png", options).unwrap();
            zip.write_all(b"png").unwrap();
            zip.start_file("layers/roads.KML", options).unwrap();
            zip.write_all(b"<kml/>").unwrap();
            zip.finish().unwrap();
        }
        assert_eq!(read_kml(&path).unwrap(), "<kml/>");
    }

    #[test]
    fn archives_without_kml_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.kmz");
        {
            let mut zip = ZipWriter::new(File::create(&path).unwrap());
            zip.start_file("readme.txt", FileOptions::default()).unwrap();
            zip.write_all(b"nothing").unwrap();
            zip.finish().unwrap();
        }
        assert_eq!(
            read_kml(&path),
            Err(Error::UnsupportedFormat(
                "KMZ does not contain any .kml file.".to_owned()
            ))
        );

        let garbage = dir.path().join("garbage.kmz");
        fs::write(&garbage, "not a zip").unwrap();
        assert!(matches!(read_kml(&garbage), Err(Error::UnsupportedFormat(..))));
    }

    #[test]
    fn binary_kml_entry_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.kmz");
        write_kmz(&path, &[0xff, 0xfe, 0x00, 0x7b]).unwrap();
        assert_eq!(
            read_kml(&path),
            Err(Error::UnsupportedFormat(
                "doc.kml in KMZ is not UTF-8 text".to_owned()
            ))
        );
    }

    #[test]
    fn missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("site.kmz");
        assert!(matches!(write_kmz(&dest, b"<kml/>"), Err(Error::Io(..))));
        assert!(!dest.exists());
    }
}
