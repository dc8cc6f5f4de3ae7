use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use openssl::sha::sha1;
use serde_json::Value;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::definition::{Barcode, DEFINITION_FILE};
use crate::error::PassError;
use crate::signing::SigningContext;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const SIGNATURE_FILE: &str = "signature";

/// Values forced into the definition regardless of what the bundle says.
#[derive(Clone, Debug)]
pub struct Overrides {
    serial_number: String,
}

impl Overrides {
    pub const fn new(serial_number: String) -> Self {
        Self { serial_number }
    }

    fn apply(&self, definition: &mut Value) {
        let Value::Object(definition) = definition else {
            return;
        };

        drop(definition.insert(
            "serialNumber".to_owned(),
            Value::String(self.serial_number.clone()),
        ));

        let barcode = Barcode::qr(&self.serial_number);
        if let Ok(barcode) = serde_json::to_value(barcode) {
            drop(definition.insert("barcodes".to_owned(), Value::Array(vec![barcode])));
        }
    }
}

/// Signs the bundle in `bundle_dir` and writes the archive to `out`.
///
/// The archive is written beside `out` and renamed into place once synced,
/// so `out` never holds a partial file.
pub fn package(
    bundle_dir: &Utf8Path,
    overrides: &Overrides,
    signing: &SigningContext,
    out: &Utf8Path,
) -> Result<(), PassError> {
    let mut files = read_bundle(bundle_dir)?;

    let mut definition: Value = serde_json::from_slice(
        files
            .get(DEFINITION_FILE)
            .map(Vec::as_slice)
            .unwrap_or(b"{}"),
    )?;
    overrides.apply(&mut definition);
    drop(files.insert(
        DEFINITION_FILE.to_owned(),
        serde_json::to_vec_pretty(&definition)?,
    ));

    let manifest: BTreeMap<&str, String> = files
        .iter()
        .map(|(name, bytes)| (name.as_str(), hex::encode(sha1(bytes))))
        .collect();
    let manifest = serde_json::to_vec(&manifest)?;
    let signature = signing.sign(&manifest)?;

    drop(files.insert(MANIFEST_FILE.to_owned(), manifest));
    drop(files.insert(SIGNATURE_FILE.to_owned(), signature));

    let partial = Utf8PathBuf::from(format!("{out}.partial"));
    if let Err(err) = write_archive(&partial, &files) {
        let _ignored = fs::remove_file(&partial);
        return Err(err);
    }
    fs::rename(&partial, out)?;

    Ok(())
}

fn read_bundle(bundle_dir: &Utf8Path) -> Result<BTreeMap<String, Vec<u8>>, PassError> {
    let mut files = BTreeMap::new();

    for entry in bundle_dir.read_dir_utf8()? {
        let entry = entry?;
        let name = entry.file_name();

        if name.starts_with('.') || name == MANIFEST_FILE || name == SIGNATURE_FILE {
            continue;
        }
        if !entry.file_type()?.is_file() {
            continue;
        }

        drop(files.insert(name.to_owned(), fs::read(entry.path())?));
    }

    Ok(files)
}

fn write_archive(path: &Utf8Path, files: &BTreeMap<String, Vec<u8>>) -> Result<(), PassError> {
    let mut archive = ZipWriter::new(File::create(path)?);
    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in files {
        archive.start_file(name.as_str(), options)?;
        archive.write_all(bytes)?;
    }

    archive.finish()?.sync_all()?;

    Ok(())
}
