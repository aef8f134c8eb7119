//! Zip package holding the parts of a .docx file.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use tracing::{debug, trace};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::DocxError;

/// One zip entry, kept in memory.
#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// In-memory copy of a .docx zip package, entries in original order.
#[derive(Debug, Clone, Default)]
pub struct Package {
    entries: Vec<PackageEntry>,
}

impl Package {
    /// Read every entry of the package at `path`.
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        let file = File::open(path)?;
        let package = Self::from_reader(file)?;
        debug!(
            "Loaded package {} with {} entries",
            path.display(),
            package.entries.len()
        );
        Ok(package)
    }

    /// Read every entry from a zip stream.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            trace!("Read entry {} ({} bytes)", file.name(), data.len());
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                is_dir: file.is_dir(),
            });
        }

        Ok(Self { entries })
    }

    /// Names of all entries.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Raw bytes of an entry.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Replace the bytes of an existing entry, or append a new one.
    pub fn set(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(PackageEntry {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
                is_dir: false,
            }),
        }
    }

    /// Write the package to a zip stream.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W, DocxError> {
        let mut zip = ZipWriter::new(writer);

        for entry in &self.entries {
            let options = FileOptions::default().compression_method(entry.compression);
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(&entry.data)?;
        }

        Ok(zip.finish()?)
    }

    /// Write the package to a new file at `path`.
    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        let file = File::create(path)?;
        self.write_to(file)?;
        debug!("Wrote package {}", path.display());
        Ok(())
    }
}
