//! Read-only ZIP (OCF) archive access shared by the container validator and
//! the orchestrator.
//!
//! Grounded on `archive.rs` / `ebook/archive/zip.rs` in the teacher repo:
//! a thin wrapper struct around [`zip::ZipArchive`] that normalizes lookup
//! errors into one local error type. The teacher additionally wraps a
//! directory-backed archive (`DirArchive`); that variant has no counterpart
//! here since inputs are always ZIP (§6 of the spec only allows a path or a
//! sized byte stream, both read as a ZIP).

use std::io::{Read, Seek};
use zip::CompressionMethod;

/// A single entry's identity, as seen while scanning the archive in its
/// natural (central-directory) order.
#[derive(Clone, Debug)]
pub(crate) struct EntryInfo {
    pub(crate) name: String,
    pub(crate) compression: CompressionMethod,
}

/// A read-only view over an EPUB's OCF ZIP container.
pub(crate) struct EpubArchive<R> {
    inner: zip::ZipArchive<R>,
}

impl<R: Read + Seek> EpubArchive<R> {
    /// Opens `reader` as a ZIP archive.
    pub(crate) fn open(reader: R) -> zip::result::ZipResult<Self> {
        Ok(Self {
            inner: zip::ZipArchive::new(reader)?,
        })
    }

    /// The number of entries in central-directory order.
    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }

    /// Entry metadata by central-directory index, in archive order.
    pub(crate) fn entry_info(&mut self, index: usize) -> zip::result::ZipResult<EntryInfo> {
        let file = self.inner.by_index(index)?;
        Ok(EntryInfo {
            name: file.name().to_owned(),
            compression: file.compression(),
        })
    }

    /// All entry names, in archive order.
    pub(crate) fn entry_names(&mut self) -> zip::result::ZipResult<Vec<String>> {
        (0..self.len())
            .map(|i| self.entry_info(i).map(|info| info.name))
            .collect()
    }

    /// `true` if an entry with this exact in-container path exists.
    pub(crate) fn contains(&mut self, path: &str) -> bool {
        self.inner.by_name(path).is_ok()
    }

    /// Reads an entry's raw bytes by its exact in-container path.
    pub(crate) fn read_bytes(&mut self, path: &str) -> zip::result::ZipResult<Vec<u8>> {
        let mut file = self.inner.by_name(path)?;
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Reads and UTF-8 decodes (lossily) an entry by its exact in-container
    /// path.
    pub(crate) fn read_string(&mut self, path: &str) -> zip::result::ZipResult<String> {
        let bytes = self.read_bytes(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn sample_zip() -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            writer.start_file("mimetype", stored).unwrap();
            writer.write_all(b"application/epub+zip").unwrap();
            writer.start_file("META-INF/container.xml", SimpleFileOptions::default()).unwrap();
            writer.write_all(b"<container/>").unwrap();
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_entry_order_and_lookup() {
        let mut archive = EpubArchive::open(Cursor::new(sample_zip())).unwrap();
        let names = archive.entry_names().unwrap();
        assert_eq!(vec!["mimetype", "META-INF/container.xml"], names);

        let info = archive.entry_info(0).unwrap();
        assert_eq!(CompressionMethod::Stored, info.compression);
        assert_eq!(b"application/epub+zip".to_vec(), archive.read_bytes("mimetype").unwrap());
        assert!(archive.contains("META-INF/container.xml"));
        assert!(!archive.contains("nope"));
    }
}
