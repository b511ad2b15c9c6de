//! A thin wrapper over [`zip::ZipWriter`] used to rebuild a repaired EPUB
//! container.
//!
//! Grounded on `writer/zip.rs` in the teacher repo: entry names are
//! normalized (leading `/` stripped) before being handed to the underlying
//! writer, and [`Self::start_uncompressed_file`] is kept distinct from
//! [`Self::start_file`] so the `mimetype` entry (spec §4.7/§6.2: must be
//! first, `STORE`d, byte-exact) never risks picking up the default
//! compression method.

use crate::writer::WriterResult;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

pub(crate) struct ZipWriter<W: Write + std::io::Seek> {
    inner: zip::ZipWriter<W>,
    options: SimpleFileOptions,
}

impl<W: Write + std::io::Seek> ZipWriter<W> {
    pub(crate) fn new(writer: W, options: SimpleFileOptions) -> Self {
        Self {
            inner: zip::ZipWriter::new(writer),
            options,
        }
    }

    fn start_zip_file_entry(&mut self, name: &str, options: SimpleFileOptions) -> WriterResult<()> {
        // Strip leading '/' to avoid absolute paths in the archive.
        self.inner
            .start_file(name.trim_start_matches('/'), options)?;
        Ok(())
    }

    /// Starts a `STORE`d (uncompressed) entry, as the OCF spec requires for
    /// `mimetype`.
    pub(crate) fn start_uncompressed_file(&mut self, name: &str) -> WriterResult<()> {
        self.start_zip_file_entry(
            name,
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
        )
    }

    /// Starts an entry using this writer's default compression method.
    pub(crate) fn start_file(&mut self, name: &str) -> WriterResult<()> {
        self.start_zip_file_entry(name, self.options)
    }

    /// Writes an entry's bytes verbatim using this writer's default
    /// compression method. Every manifest entry a repair does not need to
    /// rewrite is carried across this way, so the repaired archive's
    /// unaffected entries stay content-identical to the source.
    pub(crate) fn write_file(&mut self, name: &str, contents: &[u8]) -> WriterResult<()> {
        self.start_file(name)?;
        self.write_all(contents)?;
        Ok(())
    }

    pub(crate) fn finish(self) -> WriterResult<W> {
        Ok(self.inner.finish()?)
    }
}

impl<W: Write + std::io::Seek> Write for ZipWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
