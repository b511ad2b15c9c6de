//! Output-side counterparts to [`crate::archive`] and [`crate::xml`], used
//! by the repair engines to rebuild a corrected EPUB ZIP / OPF document.

pub(crate) mod xml;
pub(crate) mod zip;

pub(crate) type WriterResult<T> = crate::error::OperationResult<T>;
