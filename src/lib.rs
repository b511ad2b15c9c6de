#![warn(missing_docs)]
//! # tomecheck
//! - Repository: <https://github.com/DevinSterling/tomecheck>
//!
//! A validator and safe-repair engine for **EPUB 3.x** (an OCF ZIP of XML/XHTML
//! resources) and well-formed **PDF 1.x** containers.
//!
//! `tomecheck` is built around a shared report model ([`report`]) produced by
//! two independent pipelines:
//! - [`epub`]: container → package document → navigation document →
//!   spine-referenced content documents → optional accessibility audit, plus
//!   a preview-then-apply repair engine that rewrites the archive bit-exactly
//!   where it doesn't need to change.
//! - [`pdf`]: header/trailer/xref/catalog structural checks, plus a narrow,
//!   conservative repair engine (three repairs only).
//!
//! # Validating an EPUB
//! ```no_run
//! use tomecheck::epub::{self, EpubValidationOptions};
//!
//! let report = epub::validate("book.epub", &EpubValidationOptions::new()).unwrap();
//! if !report.is_valid() {
//!     for error in report.errors() {
//!         println!("{}: {}", error.code(), error.message());
//!     }
//! }
//! ```
//!
//! # Repairing an EPUB
//! ```no_run
//! use tomecheck::epub::{self, EpubRepairOptions, EpubValidationOptions};
//!
//! let report = epub::validate("book.epub", &EpubValidationOptions::new()).unwrap();
//! let preview = epub::repair::preview(&report);
//!
//! if preview.can_auto_repair() {
//!     let result = epub::repair::apply("book.epub", &report, &EpubRepairOptions::new()).unwrap();
//!     assert!(result.success());
//! }
//! ```

pub mod cancellation;
pub mod epub;
pub mod error;
pub mod format;
pub mod pdf;
pub mod report;

mod archive;
mod util;
mod writer;
mod xml;

pub use cancellation::CancellationToken;
pub use error::{OperationError, OperationResult};
