//! Minimal WordprocessingML (.docx) reader and writer.
//!
//! Only what marker substitution needs is modelled: paragraphs, runs,
//! tables and the header/footer parts referenced by section properties.
//! Every other package entry is copied through unchanged.

mod document;
mod package;
mod paragraph;
mod xml;

#[cfg(test)]
pub(crate) mod fixtures;

pub use document::{Document, RegionLocation, SectionParts};
pub use package::Package;
pub use paragraph::{Paragraph, RunFormat, run_text};
