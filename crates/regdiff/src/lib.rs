//! Regulation-diff core engine.
//!
//! Given two PDF documents of numbered regulatory clauses (IFRS/AASB
//! style), this crate reconstructs a hierarchical clause tree per document
//! from positioned text fragments, aligns clauses across the documents by
//! normalized identifier, and produces word/sentence/paragraph diffs with
//! section-level coverage statistics.
//!
//! The pipeline is pure and single-threaded per document: fragments are
//! assembled into visual lines, page furniture is removed, superscripts
//! folded back into their hosts, section boundaries and the appendix
//! cutoff located, and clause labels parsed into a tree. Two documents may
//! be processed in parallel by the caller; they share nothing.
//!
//! ```no_run
//! use regdiff::{compare, extract_from_provider, Side, TuningConfig};
//! use regdiff::provider::StaticProvider;
//!
//! let config = TuningConfig::default();
//! let mut base = StaticProvider::new(vec![/* pages */]);
//! let mut compared = StaticProvider::new(vec![/* pages */]);
//! let base_doc = extract_from_provider(&mut base, Side::Base, &config)?;
//! let compared_doc = extract_from_provider(&mut compared, Side::Compared, &config)?;
//! let result = compare(&base_doc, &compared_doc);
//! # Ok::<(), regdiff::ExtractError>(())
//! ```

mod compare;
pub mod config;
pub mod error;
mod extract;
#[cfg(feature = "pdf")]
mod pdf;
pub mod provider;
pub mod store;
pub mod types;

pub use compare::compare;
pub use config::TuningConfig;
pub use error::{ExtractError, Result};
pub use extract::extract_from_provider;
#[cfg(feature = "pdf")]
pub use pdf::extract;
pub use types::{
    AnchorPoint, ClauseNode, ComparedSection, ComparisonResult, ComparisonRow, DiffKind, DiffToken,
    ExtractedDocument, ExtractedSection, ExtractionFlag, ExtractionIssue, PageLine, PageRange,
    PositionedFragment, RowStatus, SectionAnchor, SectionCoverage, SectionPageMap, SectionStatus,
    Side,
};
