//! trustmart-evidence: evidence retrieval and extraction for trust scoring.
//! - Search provider interface and the SerpApi client
//! - Price, brand/seller mention and image-domain extraction
//! - Concurrent, timeout-bounded collection per product

pub mod collector;
pub mod extract;
pub mod models;
pub mod sources;

pub use collector::EvidenceCollector;
pub use extract::{EvidenceExtractor, ImageLookup, RawEvidence};
pub use models::*;
pub use sources::{SearchError, SearchProvider, SearchResult};
