//! Content fingerprinting, dedup merging, and importance scoring.
//!
//! Everything in this crate is pure computation over submission histories:
//! deterministic fingerprints for dedup, full-recompute importance scores
//! with exponential time decay, urgency classification, and contextual
//! tagging.

pub mod fingerprint;
pub mod importance;
pub mod merge;

pub use fingerprint::{find_existing, fingerprint, normalize};
pub use importance::{
    analyze_patterns, assess_urgency, contextual_tags, score, SubmissionPatterns,
    UrgencyAssessment,
};
pub use merge::{merge_submission, new_item, rescore};
