//! Item creation and submission merging.
//!
//! A resubmission of known content never creates a second item: the new
//! submission is appended to the existing history and the item's score,
//! urgency, and tags are recomputed in full from the updated list. Nothing
//! here touches persistence; that is the caller's responsibility.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use recall_core::config::ScoringConfig;
use recall_core::types::{ContentItem, ContentMetadata, ContentType, Submission};

use crate::fingerprint::{fingerprint, normalize};
use crate::importance::{analyze_patterns, assess_urgency, contextual_tags, score};

/// Create a new content item from its first submission.
pub fn new_item(
    content_type: ContentType,
    raw_content: String,
    metadata: ContentMetadata,
    submission: Submission,
    cfg: &ScoringConfig,
    now: DateTime<Utc>,
) -> ContentItem {
    let normalized_content = normalize(&raw_content);
    let fp = fingerprint(&raw_content);

    let mut item = ContentItem {
        id: Uuid::new_v4(),
        content_type,
        timestamp: submission.timestamp,
        normalized_content,
        fingerprint: fp,
        raw_content,
        submissions: vec![submission],
        importance_score: cfg.base_score,
        urgency_level: Default::default(),
        urgency_reasons: vec![],
        contextual_tags: vec![],
        metadata,
    };
    rescore(&mut item, cfg, now);
    item
}

/// Merge a resubmission into an existing item.
///
/// Appends to the history, restores newest-first order, bumps the item
/// timestamp to the newest submission, and recomputes all derived fields.
pub fn merge_submission(
    item: &mut ContentItem,
    submission: Submission,
    cfg: &ScoringConfig,
    now: DateTime<Utc>,
) {
    item.submissions.push(submission);
    item.submissions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if let Some(newest) = item.submissions.first() {
        item.timestamp = newest.timestamp;
    }

    rescore(item, cfg, now);
    debug!(
        id = %item.id,
        submissions = item.submissions.len(),
        score = item.importance_score,
        "Merged resubmission"
    );
}

/// Recompute importance, urgency, and tags from the full submissions list.
///
/// The score must never be updated incrementally; it is always a pure
/// function of the current history.
pub fn rescore(item: &mut ContentItem, cfg: &ScoringConfig, now: DateTime<Utc>) {
    item.importance_score = score(&item.submissions, cfg, now);

    let patterns = analyze_patterns(&item.submissions, now);
    let assessment = assess_urgency(item.importance_score, &patterns, cfg);
    item.urgency_level = assessment.level;
    item.urgency_reasons = assessment.reasons;
    item.contextual_tags = contextual_tags(&patterns, item.submissions.len(), item.importance_score);
}
