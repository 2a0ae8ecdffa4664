use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// The kind of captured content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Free text (notes, memos, pasted snippets).
    Text,
    /// A web link with scraped metadata.
    Url,
    /// An uploaded file with extracted text.
    File,
}

impl ContentType {
    /// Stable string form used in log fields and response breakdowns.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Url => "url",
            ContentType::File => "file",
        }
    }
}

/// Urgency classification derived from importance and submission velocity.
///
/// Variants are ordered so that `Normal < Medium < High`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    #[default]
    Normal,
    Medium,
    High,
}

impl UrgencyLevel {
    /// The weight this level contributes to the composite ranking score.
    ///
    /// These weights are part of the ranking contract and are deliberately
    /// not configurable.
    pub fn multiplier(&self) -> f64 {
        match self {
            UrgencyLevel::High => 1.0,
            UrgencyLevel::Medium => 0.7,
            UrgencyLevel::Normal => 0.5,
        }
    }
}

/// Rate of recent resubmission for a content item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Velocity {
    /// Fewer than two submissions; no rate to speak of.
    #[default]
    None,
    Low,
    Medium,
    High,
}

/// Direction of change in the inter-submission interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Submissions are arriving faster over time.
    Increasing,
    #[default]
    Stable,
    /// Submissions are spacing out.
    Decreasing,
}

// =============================================================================
// Newtype Wrappers
// =============================================================================

/// Deterministic hash of normalized content, used as the dedup key.
///
/// Not collision-free and not cryptographic. Two items with the same
/// fingerprint are treated as the same logical content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub String);

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// Metadata scraped from a URL by the content-processing collaborator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlMetadata {
    pub url: String,
    pub domain: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Metadata extracted from an uploaded file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub size_bytes: Option<u64>,
    /// Text pulled out of the file (PDF/DOCX/OCR), if any.
    pub extracted_text: Option<String>,
}

/// Producer-specific metadata attached to a content item.
///
/// A tagged union rather than an open dictionary so that filtering and
/// projection stay type-safe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentMetadata {
    Text { title: Option<String> },
    Url(UrlMetadata),
    File(FileMetadata),
}

impl Default for ContentMetadata {
    fn default() -> Self {
        ContentMetadata::Text { title: None }
    }
}

impl ContentMetadata {
    pub fn title(&self) -> Option<&str> {
        match self {
            ContentMetadata::Text { title } => title.as_deref(),
            ContentMetadata::Url(meta) => meta.title.as_deref(),
            ContentMetadata::File(meta) => Some(meta.file_name.as_str()),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            ContentMetadata::Url(meta) => meta.description.as_deref(),
            _ => None,
        }
    }

    pub fn keywords(&self) -> &[String] {
        match self {
            ContentMetadata::Url(meta) => &meta.keywords,
            _ => &[],
        }
    }

    pub fn extracted_text(&self) -> Option<&str> {
        match self {
            ContentMetadata::File(meta) => meta.extracted_text.as_deref(),
            _ => None,
        }
    }

    pub fn domain(&self) -> Option<&str> {
        match self {
            ContentMetadata::Url(meta) => meta.domain.as_deref(),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            ContentMetadata::Url(meta) => Some(meta.url.as_str()),
            _ => None,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match self {
            ContentMetadata::File(meta) => Some(meta.file_name.as_str()),
            _ => None,
        }
    }
}

// =============================================================================
// Entity Structs
// =============================================================================

/// One timestamped occurrence of a fingerprint being ingested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub timestamp: DateTime<Utc>,
    /// Originating source (e.g., "note", "clipboard", "email").
    pub source: String,
    /// The content type this occurrence arrived as.
    pub kind: ContentType,
    /// Free-form note attached by the submitting collaborator.
    pub note: Option<String>,
}

impl Submission {
    pub fn new(timestamp: DateTime<Utc>, source: impl Into<String>, kind: ContentType) -> Self {
        Self {
            timestamp,
            source: source.into(),
            kind,
            note: None,
        }
    }
}

/// One logical piece of captured content.
///
/// Invariants:
/// - `id` is assigned at first ingestion and never changes.
/// - `submissions` is sorted newest-first and only ever grows.
/// - `importance_score` is always a pure function of the current
///   `submissions` list, recomputed in full on every mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub content_type: ContentType,
    pub raw_content: String,
    pub normalized_content: String,
    pub fingerprint: Fingerprint,
    /// Timestamp of the newest submission.
    pub timestamp: DateTime<Utc>,
    /// Submission history, newest-first.
    pub submissions: Vec<Submission>,
    /// Bounded importance in [1.0, 10.0].
    pub importance_score: f64,
    pub urgency_level: UrgencyLevel,
    /// Human-readable cause codes for the urgency level.
    pub urgency_reasons: Vec<String>,
    /// Up to 3 labels derived from submission patterns.
    pub contextual_tags: Vec<String>,
    pub metadata: ContentMetadata,
}

impl ContentItem {
    pub fn submission_count(&self) -> usize {
        self.submissions.len()
    }

    /// Timestamp of the most recent submission, if any.
    pub fn last_submitted(&self) -> Option<DateTime<Utc>> {
        self.submissions.first().map(|s| s.timestamp)
    }
}
