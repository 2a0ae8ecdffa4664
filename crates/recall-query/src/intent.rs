//! Natural-language query intent analysis.
//!
//! Independent boolean detectors run over the lowercased query; the
//! primary intent is resolved by a fixed precedence (urgency > temporal >
//! trend > analytical > content type > semantic). Time context and content
//! types are extracted by ordered pattern lists where the order is part of
//! the contract and must not change.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use recall_core::config::QueryConfig;
use recall_core::types::{ContentType, UrgencyLevel};
use recall_vector::SearchFilters;

// =============================================================================
// Compiled pattern sets (compiled once, reused across calls)
// =============================================================================

struct DetectorPatterns {
    urgency: Vec<Regex>,
    temporal: Vec<Regex>,
    trend: Vec<Regex>,
    analytical: Vec<Regex>,
    aggregation: Vec<Regex>,
}

static DETECTOR_PATTERNS: LazyLock<DetectorPatterns> = LazyLock::new(|| {
    let mk = |pats: &[&str]| -> Vec<Regex> {
        pats.iter()
            .map(|p| Regex::new(p).expect("invalid detector regex"))
            .collect()
    };

    DetectorPatterns {
        urgency: mk(&[
            r"\burgent(ly)?\b",
            r"\basap\b",
            r"\bcritical\b",
            r"\bpriorit(y|ies)\b",
            r"\bimmediately\b",
            r"\bright\s+away\b",
            r"\bneeds?\s+attention\b",
            r"\bimportant\b",
        ]),
        temporal: mk(&[
            r"\btoday\b",
            r"\byesterday\b",
            r"\bthis\s+week\b",
            r"\blast\s+week\b",
            r"\bthis\s+month\b",
            r"\brecently\b",
            r"\blatest\b",
            r"\bwhen\s+did\b",
        ]),
        trend: mk(&[
            r"\btrend(s|ing)?\b",
            r"\bgrowing\b",
            r"\bpopular\b",
            r"\bincreasing\b",
            r"\bfrequent(ly)?\b",
            r"\bkeeps?\s+coming\s+back\b",
            r"\bpatterns?\b",
        ]),
        analytical: mk(&[
            r"\bhow\s+many\b",
            r"\bcount\b",
            r"\bsummar(y|ize|ise)\b",
            r"\boverview\b",
            r"\bbreakdown\b",
            r"\banaly(ze|se|sis)\b",
            r"\bstatistics\b",
            r"\btotal\b",
        ]),
        aggregation: mk(&[
            r"\ball\b",
            r"\beverything\b",
            r"\bevery\b",
            r"\blist\b",
            r"\bshow\s+me\b",
        ]),
    }
});

// Time context extraction: ordered, first match wins.
static TIME_PATTERNS: LazyLock<Vec<(Regex, TimeContext)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"\btoday\b").unwrap(), TimeContext::Today),
        (Regex::new(r"\byesterday\b").unwrap(), TimeContext::Yesterday),
        (Regex::new(r"\bthis\s+week\b").unwrap(), TimeContext::ThisWeek),
        (Regex::new(r"\blast\s+week\b").unwrap(), TimeContext::LastWeek),
        (Regex::new(r"\bthis\s+month\b").unwrap(), TimeContext::ThisMonth),
        (Regex::new(r"\brecently\b").unwrap(), TimeContext::Recently),
    ]
});

// Content type keyword families. More than one may match.
static TYPE_PATTERNS: LazyLock<Vec<(Regex, ContentType)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"\b(files?|documents?|pdfs?|attachments?|uploads?)\b").unwrap(),
            ContentType::File,
        ),
        (
            Regex::new(r"\b(links?|urls?|websites?|articles?|pages?|bookmarks?)\b").unwrap(),
            ContentType::Url,
        ),
        (
            Regex::new(r"\b(notes?|texts?|memos?|snippets?)\b").unwrap(),
            ContentType::Text,
        ),
    ]
});

// =============================================================================
// Analysis types
// =============================================================================

/// The dominant intent of a query, resolved by fixed precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryIntent {
    Urgency,
    Temporal,
    Trend,
    Analytical,
    ContentType,
    Semantic,
}

/// A named time window extracted from the query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeContext {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    Recently,
}

impl TimeContext {
    /// The `(since, until)` search window relative to `now`.
    pub fn window(&self, now: DateTime<Utc>) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        match self {
            TimeContext::Today => (Some(now - Duration::hours(24)), None),
            TimeContext::Yesterday => (
                Some(now - Duration::hours(48)),
                Some(now - Duration::hours(24)),
            ),
            TimeContext::ThisWeek => (Some(now - Duration::days(7)), None),
            TimeContext::LastWeek => {
                (Some(now - Duration::days(14)), Some(now - Duration::days(7)))
            }
            TimeContext::ThisMonth => (Some(now - Duration::days(30)), None),
            TimeContext::Recently => (Some(now - Duration::hours(72)), None),
        }
    }
}

/// The result of analyzing a free-text query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub query: String,
    pub primary_intent: PrimaryIntent,
    pub is_urgency: bool,
    pub is_temporal: bool,
    pub is_trend: bool,
    pub is_analytical: bool,
    /// Whether the query asks for a broad listing ("show me all ...").
    pub wants_aggregation: bool,
    pub time_context: Option<TimeContext>,
    /// Content types named in the query; zero or more.
    pub content_types: Vec<ContentType>,
}

// =============================================================================
// QueryAnalyzer
// =============================================================================

/// Rule-based query intent analyzer.
#[derive(Debug, Clone, Default)]
pub struct QueryAnalyzer;

impl QueryAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Run every detector over the lowercased query and resolve the
    /// primary intent by precedence, first true wins:
    /// urgency > temporal > trend > analytical > content type > semantic.
    pub fn analyze(&self, query: &str) -> QueryAnalysis {
        let lower = query.to_lowercase();
        let pats = &*DETECTOR_PATTERNS;

        let is_urgency = matches_any(&pats.urgency, &lower);
        let is_temporal = matches_any(&pats.temporal, &lower);
        let is_trend = matches_any(&pats.trend, &lower);
        let is_analytical = matches_any(&pats.analytical, &lower);
        let wants_aggregation = matches_any(&pats.aggregation, &lower);

        let time_context = TIME_PATTERNS
            .iter()
            .find(|(re, _)| re.is_match(&lower))
            .map(|(_, ctx)| *ctx);

        let content_types: Vec<ContentType> = TYPE_PATTERNS
            .iter()
            .filter(|(re, _)| re.is_match(&lower))
            .map(|(_, ct)| *ct)
            .collect();

        let primary_intent = if is_urgency {
            PrimaryIntent::Urgency
        } else if is_temporal {
            PrimaryIntent::Temporal
        } else if is_trend {
            PrimaryIntent::Trend
        } else if is_analytical {
            PrimaryIntent::Analytical
        } else if !content_types.is_empty() {
            PrimaryIntent::ContentType
        } else {
            PrimaryIntent::Semantic
        };

        QueryAnalysis {
            query: query.to_string(),
            primary_intent,
            is_urgency,
            is_temporal,
            is_trend,
            is_analytical,
            wants_aggregation,
            time_context,
            content_types,
        }
    }
}

/// Derive search filters and a result limit from a query analysis.
pub fn build_search_options(
    analysis: &QueryAnalysis,
    cfg: &QueryConfig,
    now: DateTime<Utc>,
) -> (SearchFilters, usize) {
    let limit = if analysis.wants_aggregation {
        cfg.aggregation_limit
    } else {
        cfg.default_limit
    };

    let mut filters = SearchFilters::default();

    if analysis.is_trend {
        filters.min_importance = Some(cfg.trend_min_importance);
    }
    if analysis.is_urgency {
        filters.urgency = Some(UrgencyLevel::High);
    }
    // A type filter only makes sense when exactly one type was named.
    if analysis.content_types.len() == 1 {
        filters.content_type = Some(analysis.content_types[0]);
    }
    if let Some(ctx) = analysis.time_context {
        let (since, until) = ctx.window(now);
        filters.since = since;
        filters.until = until;
    }

    (filters, limit)
}

fn matches_any(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(query: &str) -> QueryAnalysis {
        QueryAnalyzer::new().analyze(query)
    }

    #[test]
    fn test_urgency_intent() {
        let analysis = analyze("what's urgent?");
        assert!(analysis.is_urgency);
        assert_eq!(analysis.primary_intent, PrimaryIntent::Urgency);
    }

    #[test]
    fn test_temporal_intent() {
        let analysis = analyze("what did I save yesterday");
        assert!(analysis.is_temporal);
        assert_eq!(analysis.primary_intent, PrimaryIntent::Temporal);
        assert_eq!(analysis.time_context, Some(TimeContext::Yesterday));
    }

    #[test]
    fn test_urgency_beats_temporal() {
        let analysis = analyze("urgent items from this week");
        assert!(analysis.is_urgency);
        assert!(analysis.is_temporal);
        assert_eq!(analysis.primary_intent, PrimaryIntent::Urgency);
        // The time context is still extracted for filtering.
        assert_eq!(analysis.time_context, Some(TimeContext::ThisWeek));
    }

    #[test]
    fn test_trend_intent() {
        let analysis = analyze("what topics are trending for me");
        assert!(analysis.is_trend);
        assert_eq!(analysis.primary_intent, PrimaryIntent::Trend);
    }

    #[test]
    fn test_temporal_beats_trend() {
        let analysis = analyze("what was popular this week");
        assert_eq!(analysis.primary_intent, PrimaryIntent::Temporal);
    }

    #[test]
    fn test_analytical_intent() {
        let analysis = analyze("give me a breakdown of my content");
        assert!(analysis.is_analytical);
        assert_eq!(analysis.primary_intent, PrimaryIntent::Analytical);
    }

    #[test]
    fn test_content_type_intent() {
        let analysis = analyze("find that pdf about taxes");
        assert_eq!(analysis.primary_intent, PrimaryIntent::ContentType);
        assert_eq!(analysis.content_types, vec![ContentType::File]);
    }

    #[test]
    fn test_semantic_fallback() {
        let analysis = analyze("rust borrow checker");
        assert_eq!(analysis.primary_intent, PrimaryIntent::Semantic);
        assert!(analysis.content_types.is_empty());
        assert!(analysis.time_context.is_none());
    }

    #[test]
    fn test_multiple_content_types_detected() {
        let analysis = analyze("search my notes and links for recipes");
        assert_eq!(analysis.content_types.len(), 2);
        assert!(analysis.content_types.contains(&ContentType::Text));
        assert!(analysis.content_types.contains(&ContentType::Url));
    }

    #[test]
    fn test_time_context_first_match_wins() {
        // Both "today" and "this week" appear; "today" is checked first.
        let analysis = analyze("today and this week");
        assert_eq!(analysis.time_context, Some(TimeContext::Today));
    }

    #[test]
    fn test_aggregation_detection() {
        assert!(analyze("show me all my articles").wants_aggregation);
        assert!(!analyze("find the tax article").wants_aggregation);
    }

    #[test]
    fn test_detection_is_case_insensitive() {
        let analysis = analyze("URGENT: check THIS WEEK");
        assert_eq!(analysis.primary_intent, PrimaryIntent::Urgency);
        assert_eq!(analysis.time_context, Some(TimeContext::ThisWeek));
    }

    #[test]
    fn test_time_windows() {
        let now = Utc::now();

        let (since, until) = TimeContext::Today.window(now);
        assert_eq!(since, Some(now - Duration::hours(24)));
        assert_eq!(until, None);

        let (since, until) = TimeContext::Yesterday.window(now);
        assert_eq!(since, Some(now - Duration::hours(48)));
        assert_eq!(until, Some(now - Duration::hours(24)));

        let (since, until) = TimeContext::LastWeek.window(now);
        assert_eq!(since, Some(now - Duration::days(14)));
        assert_eq!(until, Some(now - Duration::days(7)));
    }

    #[test]
    fn test_options_default_limits() {
        let cfg = QueryConfig::default();
        let now = Utc::now();

        let (filters, limit) = build_search_options(&analyze("rust tips"), &cfg, now);
        assert_eq!(limit, 10);
        assert!(filters.min_importance.is_none());
        assert!(filters.urgency.is_none());
        assert!(filters.content_type.is_none());
        assert!(filters.since.is_none());
    }

    #[test]
    fn test_options_aggregation_raises_limit() {
        let cfg = QueryConfig::default();
        let (_, limit) = build_search_options(&analyze("list everything"), &cfg, Utc::now());
        assert_eq!(limit, 25);
    }

    #[test]
    fn test_options_urgency_sets_filter() {
        let cfg = QueryConfig::default();
        let (filters, _) = build_search_options(&analyze("what's urgent"), &cfg, Utc::now());
        assert_eq!(filters.urgency, Some(UrgencyLevel::High));
    }

    #[test]
    fn test_options_trend_sets_importance_threshold() {
        let cfg = QueryConfig::default();
        let (filters, _) =
            build_search_options(&analyze("what's trending"), &cfg, Utc::now());
        assert_eq!(filters.min_importance, Some(5.0));
    }

    #[test]
    fn test_options_single_type_sets_filter() {
        let cfg = QueryConfig::default();
        let (filters, _) =
            build_search_options(&analyze("find that article"), &cfg, Utc::now());
        assert_eq!(filters.content_type, Some(ContentType::Url));
    }

    #[test]
    fn test_options_multiple_types_set_no_filter() {
        let cfg = QueryConfig::default();
        let (filters, _) = build_search_options(
            &analyze("search notes and files for the contract"),
            &cfg,
            Utc::now(),
        );
        assert!(filters.content_type.is_none());
    }

    #[test]
    fn test_options_time_window_applied() {
        let cfg = QueryConfig::default();
        let now = Utc::now();
        let (filters, _) =
            build_search_options(&analyze("what did I save yesterday"), &cfg, now);
        assert_eq!(filters.since, Some(now - Duration::hours(48)));
        assert_eq!(filters.until, Some(now - Duration::hours(24)));
    }
}
