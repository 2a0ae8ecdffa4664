//! Template-based response composition.
//!
//! Turns ranked search results into a natural-language answer plus
//! structured insights. Every intent has its own template; the no-results
//! path suggests concrete ways to loosen the query.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use recall_core::types::UrgencyLevel;
use recall_vector::RankedResult;

use crate::intent::{PrimaryIntent, QueryAnalysis, TimeContext};

/// Result counts bucketed by importance score.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportanceDistribution {
    /// Score >= 7.0.
    pub high: usize,
    /// Score in [4.0, 7.0).
    pub medium: usize,
    /// Score < 4.0.
    pub low: usize,
}

/// Aggregate view over one result set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseInsights {
    pub total: usize,
    /// Contextual tags ranked by how many results carry them.
    pub trending_tags: Vec<(String, usize)>,
    /// Result counts per content type label.
    pub by_type: BTreeMap<String, usize>,
    pub importance: ImportanceDistribution,
    pub average_importance: f64,
}

/// A composed answer ready to show the user.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComposedResponse {
    pub message: String,
    /// Absent when no results matched.
    pub insights: Option<ResponseInsights>,
    /// Follow-up queries or ways to loosen a failed one.
    pub suggestions: Vec<String>,
}

const SNIPPET_LEN: usize = 80;
const MAX_TRENDING_TAGS: usize = 5;
const MAX_SUGGESTIONS: usize = 3;

/// Deterministic template composer.
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    /// How many results to name inline in the message.
    max_listed: usize,
}

impl Default for ResponseComposer {
    fn default() -> Self {
        Self { max_listed: 3 }
    }
}

impl ResponseComposer {
    pub fn new(max_listed: usize) -> Self {
        Self { max_listed }
    }

    /// Compose a response for the given analysis and ranked results.
    pub fn compose(&self, analysis: &QueryAnalysis, results: &[RankedResult]) -> ComposedResponse {
        if results.is_empty() {
            return self.no_results(analysis);
        }

        let insights = aggregate(results);
        let message = match analysis.primary_intent {
            PrimaryIntent::Urgency => self.urgency_message(results, &insights),
            PrimaryIntent::Temporal => self.temporal_message(analysis, results),
            PrimaryIntent::Trend => self.trend_message(results, &insights),
            PrimaryIntent::Analytical => self.analytical_message(&insights),
            PrimaryIntent::ContentType | PrimaryIntent::Semantic => {
                self.semantic_message(results)
            }
        };
        let suggestions = self.follow_ups(analysis, &insights);

        ComposedResponse {
            message,
            insights: Some(insights),
            suggestions,
        }
    }

    fn no_results(&self, analysis: &QueryAnalysis) -> ComposedResponse {
        let mut suggestions = Vec::new();
        if analysis.time_context.is_some() {
            suggestions.push("Drop the time filter and search all of history".to_string());
        }
        if !analysis.content_types.is_empty() {
            suggestions.push("Search across all content types".to_string());
        }
        if analysis.is_urgency {
            suggestions.push("Include non-urgent items as well".to_string());
        }
        suggestions.push("Try broader or different keywords".to_string());
        suggestions.truncate(MAX_SUGGESTIONS);

        ComposedResponse {
            message: format!("I couldn't find anything matching \"{}\".", analysis.query),
            insights: None,
            suggestions,
        }
    }

    fn urgency_message(&self, results: &[RankedResult], insights: &ResponseInsights) -> String {
        let urgent = results
            .iter()
            .filter(|r| r.metadata.urgency_level == UrgencyLevel::High)
            .count();
        let mut message = if urgent > 0 {
            format!(
                "{} of {} items need attention right now.",
                urgent, insights.total
            )
        } else {
            format!(
                "Nothing is marked urgent, but these {} items rank highest.",
                insights.total
            )
        };
        message.push_str(&self.listing(results));
        message
    }

    fn temporal_message(&self, analysis: &QueryAnalysis, results: &[RankedResult]) -> String {
        let period = match analysis.time_context {
            Some(TimeContext::Today) => "today",
            Some(TimeContext::Yesterday) => "yesterday",
            Some(TimeContext::ThisWeek) => "this week",
            Some(TimeContext::LastWeek) => "last week",
            Some(TimeContext::ThisMonth) => "this month",
            Some(TimeContext::Recently) => "the last few days",
            None => "that period",
        };
        let mut message = format!("Found {} items from {}.", results.len(), period);
        message.push_str(&self.listing(results));
        message
    }

    fn trend_message(&self, results: &[RankedResult], insights: &ResponseInsights) -> String {
        let mut message = format!("{} items show recurring activity.", insights.total);
        if let Some((tag, count)) = insights.trending_tags.first() {
            message.push_str(&format!(
                " The strongest signal is \"{}\" ({} items).",
                tag, count
            ));
        }
        message.push_str(&self.listing(results));
        message
    }

    fn analytical_message(&self, insights: &ResponseInsights) -> String {
        let by_type = insights
            .by_type
            .iter()
            .map(|(ty, count)| format!("{} {}", count, ty))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "You have {} matching items ({}). {} score high, {} medium, {} low; \
             average importance {:.1}.",
            insights.total,
            by_type,
            insights.importance.high,
            insights.importance.medium,
            insights.importance.low,
            insights.average_importance
        )
    }

    fn semantic_message(&self, results: &[RankedResult]) -> String {
        let mut message = format!("Found {} related items.", results.len());
        message.push_str(&self.listing(results));
        message
    }

    /// Inline listing of the top results with their ranking explanations.
    fn listing(&self, results: &[RankedResult]) -> String {
        let mut out = String::new();
        for result in results.iter().take(self.max_listed) {
            out.push_str(&format!(
                "\n- {} ({})",
                snippet(&result.document),
                result.explanation
            ));
        }
        out
    }

    fn follow_ups(&self, analysis: &QueryAnalysis, insights: &ResponseInsights) -> Vec<String> {
        let mut suggestions = Vec::new();
        if !analysis.is_urgency && insights.importance.high > 0 {
            suggestions.push("What's urgent?".to_string());
        }
        if analysis.time_context.is_none() {
            suggestions.push("What did I save this week?".to_string());
        }
        if !analysis.is_analytical {
            suggestions.push("Give me a breakdown of my content".to_string());
        }
        if !analysis.is_trend {
            suggestions.push("What's trending for me?".to_string());
        }
        suggestions.truncate(MAX_SUGGESTIONS);
        suggestions
    }
}

/// Compute aggregate insights over a non-empty result set.
pub fn aggregate(results: &[RankedResult]) -> ResponseInsights {
    let mut tag_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut importance = ImportanceDistribution::default();
    let mut score_sum = 0.0;

    for result in results {
        for tag in &result.metadata.tags {
            *tag_counts.entry(tag.as_str()).or_insert(0) += 1;
        }
        *by_type
            .entry(result.metadata.content_type.as_str().to_string())
            .or_insert(0) += 1;

        let score = result.metadata.importance_score;
        score_sum += score;
        if score >= 7.0 {
            importance.high += 1;
        } else if score >= 4.0 {
            importance.medium += 1;
        } else {
            importance.low += 1;
        }
    }

    let mut trending_tags: Vec<(String, usize)> = tag_counts
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect();
    // Highest count first; ties break alphabetically from the BTreeMap order.
    trending_tags.sort_by(|a, b| b.1.cmp(&a.1));
    trending_tags.truncate(MAX_TRENDING_TAGS);

    let total = results.len();
    ResponseInsights {
        total,
        trending_tags,
        by_type,
        importance,
        average_importance: if total > 0 {
            score_sum / total as f64
        } else {
            0.0
        },
    }
}

fn snippet(document: &str) -> String {
    let first_line = document.lines().next().unwrap_or_default();
    if first_line.chars().count() <= SNIPPET_LEN {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(SNIPPET_LEN).collect();
        format!("{}...", cut.trim_end())
    }
}
