//! Importance scoring from submission history.
//!
//! All functions here are pure and total: they take a submissions list and
//! an explicit `now`, and never fail. An empty history scores the base
//! value with `Velocity::None`.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use recall_core::config::ScoringConfig;
use recall_core::types::{Submission, Trend, UrgencyLevel, Velocity};

/// Trend ratio below which intervals are considered to be shrinking.
const TREND_INCREASING_RATIO: f64 = 0.7;
/// Trend ratio above which intervals are considered to be widening.
const TREND_DECREASING_RATIO: f64 = 1.3;

/// Patterns extracted from a submission history.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SubmissionPatterns {
    pub velocity: Velocity,
    pub trend: Trend,
    /// Submission count per originating source.
    pub sources: HashMap<String, usize>,
    /// Hours between the earliest and latest submission.
    pub time_span_hours: f64,
}

impl SubmissionPatterns {
    pub fn time_span_days(&self) -> f64 {
        self.time_span_hours / 24.0
    }
}

/// Urgency classification with human-readable cause codes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UrgencyAssessment {
    pub level: UrgencyLevel,
    pub reasons: Vec<String>,
}

/// Compute the bounded importance score of a submission history.
///
/// Each submission contributes an exponentially time-decayed unit
/// (half-life `decay_half_life_hours`). The sum is multiplied by a
/// piecewise frequency factor, then a velocity bonus (resubmissions inside
/// 24 hours) and a recency boost (age of the newest submission) are added.
/// The total is clamped to `[base_score, max_score]`.
pub fn score(submissions: &[Submission], cfg: &ScoringConfig, now: DateTime<Utc>) -> f64 {
    if submissions.is_empty() {
        return cfg.base_score;
    }

    let decay_sum: f64 = submissions
        .iter()
        .map(|s| {
            let hours = hours_ago(s.timestamp, now);
            0.5f64.powf(hours / cfg.decay_half_life_hours)
        })
        .sum();

    let mut total = decay_sum * frequency_multiplier(submissions.len());

    // Velocity bonus: resubmissions within the last 24 hours.
    let recent = count_within(submissions, now, Duration::hours(24));
    if recent >= 2 {
        let bonus = ((recent - 1) as f64 * cfg.velocity_bonus_step).min(cfg.velocity_bonus_cap);
        total += bonus;
    }

    // Recency boost: only meaningful once the item has been seen again.
    if submissions.len() >= 2 {
        if let Some(newest) = submissions.iter().map(|s| s.timestamp).max() {
            let age = hours_ago(newest, now);
            total += if age <= 1.0 {
                cfg.recency_boost_1h
            } else if age <= 6.0 {
                cfg.recency_boost_6h
            } else if age <= 24.0 {
                cfg.recency_boost_24h
            } else {
                0.0
            };
        }
    }

    total.clamp(cfg.base_score, cfg.max_score)
}

/// Piecewise frequency multiplier keyed to submission count.
///
/// Breakpoints are empirically chosen and preserved as-is:
/// 1 -> 1.0, 2 -> 2.0, 3 -> 3.2, 4-5 -> 1.5 + 0.8*count,
/// >= 6 -> 6.0 + ln(count - 4) * 0.5.
fn frequency_multiplier(count: usize) -> f64 {
    match count {
        0 | 1 => 1.0,
        2 => 2.0,
        3 => 3.2,
        4 | 5 => 1.5 + count as f64 * 0.8,
        n => 6.0 + ((n - 4) as f64).ln() * 0.5,
    }
}

/// Extract velocity, trend, source counts, and time span from a history.
pub fn analyze_patterns(submissions: &[Submission], now: DateTime<Utc>) -> SubmissionPatterns {
    let day = count_within(submissions, now, Duration::hours(24));
    let week = count_within(submissions, now, Duration::days(7));

    let velocity = if submissions.len() < 2 {
        Velocity::None
    } else if day >= 3 {
        Velocity::High
    } else if day == 2 || week >= 4 {
        Velocity::Medium
    } else {
        Velocity::Low
    };

    let mut sources: HashMap<String, usize> = HashMap::new();
    for s in submissions {
        *sources.entry(s.source.clone()).or_insert(0) += 1;
    }

    let time_span_hours = match (
        submissions.iter().map(|s| s.timestamp).min(),
        submissions.iter().map(|s| s.timestamp).max(),
    ) {
        (Some(earliest), Some(latest)) => duration_hours(latest - earliest),
        _ => 0.0,
    };

    SubmissionPatterns {
        velocity,
        trend: detect_trend(submissions),
        sources,
        time_span_hours,
    }
}

/// Compare the mean inter-submission interval of the newer half of the
/// history against the older half. A ratio below 0.7 means the intervals
/// are shrinking (growing interest); above 1.3 they are widening.
///
/// Requires at least 4 submissions to form two comparable halves.
fn detect_trend(submissions: &[Submission]) -> Trend {
    if submissions.len() < 4 {
        return Trend::Stable;
    }

    // Timestamps newest-first; sort defensively in case the caller did not.
    let mut stamps: Vec<DateTime<Utc>> = submissions.iter().map(|s| s.timestamp).collect();
    stamps.sort_by(|a, b| b.cmp(a));

    let intervals: Vec<f64> = stamps
        .windows(2)
        .map(|w| duration_hours(w[0] - w[1]))
        .collect();

    let mid = intervals.len() / 2;
    let newer_avg = mean(&intervals[..mid]);
    let older_avg = mean(&intervals[mid..]);

    if older_avg <= 0.0 {
        return Trend::Stable;
    }

    let ratio = newer_avg / older_avg;
    if ratio < TREND_INCREASING_RATIO {
        Trend::Increasing
    } else if ratio > TREND_DECREASING_RATIO {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Classify urgency from the importance score and submission patterns.
///
/// A score at or above `high_urgency_score` is high urgency outright. High
/// velocity promotes an otherwise-medium item to high.
pub fn assess_urgency(
    score: f64,
    patterns: &SubmissionPatterns,
    cfg: &ScoringConfig,
) -> UrgencyAssessment {
    let mut reasons = Vec::new();

    let mut level = if score >= cfg.high_urgency_score {
        reasons.push(format!(
            "importance score {:.1} is at or above {:.1}",
            score, cfg.high_urgency_score
        ));
        UrgencyLevel::High
    } else if score >= cfg.medium_urgency_score {
        reasons.push(format!(
            "importance score {:.1} is at or above {:.1}",
            score, cfg.medium_urgency_score
        ));
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Normal
    };

    if patterns.velocity == Velocity::High {
        reasons.push("high resubmission velocity in the last 24 hours".to_string());
        if level == UrgencyLevel::Medium {
            level = UrgencyLevel::High;
        }
    }

    UrgencyAssessment { level, reasons }
}

/// Derive up to 3 human-readable labels from submission patterns.
///
/// Rules are evaluated in a fixed order and the first 3 matches win;
/// reordering would change observable output.
pub fn contextual_tags(
    patterns: &SubmissionPatterns,
    submission_count: usize,
    score: f64,
) -> Vec<String> {
    let rules: [(bool, &str); 6] = [
        (patterns.sources.len() >= 3, "researched thoroughly"),
        (submission_count >= 5, "keeps coming back"),
        (patterns.trend == Trend::Increasing, "growing interest"),
        (patterns.velocity == Velocity::High, "active right now"),
        (score >= 8.0, "top of mind"),
        (patterns.time_span_hours >= 168.0, "long-running interest"),
    ];

    rules
        .iter()
        .filter(|(matched, _)| *matched)
        .take(3)
        .map(|(_, label)| label.to_string())
        .collect()
}

fn count_within(submissions: &[Submission], now: DateTime<Utc>, window: Duration) -> usize {
    let cutoff = now - window;
    submissions.iter().filter(|s| s.timestamp >= cutoff).count()
}

fn hours_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    duration_hours(now - timestamp).max(0.0)
}

fn duration_hours(d: Duration) -> f64 {
    d.num_seconds() as f64 / 3600.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::types::ContentType;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default()
    }

    /// Build a history with the given ages in hours, newest-first.
    fn history(now: DateTime<Utc>, hours_ago: &[i64]) -> Vec<Submission> {
        history_from(now, hours_ago, "note")
    }

    fn history_from(now: DateTime<Utc>, hours_ago: &[i64], source: &str) -> Vec<Submission> {
        let mut subs: Vec<Submission> = hours_ago
            .iter()
            .map(|h| Submission::new(now - Duration::hours(*h), source, ContentType::Text))
            .collect();
        subs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        subs
    }

    #[test]
    fn test_empty_history_scores_base() {
        let now = Utc::now();
        assert_eq!(score(&[], &cfg(), now), 1.0);
    }

    #[test]
    fn test_single_fresh_submission_scores_base() {
        let now = Utc::now();
        let subs = history(now, &[0]);
        // decay ~1.0, multiplier 1.0, no bonuses; clamped up to base.
        let s = score(&subs, &cfg(), now);
        assert!((s - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_single_old_submission_clamps_to_base() {
        let now = Utc::now();
        let subs = history(now, &[24 * 14]);
        assert_eq!(score(&subs, &cfg(), now), 1.0);
    }

    #[test]
    fn test_frequency_multiplier_breakpoints() {
        assert_eq!(frequency_multiplier(1), 1.0);
        assert_eq!(frequency_multiplier(2), 2.0);
        assert_eq!(frequency_multiplier(3), 3.2);
        assert!((frequency_multiplier(4) - 4.7).abs() < 1e-9);
        assert!((frequency_multiplier(5) - 5.5).abs() < 1e-9);
        assert!((frequency_multiplier(6) - (6.0 + 2.0f64.ln() * 0.5)).abs() < 1e-9);
        assert!(frequency_multiplier(10) > frequency_multiplier(6));
    }

    #[test]
    fn test_score_monotone_in_submission_count() {
        let now = Utc::now();
        let mut previous = 0.0;
        for count in 1..=8usize {
            let ages: Vec<i64> = (0..count as i64).collect();
            let subs = history(now, &ages);
            let s = score(&subs, &cfg(), now);
            assert!(
                s >= previous,
                "score {} for count {} dropped below {}",
                s,
                count,
                previous
            );
            previous = s;
        }
    }

    #[test]
    fn test_score_always_clamped() {
        let now = Utc::now();
        // Pile up submissions right now: decay sum ~20, huge multiplier.
        let ages: Vec<i64> = vec![0; 20];
        let subs = history(now, &ages);
        let s = score(&subs, &cfg(), now);
        assert!(s <= 10.0);
        assert!(s >= 1.0);
    }

    #[test]
    fn test_velocity_bonus_is_capped() {
        let now = Utc::now();
        // 6 submissions in the last 24h: bonus would be 4.0, capped at 3.0.
        let subs = history(now, &[0, 1, 2, 3, 4, 5]);
        let recent = count_within(&subs, now, Duration::hours(24));
        assert_eq!(recent, 6);
        let bonus = ((recent - 1) as f64 * 0.8).min(3.0);
        assert_eq!(bonus, 3.0);
    }

    #[test]
    fn test_recency_boost_requires_two_submissions() {
        let now = Utc::now();
        let one = history(now, &[0]);
        let two = history(now, &[0, 30]);
        // The single fresh submission gets no boost; the pair does.
        let s1 = score(&one, &cfg(), now);
        let s2 = score(&two, &cfg(), now);
        assert!(s2 > s1);
    }

    #[test]
    fn test_buy_milk_three_times_in_an_hour() {
        let now = Utc::now();
        let subs = vec![
            Submission::new(now, "note", ContentType::Text),
            Submission::new(now - Duration::minutes(20), "note", ContentType::Text),
            Submission::new(now - Duration::minutes(50), "note", ContentType::Text),
        ];
        // decay sum ~3.0 * 3.2 multiplier + 1.6 velocity + 1.5 recency,
        // clamped to 10.0.
        let s = score(&subs, &cfg(), now);
        assert!(s > 7.0, "expected count=3 multiplier to dominate, got {}", s);
        assert!(s <= 10.0);

        let patterns = analyze_patterns(&subs, now);
        assert_eq!(patterns.velocity, Velocity::High);

        let urgency = assess_urgency(s, &patterns, &cfg());
        assert!(urgency.level >= UrgencyLevel::Medium);
    }

    #[test]
    fn test_velocity_none_for_single_submission() {
        let now = Utc::now();
        let patterns = analyze_patterns(&history(now, &[5]), now);
        assert_eq!(patterns.velocity, Velocity::None);
    }

    #[test]
    fn test_velocity_none_for_empty() {
        let now = Utc::now();
        let patterns = analyze_patterns(&[], now);
        assert_eq!(patterns.velocity, Velocity::None);
        assert_eq!(patterns.time_span_hours, 0.0);
    }

    #[test]
    fn test_velocity_high_for_burst() {
        let now = Utc::now();
        let patterns = analyze_patterns(&history(now, &[0, 2, 5]), now);
        assert_eq!(patterns.velocity, Velocity::High);
    }

    #[test]
    fn test_velocity_medium_for_pair_today() {
        let now = Utc::now();
        let patterns = analyze_patterns(&history(now, &[1, 10]), now);
        assert_eq!(patterns.velocity, Velocity::Medium);
    }

    #[test]
    fn test_velocity_low_for_spread_out_pair() {
        let now = Utc::now();
        // Two submissions, ten days apart.
        let patterns = analyze_patterns(&history(now, &[30, 240]), now);
        assert_eq!(patterns.velocity, Velocity::Low);
    }

    #[test]
    fn test_trend_increasing_when_intervals_shrink() {
        let now = Utc::now();
        // Intervals newest-first: 1h, 2h, 10h, 20h -> newer half much smaller.
        let subs = history(now, &[0, 1, 3, 13, 33]);
        let patterns = analyze_patterns(&subs, now);
        assert_eq!(patterns.trend, Trend::Increasing);
    }

    #[test]
    fn test_trend_decreasing_when_intervals_widen() {
        let now = Utc::now();
        // Intervals newest-first: 20h, 10h, 2h, 1h.
        let subs = history(now, &[0, 20, 30, 32, 33]);
        let patterns = analyze_patterns(&subs, now);
        assert_eq!(patterns.trend, Trend::Decreasing);
    }

    #[test]
    fn test_trend_stable_for_even_spacing() {
        let now = Utc::now();
        let subs = history(now, &[0, 10, 20, 30]);
        let patterns = analyze_patterns(&subs, now);
        assert_eq!(patterns.trend, Trend::Stable);
    }

    #[test]
    fn test_trend_stable_below_four_submissions() {
        let now = Utc::now();
        let subs = history(now, &[0, 1, 50]);
        assert_eq!(analyze_patterns(&subs, now).trend, Trend::Stable);
    }

    #[test]
    fn test_patterns_count_sources() {
        let now = Utc::now();
        let mut subs = history_from(now, &[0, 1], "note");
        subs.extend(history_from(now, &[2], "email"));
        let patterns = analyze_patterns(&subs, now);
        assert_eq!(patterns.sources.get("note"), Some(&2));
        assert_eq!(patterns.sources.get("email"), Some(&1));
    }

    #[test]
    fn test_time_span() {
        let now = Utc::now();
        let subs = history(now, &[0, 48]);
        let patterns = analyze_patterns(&subs, now);
        assert!((patterns.time_span_hours - 48.0).abs() < 0.01);
        assert!((patterns.time_span_days() - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_urgency_high_at_score_seven() {
        let patterns = SubmissionPatterns::default();
        assert_eq!(assess_urgency(7.0, &patterns, &cfg()).level, UrgencyLevel::High);
        assert_eq!(assess_urgency(9.5, &patterns, &cfg()).level, UrgencyLevel::High);
    }

    #[test]
    fn test_urgency_medium_at_score_four() {
        let patterns = SubmissionPatterns::default();
        assert_eq!(assess_urgency(4.0, &patterns, &cfg()).level, UrgencyLevel::Medium);
        assert_eq!(assess_urgency(6.9, &patterns, &cfg()).level, UrgencyLevel::Medium);
    }

    #[test]
    fn test_urgency_normal_below_four() {
        let patterns = SubmissionPatterns::default();
        let assessment = assess_urgency(2.0, &patterns, &cfg());
        assert_eq!(assessment.level, UrgencyLevel::Normal);
        assert!(assessment.reasons.is_empty());
    }

    #[test]
    fn test_urgency_thresholds_come_from_config() {
        let patterns = SubmissionPatterns::default();
        let lowered = ScoringConfig {
            high_urgency_score: 5.0,
            medium_urgency_score: 2.0,
            ..ScoringConfig::default()
        };
        assert_eq!(assess_urgency(5.5, &patterns, &lowered).level, UrgencyLevel::High);
        assert_eq!(assess_urgency(3.0, &patterns, &lowered).level, UrgencyLevel::Medium);
        assert_eq!(assess_urgency(1.5, &patterns, &lowered).level, UrgencyLevel::Normal);
        // The reason strings quote the configured threshold.
        let assessment = assess_urgency(5.5, &patterns, &lowered);
        assert!(assessment.reasons[0].contains("5.0"));
    }

    #[test]
    fn test_high_velocity_promotes_medium_to_high() {
        let patterns = SubmissionPatterns {
            velocity: Velocity::High,
            ..Default::default()
        };
        let assessment = assess_urgency(5.0, &patterns, &cfg());
        assert_eq!(assessment.level, UrgencyLevel::High);
        assert!(assessment
            .reasons
            .iter()
            .any(|r| r.contains("velocity")));
    }

    #[test]
    fn test_urgency_reasons_accumulate() {
        let patterns = SubmissionPatterns {
            velocity: Velocity::High,
            ..Default::default()
        };
        let assessment = assess_urgency(8.0, &patterns, &cfg());
        assert_eq!(assessment.level, UrgencyLevel::High);
        assert_eq!(assessment.reasons.len(), 2);
    }

    #[test]
    fn test_tags_researched_thoroughly() {
        let mut sources = HashMap::new();
        sources.insert("note".to_string(), 1);
        sources.insert("email".to_string(), 1);
        sources.insert("browser".to_string(), 1);
        let patterns = SubmissionPatterns {
            sources,
            ..Default::default()
        };
        let tags = contextual_tags(&patterns, 3, 2.0);
        assert_eq!(tags, vec!["researched thoroughly".to_string()]);
    }

    #[test]
    fn test_tags_keeps_coming_back() {
        let patterns = SubmissionPatterns::default();
        let tags = contextual_tags(&patterns, 5, 2.0);
        assert_eq!(tags, vec!["keeps coming back".to_string()]);
    }

    #[test]
    fn test_tags_capped_at_three_in_rule_order() {
        let mut sources = HashMap::new();
        for name in ["a", "b", "c"] {
            sources.insert(name.to_string(), 2);
        }
        let patterns = SubmissionPatterns {
            velocity: Velocity::High,
            trend: Trend::Increasing,
            sources,
            time_span_hours: 200.0,
        };
        let tags = contextual_tags(&patterns, 6, 9.0);
        // Five rules match; only the first three (in rule order) survive.
        assert_eq!(
            tags,
            vec![
                "researched thoroughly".to_string(),
                "keeps coming back".to_string(),
                "growing interest".to_string(),
            ]
        );
    }

    #[test]
    fn test_tags_empty_when_nothing_matches() {
        let patterns = SubmissionPatterns::default();
        assert!(contextual_tags(&patterns, 1, 1.0).is_empty());
    }
}
