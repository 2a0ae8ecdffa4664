//! Query understanding and response composition.
//!
//! Classifies free-text queries into intents, derives search filters from
//! the analysis, and composes natural-language answers with structured
//! insights, optionally enriched by a language provider.

pub mod compose;
pub mod enrich;
pub mod intent;

pub use compose::{aggregate, ComposedResponse, ImportanceDistribution, ResponseComposer, ResponseInsights};
pub use enrich::{EnrichedComposer, LanguageProvider};
pub use intent::{build_search_options, PrimaryIntent, QueryAnalysis, QueryAnalyzer, TimeContext};
