//! Embeddable document assembly.
//!
//! The text handed to the embedding provider is rebuilt the same way every
//! time, so an `EmbeddingRecord` is always rederivable from its
//! `ContentItem`.

use recall_core::types::ContentItem;

/// Build the embeddable text for an item.
///
/// Sections in priority order: normalized content, extracted file text,
/// title, description, keywords, contextual tags. Empty sections are
/// skipped; the rest are newline-separated.
pub fn build_document(item: &ContentItem) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !item.normalized_content.is_empty() {
        sections.push(item.normalized_content.clone());
    }

    if let Some(extracted) = item.metadata.extracted_text() {
        if !extracted.trim().is_empty() {
            sections.push(extracted.trim().to_string());
        }
    }

    if let Some(title) = item.metadata.title() {
        if !title.trim().is_empty() {
            sections.push(title.trim().to_string());
        }
    }

    if let Some(description) = item.metadata.description() {
        if !description.trim().is_empty() {
            sections.push(description.trim().to_string());
        }
    }

    let keywords = item.metadata.keywords();
    if !keywords.is_empty() {
        sections.push(keywords.join(" "));
    }

    if !item.contextual_tags.is_empty() {
        sections.push(item.contextual_tags.join(" "));
    }

    sections.join("\n")
}
