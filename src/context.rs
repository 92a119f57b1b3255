//! Flatten a search result into grounding text for answer generation.

use crate::search::SearchResult;

/// Detail properties already shown on an entity's headline.
const HEADLINE_PROPERTIES: [&str; 3] = ["uri", "label", "description"];

/// Render entities and relationships as plain text.
///
/// Returns an empty string when there is nothing to ground on.
pub fn format_context(result: &SearchResult) -> String {
    let mut lines: Vec<String> = Vec::new();

    if !result.entities.is_empty() {
        lines.push("Entities:".into());
        for detailed in &result.entities {
            let entity = &detailed.entity;
            let description = detailed.details.description().unwrap_or("No description");
            lines.push(format!("- {} ({}): {description}", entity.label, entity.category));
            for (property, values) in detailed.details.properties() {
                if HEADLINE_PROPERTIES.contains(&property) {
                    continue;
                }
                lines.push(format!("  {property}: {}", values.join(", ")));
            }
        }
    }

    if !result.relationships.is_empty() {
        lines.push("Relationships:".into());
        for bundle in result.relationships.iter() {
            let labels: Vec<&str> = bundle.items.iter().map(|i| i.label.as_str()).collect();
            lines.push(format!("- {}: {}", bundle.key, labels.join(", ")));
        }
    }

    lines.join("\n")
}
