//! Entity detail resolution: every outgoing property of one entity.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::graph::query_cache::{QueryExecutor, escape_iri};
use crate::graph::{PREFIXES, RelationProperty, local_name};

/// Property values of one entity, grouped by property local name.
///
/// The property set is open-ended, so properties are kept as an ordered list
/// of `(name, values)` in first-seen order. The relation properties the
/// retrieval layer dispatches on are reachable through [`Self::relation`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityDetails {
    pub uri: String,
    properties: Vec<(String, Vec<String>)>,
    /// Set when the identifier could not be resolved.
    pub error: Option<String>,
}

impl EntityDetails {
    /// Details record carrying only the identifier.
    pub fn empty(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    /// Append a value under a property, preserving multiplicity.
    pub fn push(&mut self, property: &str, value: String) {
        match self.properties.iter_mut().find(|(name, _)| name == property) {
            Some((_, values)) => values.push(value),
            None => self.properties.push((property.to_string(), vec![value])),
        }
    }

    /// Values of a property, if present.
    pub fn get(&self, property: &str) -> Option<&[String]> {
        self.properties
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, values)| values.as_slice())
    }

    /// Values of one of the fixed relation properties.
    pub fn relation(&self, property: RelationProperty) -> &[String] {
        self.get(property.local_name()).unwrap_or(&[])
    }

    /// First `description` value, if any.
    pub fn description(&self) -> Option<&str> {
        self.get("description")
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All `(property, values)` pairs in first-seen order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.properties
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Whether no property was found.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl Serialize for EntityDetails {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("uri", &self.uri)?;
        for (name, values) in &self.properties {
            if name != "uri" && name != "error" {
                map.serialize_entry(name, values)?;
            }
        }
        if let Some(ref error) = self.error {
            map.serialize_entry("error", error)?;
        }
        map.end()
    }
}

/// Fetch all `(property, value)` pairs where `uri` is the subject.
///
/// An identifier that cannot be embedded in a query yields an error-tagged
/// record instead of failing.
pub fn resolve_entity_details(executor: &QueryExecutor, uri: &str) -> EntityDetails {
    let node = match escape_iri(uri) {
        Ok(node) => node,
        Err(e) => {
            tracing::error!(error = %e, uri, "cannot fetch entity details");
            return EntityDetails {
                error: Some(e.to_string()),
                ..EntityDetails::empty(uri)
            };
        }
    };

    let rows = executor.select(&format!(
        "{PREFIXES}SELECT ?property ?value WHERE {{ {node} ?property ?value . }}"
    ));

    let mut details = EntityDetails::empty(uri);
    for row in rows.iter() {
        let (Some(property), Some(value)) = (row.get("property"), row.get("value")) else {
            continue;
        };
        details.push(local_name(&property.to_string()), value.to_string());
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::query_cache::DEFAULT_CAPACITY;
    use crate::graph::sparql::SparqlStore;

    const TURTLE: &str = r#"
        @prefix ayur: <http://example.org/ayurvedic/> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

        ayur:t_herbal_tea a ayur:Treatment ;
            rdfs:label "Herbal Tea" ;
            ayur:description "Infusion containing specific herbs." ;
            ayur:containsHerb ayur:h_tulsi, ayur:h_cardamom, ayur:h_clove .
        ayur:h_tulsi a ayur:Herb .
    "#;

    fn executor() -> QueryExecutor {
        QueryExecutor::new(SparqlStore::from_turtle(TURTLE).unwrap(), DEFAULT_CAPACITY)
    }

    #[test]
    fn groups_values_by_local_name() {
        let details = resolve_entity_details(&executor(), "http://example.org/ayurvedic/t_herbal_tea");
        assert_eq!(details.uri, "http://example.org/ayurvedic/t_herbal_tea");
        assert_eq!(details.get("label").unwrap(), ["Herbal Tea"]);
        assert_eq!(details.description(), Some("Infusion containing specific herbs."));
        assert_eq!(details.relation(RelationProperty::ContainsHerb).len(), 3);
        assert_eq!(
            details.get("type").unwrap(),
            ["http://example.org/ayurvedic/Treatment"]
        );
        assert!(details.error.is_none());
    }

    #[test]
    fn entity_without_properties_has_only_uri() {
        let details = resolve_entity_details(&executor(), "http://example.org/ayurvedic/nothing");
        assert!(details.is_empty());
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "uri": "http://example.org/ayurvedic/nothing" })
        );
    }

    #[test]
    fn unencodable_identifier_is_error_tagged() {
        let details = resolve_entity_details(&executor(), "no scheme here");
        assert!(details.is_empty());
        assert!(details.error.is_some());
        assert_eq!(details.uri, "no scheme here");
    }

    #[test]
    fn reserved_characters_do_not_break_the_query() {
        let exec = executor();
        let details = resolve_entity_details(&exec, "http://example.org/ayurvedic/a> } DROP {");
        assert!(details.is_empty());
        assert!(details.error.is_none());
    }
}
