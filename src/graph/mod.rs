//! Knowledge graph vocabulary and the binding data model.
//!
//! The graph itself lives in an oxigraph store ([`sparql::SparqlStore`]) and is
//! read-only after load. Every query result flows through the memoizing
//! [`query_cache::QueryExecutor`].
//!
//! This module defines the closed domain vocabulary: the eight
//! [`EntityCategory`] classes and the five [`RelationProperty`] predicates the
//! retrieval layer dispatches on. Any other predicate is treated as an opaque
//! property name.

pub mod query_cache;
pub mod sparql;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Domain namespace for entities, classes and relations.
pub const AYUR_NS: &str = "http://example.org/ayurvedic/";

/// RDF schema namespace (labels).
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";

/// `rdf:type`.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// `rdfs:label`.
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

/// The two fixed prefixes every pattern query is written against.
pub const PREFIXES: &str = "PREFIX ayur: <http://example.org/ayurvedic/>\n\
                            PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>\n";

/// One variable-binding row of a SELECT result.
pub type Bindings = BTreeMap<String, Value>;

/// One subject/predicate/object fact, with terms already converted.
#[derive(Debug, Clone, PartialEq)]
pub struct Triple {
    pub subject: Value,
    pub predicate: String,
    pub object: Value,
}

// ---------------------------------------------------------------------------
// Entity categories
// ---------------------------------------------------------------------------

/// The closed set of entity classes in the knowledge graph.
///
/// Each category corresponds to exactly one class IRI (`ayur:Herb`, ...).
/// Serialized as its plural group name (`"herbs"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityCategory {
    #[serde(rename = "herbs")]
    Herb,
    #[serde(rename = "conditions")]
    Condition,
    #[serde(rename = "symptoms")]
    Symptom,
    #[serde(rename = "treatments")]
    Treatment,
    #[serde(rename = "doshas")]
    Dosha,
    #[serde(rename = "compounds")]
    Compound,
    #[serde(rename = "preparations")]
    Preparation,
    #[serde(rename = "sources")]
    Source,
}

impl EntityCategory {
    /// All categories, in entity-cache order.
    pub const ALL: [EntityCategory; 8] = [
        Self::Herb,
        Self::Condition,
        Self::Symptom,
        Self::Treatment,
        Self::Dosha,
        Self::Compound,
        Self::Preparation,
        Self::Source,
    ];

    /// Position of this category in [`Self::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Local name of the class in the domain namespace.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Herb => "Herb",
            Self::Condition => "Condition",
            Self::Symptom => "Symptom",
            Self::Treatment => "Treatment",
            Self::Dosha => "Dosha",
            Self::Compound => "Compound",
            Self::Preparation => "Preparation",
            Self::Source => "Source",
        }
    }

    /// Full class IRI.
    pub fn class_iri(self) -> String {
        format!("{AYUR_NS}{}", self.class_name())
    }

    /// Map a class IRI back to its category.
    pub fn from_class_iri(iri: &str) -> Option<Self> {
        let name = iri.strip_prefix(AYUR_NS)?;
        Self::ALL.into_iter().find(|c| c.class_name() == name)
    }

    /// Plural group name used in search results and visualization.
    pub fn group(self) -> &'static str {
        match self {
            Self::Herb => "herbs",
            Self::Condition => "conditions",
            Self::Symptom => "symptoms",
            Self::Treatment => "treatments",
            Self::Dosha => "doshas",
            Self::Compound => "compounds",
            Self::Preparation => "preparations",
            Self::Source => "sources",
        }
    }

    /// Singular role name used as the field key of related-entity records.
    pub fn role(self) -> &'static str {
        match self {
            Self::Herb => "herb",
            Self::Condition => "condition",
            Self::Symptom => "symptom",
            Self::Treatment => "treatment",
            Self::Dosha => "dosha",
            Self::Compound => "compound",
            Self::Preparation => "preparation",
            Self::Source => "source",
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group())
    }
}

impl FromStr for EntityCategory {
    type Err = String;

    /// Accepts the class name, role or group name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.role() == needle || c.group() == needle)
            .ok_or_else(|| format!("unknown entity category: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Relation properties
// ---------------------------------------------------------------------------

/// The relation predicates that relationship expansion and scoped
/// visualization dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationProperty {
    RecommendedFor,
    HasSymptom,
    BalancesDosha,
    ContainsHerb,
    Treats,
}

impl RelationProperty {
    /// All relation properties, in visualization order.
    pub const ALL: [RelationProperty; 5] = [
        Self::RecommendedFor,
        Self::HasSymptom,
        Self::BalancesDosha,
        Self::ContainsHerb,
        Self::Treats,
    ];

    /// Local name in the domain namespace.
    pub fn local_name(self) -> &'static str {
        match self {
            Self::RecommendedFor => "recommendedFor",
            Self::HasSymptom => "hasSymptom",
            Self::BalancesDosha => "balancesDosha",
            Self::ContainsHerb => "containsHerb",
            Self::Treats => "treats",
        }
    }

    /// Category of the entities this property points at.
    pub fn range(self) -> EntityCategory {
        match self {
            Self::RecommendedFor | Self::Treats => EntityCategory::Condition,
            Self::HasSymptom => EntityCategory::Symptom,
            Self::BalancesDosha => EntityCategory::Dosha,
            Self::ContainsHerb => EntityCategory::Herb,
        }
    }

    /// Human-readable edge label ("Recommended For").
    pub fn display_label(self) -> String {
        humanize(self.local_name())
    }

    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.local_name() == name)
    }
}

// ---------------------------------------------------------------------------
// Binding values
// ---------------------------------------------------------------------------

/// A query-result term converted to its natural scalar form.
///
/// Typed literals whose lexical form does not parse fall back to [`Value::Text`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Iri(String),
    Blank(String),
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    /// Whether this value is a literal rather than a graph node.
    pub fn is_literal(&self) -> bool {
        !matches!(self, Self::Iri(_) | Self::Blank(_))
    }

    /// Borrow the string content of IRI, blank-node and text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Iri(s) | Self::Blank(s) | Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(s) | Self::Text(s) => f.write_str(s),
            Self::Blank(s) => write!(f, "_:{s}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Name helpers
// ---------------------------------------------------------------------------

/// The segment after the last `/` or `#` of an IRI.
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(['/', '#']).next().unwrap_or(iri)
}

/// Display label derived from an IRI when the graph has no `rdfs:label`:
/// the trailing path segment with underscores as spaces, title-cased.
pub fn prettify(iri: &str) -> String {
    let segment = iri.rsplit('/').next().unwrap_or(iri);
    title_case(&segment.replace('_', " "))
}

/// Split a camelCase or snake_case name into title-cased words.
pub fn humanize(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch == '_' {
            spaced.push(' ');
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            spaced.push(' ');
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        spaced.push(ch);
    }
    title_case(&spaced)
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_class_iri_roundtrip() {
        for cat in EntityCategory::ALL {
            assert_eq!(EntityCategory::from_class_iri(&cat.class_iri()), Some(cat));
        }
        assert_eq!(
            EntityCategory::from_class_iri("http://www.w3.org/2000/01/rdf-schema#Class"),
            None
        );
    }

    #[test]
    fn category_parses_role_and_group() {
        assert_eq!("herb".parse::<EntityCategory>().unwrap(), EntityCategory::Herb);
        assert_eq!("Doshas".parse::<EntityCategory>().unwrap(), EntityCategory::Dosha);
        assert!("planet".parse::<EntityCategory>().is_err());
    }

    #[test]
    fn category_serializes_as_group() {
        let json = serde_json::to_string(&EntityCategory::Herb).unwrap();
        assert_eq!(json, "\"herbs\"");
    }

    #[test]
    fn local_name_splits_on_slash_and_hash() {
        assert_eq!(local_name("http://example.org/ayurvedic/description"), "description");
        assert_eq!(local_name(RDFS_LABEL), "label");
        assert_eq!(local_name("plain"), "plain");
    }

    #[test]
    fn prettify_titles_trailing_segment() {
        assert_eq!(prettify("http://example.org/ayurvedic/c_common_cold"), "C Common Cold");
        assert_eq!(prettify("http://example.org/ayurvedic/TULSI"), "Tulsi");
    }

    #[test]
    fn relation_labels_are_human_readable() {
        assert_eq!(RelationProperty::RecommendedFor.display_label(), "Recommended For");
        assert_eq!(RelationProperty::Treats.display_label(), "Treats");
        assert_eq!(humanize("has_symptom"), "Has Symptom");
    }

    #[test]
    fn relation_ranges() {
        assert_eq!(RelationProperty::ContainsHerb.range(), EntityCategory::Herb);
        assert_eq!(RelationProperty::HasSymptom.range(), EntityCategory::Symptom);
        assert_eq!(
            RelationProperty::from_local_name("balancesDosha"),
            Some(RelationProperty::BalancesDosha)
        );
    }
}
