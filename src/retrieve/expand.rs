//! Category-specific relationship expansion.
//!
//! Each entity category has a fixed list of [`RelationRule`]s. A rule names
//! one relation property, the direction it is followed in, and the bundle
//! suffix its results are filed under. Categories without rules (doshas,
//! compounds, preparations, sources) produce no bundles.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::graph::query_cache::{QueryExecutor, escape_iri};
use crate::graph::{EntityCategory, PREFIXES, RelationProperty, Value};

use super::matcher::EntityMatch;

/// Which end of the relation the expanded entity sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `entity --property--> related`
    Outgoing,
    /// `related --property--> entity`
    Incoming,
}

/// One traversal rule of the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationRule {
    pub property: RelationProperty,
    pub direction: Direction,
    /// Category of the entities found at the other end.
    pub related: EntityCategory,
    /// Suffix of the bundle key (`"{label}_{name}"`).
    pub name: &'static str,
}

const fn rule(
    property: RelationProperty,
    direction: Direction,
    related: EntityCategory,
    name: &'static str,
) -> RelationRule {
    RelationRule {
        property,
        direction,
        related,
        name,
    }
}

const HERB_RULES: [RelationRule; 2] = [
    rule(RelationProperty::RecommendedFor, Direction::Outgoing, EntityCategory::Condition, "treats"),
    rule(RelationProperty::BalancesDosha, Direction::Outgoing, EntityCategory::Dosha, "balances"),
];

const CONDITION_RULES: [RelationRule; 3] = [
    rule(RelationProperty::RecommendedFor, Direction::Incoming, EntityCategory::Herb, "herbs"),
    rule(RelationProperty::HasSymptom, Direction::Outgoing, EntityCategory::Symptom, "symptoms"),
    rule(RelationProperty::Treats, Direction::Incoming, EntityCategory::Treatment, "treatments"),
];

const TREATMENT_RULES: [RelationRule; 2] = [
    rule(RelationProperty::ContainsHerb, Direction::Outgoing, EntityCategory::Herb, "contains"),
    rule(RelationProperty::Treats, Direction::Outgoing, EntityCategory::Condition, "treats"),
];

const SYMPTOM_RULES: [RelationRule; 1] = [rule(
    RelationProperty::HasSymptom,
    Direction::Incoming,
    EntityCategory::Condition,
    "in_condition",
)];

/// The traversal rules for one category.
pub fn rules_for(category: EntityCategory) -> &'static [RelationRule] {
    match category {
        EntityCategory::Herb => &HERB_RULES,
        EntityCategory::Condition => &CONDITION_RULES,
        EntityCategory::Treatment => &TREATMENT_RULES,
        EntityCategory::Symptom => &SYMPTOM_RULES,
        EntityCategory::Dosha
        | EntityCategory::Compound
        | EntityCategory::Preparation
        | EntityCategory::Source => &[],
    }
}

/// An entity reached through a relation.
///
/// Serialized as `{ "<role>": uri, "<role>Label": label }`, e.g.
/// `{ "condition": "...", "conditionLabel": "Common Cold" }`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedEntity {
    pub role: EntityCategory,
    pub uri: String,
    pub label: String,
}

impl Serialize for RelatedEntity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let role = self.role.role();
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(role, &self.uri)?;
        map.serialize_entry(&format!("{role}Label"), &self.label)?;
        map.end()
    }
}

/// All entities one matched entity reaches through one rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipBundle {
    /// `"{entity label}_{rule name}"`.
    pub key: String,
    /// The matched entity the bundle was expanded from.
    pub anchor: EntityMatch,
    pub rule: RelationRule,
    pub items: Vec<RelatedEntity>,
}

/// Ordered bundle collection, serialized as `{ key: [items] }`.
///
/// Inserting an existing key replaces that bundle in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relationships {
    bundles: Vec<RelationshipBundle>,
}

impl Relationships {
    pub fn insert(&mut self, bundle: RelationshipBundle) {
        match self.bundles.iter_mut().find(|b| b.key == bundle.key) {
            Some(existing) => *existing = bundle,
            None => self.bundles.push(bundle),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RelationshipBundle> {
        self.bundles.iter().find(|b| b.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationshipBundle> {
        self.bundles.iter()
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

impl Serialize for Relationships {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bundles.len()))?;
        for bundle in &self.bundles {
            map.serialize_entry(&bundle.key, &bundle.items)?;
        }
        map.end()
    }
}

/// Expand up to `limit` matches through their category's rules.
///
/// `query` is the originating question, kept for log provenance only.
/// Relations with no results produce no bundle, and a match whose identifier
/// cannot be embedded in a query is skipped.
pub fn expand_relationships(
    executor: &QueryExecutor,
    query: &str,
    matches: &[EntityMatch],
    limit: usize,
) -> Relationships {
    let mut relationships = Relationships::default();
    for anchor in matches.iter().take(limit) {
        let rules = rules_for(anchor.category);
        if rules.is_empty() {
            continue;
        }
        let node = match escape_iri(&anchor.uri) {
            Ok(node) => node,
            Err(e) => {
                tracing::error!(error = %e, uri = %anchor.uri, query, "cannot expand relationships");
                continue;
            }
        };
        for rule in rules {
            let items = related_entities(executor, &node, rule);
            if items.is_empty() {
                continue;
            }
            relationships.insert(RelationshipBundle {
                key: format!("{}_{}", anchor.label, rule.name),
                anchor: anchor.clone(),
                rule: *rule,
                items,
            });
        }
    }
    tracing::debug!(query, bundles = relationships.len(), "expanded relationships");
    relationships
}

fn related_entities(executor: &QueryExecutor, node: &str, rule: &RelationRule) -> Vec<RelatedEntity> {
    let property = rule.property.local_name();
    let pattern = match rule.direction {
        Direction::Outgoing => format!("{node} ayur:{property} ?target ."),
        Direction::Incoming => format!("?target ayur:{property} {node} ."),
    };
    let rows = executor.select(&format!(
        "{PREFIXES}SELECT ?target ?label WHERE {{ {pattern} ?target rdfs:label ?label . }}"
    ));
    rows.iter()
        .filter_map(|row| {
            let uri = match row.get("target")? {
                Value::Iri(uri) => uri.clone(),
                _ => return None,
            };
            Some(RelatedEntity {
                role: rule.related,
                uri,
                label: row.get("label")?.to_string(),
            })
        })
        .collect()
}
