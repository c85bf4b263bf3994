//! Rule compiler and the remote filter request contract.
//!
//! Flat rule records compile into the nested boolean expression the
//! remote service consumes: records sharing a group are ORed, groups
//! are ANDed. The compiler is a pure function; it performs no I/O and
//! no operator validation (ingest validation lives in
//! [`crate::workflow::validate_instance`]).

use serde::{Deserialize, Serialize};

use crate::workflow::{InstanceSpec, RuleRecord};

/// Top-level remote filter creation payload.
///
/// Serializes to:
/// `{"type", "request": {"name", "category", "subcategory", "enabled",
/// "advanced": true, "rules": {"op": "and", "rules": [...]}}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(rename = "type")]
    pub request_type: String,

    pub request: FilterRequestBody,
}

/// The `request` object of a [`FilterRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRequestBody {
    pub name: String,

    pub category: String,

    pub subcategory: String,

    /// The remote API expects a string here, not a boolean.
    pub enabled: String,

    pub advanced: bool,

    pub rules: RuleTree,
}

/// The AND-of-ORs rule expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTree {
    pub op: String,

    pub rules: Vec<RuleGroup>,
}

/// One OR group of compiled rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleGroup {
    pub op: String,

    pub rules: Vec<CompiledRule>,
}

/// One compiled rule leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledRule {
    pub field: String,

    /// Omitted from the payload entirely (not serialized as null) when
    /// the source key is blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    pub op: String,

    pub value: String,
}

impl FilterRequest {
    /// Build the creation payload for an instance spec, compiling its
    /// rule records.
    pub fn from_spec(spec: &InstanceSpec) -> Self {
        Self {
            request_type: spec.filter_type.clone(),
            request: FilterRequestBody {
                name: spec.name.clone(),
                category: spec.category.clone(),
                subcategory: spec.subcategory.clone(),
                enabled: spec.enabled.to_string(),
                advanced: true,
                rules: compile_rules(&spec.rules),
            },
        }
    }
}

/// Compile flat rule records into the nested AND-of-ORs expression.
///
/// Groups keep the insertion order of their first occurrence; rules
/// within a group keep input order. An empty input compiles to a single
/// empty OR group so the filter matches nothing rather than everything.
pub fn compile_rules(records: &[RuleRecord]) -> RuleTree {
    if records.is_empty() {
        return RuleTree {
            op: "and".to_string(),
            rules: vec![RuleGroup {
                op: "or".to_string(),
                rules: Vec::new(),
            }],
        };
    }

    let mut groups: Vec<(&str, Vec<CompiledRule>)> = Vec::new();

    for record in records {
        let compiled = CompiledRule {
            field: record.field.clone(),
            key: if record.key.trim().is_empty() {
                None
            } else {
                Some(record.key.clone())
            },
            op: record.operator.to_lowercase(),
            value: record.value.clone(),
        };

        match groups.iter_mut().find(|(group, _)| *group == record.group) {
            Some((_, rules)) => rules.push(compiled),
            None => groups.push((record.group.as_str(), vec![compiled])),
        }
    }

    RuleTree {
        op: "and".to_string(),
        rules: groups
            .into_iter()
            .map(|(_, rules)| RuleGroup {
                op: "or".to_string(),
                rules,
            })
            .collect(),
    }
}
