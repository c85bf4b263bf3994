//! Instance document validation.
//!
//! Operator names are validated here, at ingest, against the closed set
//! the remote service understands. The rule compiler itself stays
//! permissive so that remote-facing payloads never change shape behind
//! the operator's back.

use std::collections::HashSet;

use super::types::InstanceSpec;
use crate::error::{Error, Result};

/// Operators the remote filter API accepts.
pub const KNOWN_OPERATORS: [&str; 4] = ["equals", "notequals", "contains", "notcontains"];

/// Validate an instance spec.
///
/// Checks for:
/// - Non-empty name and element
/// - Known operator on every rule (case-insensitive)
/// - Non-empty field, value, and group per rule
///
/// An empty rule list is legal: it compiles to a match-nothing filter.
pub fn validate_instance(spec: &InstanceSpec) -> Result<()> {
    if spec.name.trim().is_empty() {
        return Err(Error::Validation("Filter name is required".into()));
    }

    if spec.element.trim().is_empty() {
        return Err(Error::Validation("Element name is required".into()));
    }

    if spec.category.trim().is_empty() {
        return Err(Error::Validation("Category is required".into()));
    }

    if spec.subcategory.trim().is_empty() {
        return Err(Error::Validation("Subcategory is required".into()));
    }

    let known: HashSet<&str> = KNOWN_OPERATORS.iter().copied().collect();

    for (index, rule) in spec.rules.iter().enumerate() {
        if rule.field.trim().is_empty() {
            return Err(Error::Validation(format!(
                "Rule {} has an empty field",
                index
            )));
        }

        if rule.value.trim().is_empty() {
            return Err(Error::Validation(format!(
                "Rule {} has an empty value",
                index
            )));
        }

        if rule.group.trim().is_empty() {
            return Err(Error::Validation(format!(
                "Rule {} has an empty group",
                index
            )));
        }

        if !known.contains(rule.operator.to_lowercase().as_str()) {
            return Err(Error::Validation(format!(
                "Rule {} has unknown operator '{}' (expected one of: {})",
                index,
                rule.operator,
                KNOWN_OPERATORS.join(", ")
            )));
        }
    }

    Ok(())
}
