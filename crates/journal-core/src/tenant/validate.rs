//! Structural validation of raw tenant documents.
//!
//! Every rule runs; problems are collected and reported together.

use crate::error::{FieldProblem, JournalError, JournalResult};
use crate::tenant::types::TenantConfig;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Validate a raw document and convert it into a [`TenantConfig`].
pub fn validate_document(doc: &Value) -> JournalResult<TenantConfig> {
    let problems = collect_problems(doc);
    if !problems.is_empty() {
        return Err(JournalError::validation(
            "Configuration validation failed",
            problems,
        ));
    }
    serde_json::from_value(doc.clone()).map_err(|e| {
        JournalError::validation(
            "Configuration validation failed",
            vec![FieldProblem::new("$", e.to_string())],
        )
    })
}

/// All rule violations for `doc`, in rule order. Empty when the document is valid.
pub fn collect_problems(doc: &Value) -> Vec<FieldProblem> {
    let mut problems = Vec::new();
    let Some(root) = doc.as_object() else {
        problems.push(FieldProblem::new("$", "Configuration must be a JSON object"));
        return problems;
    };

    require_string(root, "appId", "appId", "App ID is required", &mut problems);
    require_string(root, "appName", "appName", "App name is required", &mut problems);

    let interactions = require_list(
        root,
        "interactions",
        "Interactions array is required",
        "Interactions array must not be empty",
        &mut problems,
    );
    let comfort_levels = require_list(
        root,
        "comfortLevels",
        "Comfort levels array is required",
        "Comfort levels array must not be empty",
        &mut problems,
    );

    match root.get("theme").and_then(Value::as_object) {
        Some(theme) => {
            require_string(
                theme,
                "primary",
                "theme.primary",
                "Primary theme color is required",
                &mut problems,
            );
            require_string(
                theme,
                "secondary",
                "theme.secondary",
                "Secondary theme color is required",
                &mut problems,
            );
        }
        None => problems.push(FieldProblem::new("theme", "Theme configuration is required")),
    }

    if let Some(items) = interactions {
        check_entries(
            items,
            "interactions",
            &[
                ("id", "Interaction ID is required"),
                ("label", "Interaction label is required"),
                ("icon", "Interaction icon is required"),
            ],
            &mut problems,
        );
        check_duplicates(items, "interactions", "Duplicate interaction ID", &mut problems);
    }

    if let Some(items) = comfort_levels {
        check_entries(
            items,
            "comfortLevels",
            &[
                ("id", "Comfort level ID is required"),
                ("label", "Comfort level label is required"),
                ("color", "Comfort level color is required"),
            ],
            &mut problems,
        );
        check_duplicates(items, "comfortLevels", "Duplicate comfort level ID", &mut problems);
    }

    problems
}

/// Present and non-empty. Whitespace counts as content.
fn non_empty_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn require_string(
    obj: &Map<String, Value>,
    key: &str,
    field: &str,
    message: &str,
    problems: &mut Vec<FieldProblem>,
) {
    if non_empty_str(obj, key).is_none() {
        problems.push(FieldProblem::new(field, message));
    }
}

fn require_list<'a>(
    root: &'a Map<String, Value>,
    key: &str,
    missing: &str,
    empty: &str,
    problems: &mut Vec<FieldProblem>,
) -> Option<&'a Vec<Value>> {
    match root.get(key).and_then(Value::as_array) {
        Some(items) => {
            if items.is_empty() {
                problems.push(FieldProblem::new(key, empty));
            }
            Some(items)
        }
        None => {
            problems.push(FieldProblem::new(key, missing));
            None
        }
    }
}

fn check_entries(
    items: &[Value],
    list: &str,
    required: &[(&str, &str)],
    problems: &mut Vec<FieldProblem>,
) {
    for (index, item) in items.iter().enumerate() {
        let empty = Map::new();
        let obj = item.as_object().unwrap_or(&empty);
        for (key, message) in required {
            if non_empty_str(obj, key).is_none() {
                problems.push(FieldProblem::new(format!("{list}[{index}].{key}"), *message));
            }
        }
    }
}

fn check_duplicates(items: &[Value], list: &str, message: &str, problems: &mut Vec<FieldProblem>) {
    let mut seen = HashSet::new();
    for id in items
        .iter()
        .filter_map(|item| item.as_object().and_then(|obj| non_empty_str(obj, "id")))
    {
        if !seen.insert(id) {
            problems.push(FieldProblem::new(list, format!("{message}: {id}")));
        }
    }
}
