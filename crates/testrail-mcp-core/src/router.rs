//! Action router
//!
//! Translates the action names and parameter aliases callers use into the
//! canonical tool names and argument keys the worker expects. Pure: no
//! state, no I/O.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameter: action")]
    MissingAction,

    #[error("Parameter 'action' must be a string")]
    ActionNotString,

    #[error("Tool input must be a JSON object")]
    NotAnObject,
}

/// Synonym -> canonical tool name. Keys are lowercase.
static ACTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Projects
        ("list_projects", "get_projects"),
        ("get_projects", "get_projects"),
        ("get_project", "get_project"),
        ("add_project", "add_project"),
        ("create_project", "add_project"),
        ("update_project", "update_project"),
        ("delete_project", "delete_project"),
        // Cases
        ("list_cases", "get_cases"),
        ("get_cases", "get_cases"),
        ("get_case", "get_case"),
        ("get_test_case", "get_case"),
        ("add_case", "add_case"),
        ("create_case", "add_case"),
        ("update_case", "update_case"),
        ("delete_case", "delete_case"),
        // Sections
        ("get_section", "get_section"),
        ("get_sections", "get_sections"),
        ("list_sections", "get_sections"),
        ("add_section", "add_section"),
        ("create_section", "add_section"),
        ("update_section", "update_section"),
        ("delete_section", "delete_section"),
        ("move_section", "move_section"),
        // Runs
        ("list_runs", "get_runs"),
        ("get_runs", "get_runs"),
        ("get_run", "get_run"),
        ("get_test_run", "get_run"),
        ("add_run", "add_run"),
        ("create_run", "add_run"),
        ("create_test_run", "add_run"),
        ("update_run", "update_run"),
        ("close_run", "close_run"),
        ("delete_run", "delete_run"),
        // Results
        ("get_results", "get_results"),
        ("list_results", "get_results"),
        ("add_result", "add_result"),
        ("create_result", "add_result"),
        // Datasets
        ("list_datasets", "get_datasets"),
        ("get_datasets", "get_datasets"),
        ("get_dataset", "get_dataset"),
        ("add_dataset", "add_dataset"),
        ("create_dataset", "add_dataset"),
        ("update_dataset", "update_dataset"),
        ("delete_dataset", "delete_dataset"),
    ])
});

/// (alias, canonical) argument keys
const ARG_ALIASES: [(&str, &str); 2] = [("test_case_id", "case_id"), ("test_run_id", "run_id")];

/// Canonical tool name for `action`
///
/// Lookup ignores case. Names not in the table are returned unchanged, in
/// their original casing, so new worker tools are reachable without a table
/// update.
pub fn resolve(action: &str) -> String {
    ACTIONS
        .get(action.to_lowercase().as_str())
        .map(|canonical| canonical.to_string())
        .unwrap_or_else(|| action.to_string())
}

/// All (synonym, canonical) pairs, sorted by synonym
pub fn action_table() -> Vec<(&'static str, &'static str)> {
    let mut table: Vec<_> = ACTIONS.iter().map(|(k, v)| (*k, *v)).collect();
    table.sort_unstable();
    table
}

/// Rewrite parameter aliases to canonical keys
///
/// The alias is applied first and the canonical key second, so when both
/// are present the canonical value wins. Alias keys never appear in the
/// output. Every other key, including ones holding `null`, passes through.
pub fn normalize_args(_tool: &str, raw: &Map<String, Value>) -> Map<String, Value> {
    let mut args = Map::new();

    for (alias, canonical) in ARG_ALIASES {
        if let Some(value) = raw.get(alias) {
            args.insert(canonical.to_string(), value.clone());
        }
        if let Some(value) = raw.get(canonical) {
            args.insert(canonical.to_string(), value.clone());
        }
    }

    for (key, value) in raw {
        if ARG_ALIASES.iter().any(|(alias, _)| alias == key) {
            continue;
        }
        args.insert(key.clone(), value.clone());
    }

    args
}

/// One host tool invocation: the action and its parameters
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub action: String,
    pub params: Map<String, Value>,
}

impl InvocationRequest {
    /// Split host input into the action and the remaining parameters
    pub fn from_input(input: &Value) -> Result<Self, ValidationError> {
        let object = input.as_object().ok_or(ValidationError::NotAnObject)?;

        let action = match object.get("action") {
            None | Some(Value::Null) => return Err(ValidationError::MissingAction),
            Some(Value::String(s)) if s.is_empty() => return Err(ValidationError::MissingAction),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(ValidationError::ActionNotString),
        };

        let mut params = object.clone();
        params.remove("action");

        Ok(Self { action, params })
    }
}

/// Resolve the tool and normalize its arguments
pub fn route(request: &InvocationRequest) -> (String, Map<String, Value>) {
    let tool = resolve(&request.action);
    let args = normalize_args(&tool, &request.params);
    (tool, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_resolve_synonyms() {
        assert_eq!(resolve("list_projects"), "get_projects");
        assert_eq!(resolve("create_case"), "add_case");
        assert_eq!(resolve("get_test_case"), "get_case");
        assert_eq!(resolve("create_test_run"), "add_run");
        assert_eq!(resolve("list_sections"), "get_sections");
        assert_eq!(resolve("create_result"), "add_result");
        assert_eq!(resolve("list_datasets"), "get_datasets");
        assert_eq!(resolve("close_run"), "close_run");
    }

    #[test]
    fn test_resolve_ignores_case() {
        assert_eq!(resolve("List_Projects"), "get_projects");
        assert_eq!(resolve("CREATE_CASE"), "add_case");
    }

    #[test]
    fn test_unknown_action_passes_through_deliberately() {
        // Permissive on purpose: the worker gets a chance at names we do not know
        assert_eq!(resolve("frobnicate"), "frobnicate");
        assert_eq!(resolve("Get_Milestones"), "Get_Milestones");
    }

    #[test]
    fn test_action_table_is_complete() {
        let expected = vec![
            ("add_case", "add_case"),
            ("add_dataset", "add_dataset"),
            ("add_project", "add_project"),
            ("add_result", "add_result"),
            ("add_run", "add_run"),
            ("add_section", "add_section"),
            ("close_run", "close_run"),
            ("create_case", "add_case"),
            ("create_dataset", "add_dataset"),
            ("create_project", "add_project"),
            ("create_result", "add_result"),
            ("create_run", "add_run"),
            ("create_section", "add_section"),
            ("create_test_run", "add_run"),
            ("delete_case", "delete_case"),
            ("delete_dataset", "delete_dataset"),
            ("delete_project", "delete_project"),
            ("delete_run", "delete_run"),
            ("delete_section", "delete_section"),
            ("get_case", "get_case"),
            ("get_cases", "get_cases"),
            ("get_dataset", "get_dataset"),
            ("get_datasets", "get_datasets"),
            ("get_project", "get_project"),
            ("get_projects", "get_projects"),
            ("get_results", "get_results"),
            ("get_run", "get_run"),
            ("get_runs", "get_runs"),
            ("get_section", "get_section"),
            ("get_sections", "get_sections"),
            ("get_test_case", "get_case"),
            ("get_test_run", "get_run"),
            ("list_cases", "get_cases"),
            ("list_datasets", "get_datasets"),
            ("list_projects", "get_projects"),
            ("list_results", "get_results"),
            ("list_runs", "get_runs"),
            ("list_sections", "get_sections"),
            ("move_section", "move_section"),
            ("update_case", "update_case"),
            ("update_dataset", "update_dataset"),
            ("update_project", "update_project"),
            ("update_run", "update_run"),
            ("update_section", "update_section"),
        ];
        assert_eq!(action_table(), expected);
        for (synonym, canonical) in expected {
            assert_eq!(resolve(synonym), canonical);
            assert_eq!(resolve(canonical), canonical);
        }
    }

    #[test]
    fn test_alias_only() {
        let args = normalize_args("get_case", &object(json!({"test_case_id": 5})));
        assert_eq!(Value::Object(args), json!({"case_id": 5}));

        let args = normalize_args("get_run", &object(json!({"test_run_id": 9})));
        assert_eq!(Value::Object(args), json!({"run_id": 9}));
    }

    #[test]
    fn test_canonical_wins() {
        let args = normalize_args(
            "get_case",
            &object(json!({"test_case_id": 5, "case_id": 6, "test_run_id": 1, "run_id": 2})),
        );
        assert_eq!(Value::Object(args), json!({"case_id": 6, "run_id": 2}));
    }

    #[test]
    fn test_other_keys_pass_through_with_nulls() {
        let args = normalize_args(
            "add_result",
            &object(json!({"test_id": 3, "status_id": 1, "comment": null})),
        );
        assert_eq!(args.len(), 3);
        assert_eq!(args["comment"], Value::Null);
    }

    #[test]
    fn test_canonical_keys_come_first() {
        let args = normalize_args("add_case", &object(json!({"title": "T1", "test_case_id": 7})));
        let keys: Vec<_> = args.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["case_id", "title"]);
    }

    #[test]
    fn test_request_validation() {
        assert_eq!(
            InvocationRequest::from_input(&json!({"project_id": 1})),
            Err(ValidationError::MissingAction)
        );
        assert_eq!(
            InvocationRequest::from_input(&json!({"action": ""})),
            Err(ValidationError::MissingAction)
        );
        assert_eq!(
            InvocationRequest::from_input(&json!({"action": null})),
            Err(ValidationError::MissingAction)
        );
        assert_eq!(
            InvocationRequest::from_input(&json!({"action": 3})),
            Err(ValidationError::ActionNotString)
        );
        assert_eq!(
            InvocationRequest::from_input(&json!(["get_projects"])),
            Err(ValidationError::NotAnObject)
        );
        assert_eq!(
            ValidationError::MissingAction.to_string(),
            "Missing required parameter: action"
        );
    }

    #[test]
    fn test_route_create_case() {
        let request =
            InvocationRequest::from_input(&json!({"action": "create_case", "title": "T1", "test_case_id": 7}))
                .unwrap();
        let (tool, args) = route(&request);
        assert_eq!(tool, "add_case");
        assert_eq!(Value::Object(args), json!({"title": "T1", "case_id": 7}));
    }
}
