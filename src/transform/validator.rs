//! Schema validation for native trees.
//!
//! Recursive and fail-fast: the first violation anywhere in the tree is
//! returned, with the offending node's id and its path.
//!
//! Two entry points:
//!
//! - [`Validator::validate_value`] checks the wire form, where every
//!   structural rule can be violated.
//! - [`Validator::validate_elements`] checks typed trees, where the types
//!   already guarantee object-ness, map settings, array children and boolean
//!   `isInner`; only id format and widget types remain.

use serde_json::Value;

use super::ValidateError;
use crate::id::is_well_formed_id;
use crate::node::{ElementKind, ElementNode};

/// Path of a top-level entry
fn root_path(index: usize) -> String {
    format!("content[{index}]")
}

// =============================================================================
// Validator
// =============================================================================

/// Native tree schema checker
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    // ─────────────────────────────────────────────────────────────────────────
    // Wire form
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate a wire-form tree: an array of elements, or one element
    pub fn validate_value(tree: &Value) -> Result<(), ValidateError> {
        match tree {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| Self::validate_value_at(item, &root_path(i))),
            other => Self::validate_value_at(other, "content"),
        }
    }

    /// Boolean form of [`validate_value`](Self::validate_value)
    pub fn is_valid_value(tree: &Value) -> bool {
        Self::validate_value(tree).is_ok()
    }

    fn validate_value_at(value: &Value, path: &str) -> Result<(), ValidateError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ValidateError::new("object", "element is not an object").with_hint(path))?;

        let id = obj.get("id").and_then(Value::as_str);
        let fail = |rule: &str, message: String| {
            let err = ValidateError::new(rule, message).with_hint(path);
            match id {
                Some(id) => err.with_node(id),
                None => err,
            }
        };

        match id {
            Some(id) if is_well_formed_id(id) => {}
            Some(id) => return Err(fail("id", format!("malformed id `{id}`"))),
            None => return Err(fail("id", "missing id".into())),
        }

        if !obj.get("settings").is_some_and(Value::is_object) {
            return Err(fail("settings", "settings is not an object".into()));
        }

        let Some(children) = obj.get("elements").and_then(Value::as_array) else {
            return Err(fail("elements", "elements is not an array".into()));
        };

        if obj.get("elType").and_then(Value::as_str) == Some(ElementKind::Widget.as_str()) {
            let has_type = obj
                .get("widgetType")
                .and_then(Value::as_str)
                .is_some_and(|t| !t.is_empty());
            if !has_type {
                return Err(fail("widgetType", "widget has no widgetType".into()));
            }
        }

        if !obj.get("isInner").is_some_and(Value::is_boolean) {
            return Err(fail("isInner", "isInner is not a boolean".into()));
        }

        children
            .iter()
            .enumerate()
            .try_for_each(|(i, child)| Self::validate_value_at(child, &format!("{path}.elements[{i}]")))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Typed form
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate a typed tree
    pub fn validate_elements(nodes: &[ElementNode]) -> Result<(), ValidateError> {
        nodes
            .iter()
            .enumerate()
            .try_for_each(|(i, node)| Self::validate_element_at(node, &root_path(i)))
    }

    /// Boolean form of [`validate_elements`](Self::validate_elements)
    pub fn is_valid_elements(nodes: &[ElementNode]) -> bool {
        Self::validate_elements(nodes).is_ok()
    }

    fn validate_element_at(node: &ElementNode, path: &str) -> Result<(), ValidateError> {
        if !node.id.is_well_formed() {
            return Err(ValidateError::new("id", format!("malformed id `{}`", node.id))
                .with_node(node.id.as_str())
                .with_hint(path));
        }

        if node.is_widget() && node.widget_type().is_none_or(str::is_empty) {
            return Err(ValidateError::new("widgetType", "widget has no widgetType")
                .with_node(node.id.as_str())
                .with_hint(path));
        }

        node.children
            .iter()
            .enumerate()
            .try_for_each(|(i, child)| Self::validate_element_at(child, &format!("{path}.elements[{i}]")))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::node::Settings;
    use serde_json::json;

    fn widget(id: &str, widget_type: &str) -> Value {
        json!({"id": id, "elType": "widget", "widgetType": widget_type, "settings": {}, "elements": [], "isInner": false})
    }

    #[test]
    fn test_valid_wire_tree() {
        let tree = json!([{
            "id": "0000abcd", "elType": "container", "settings": {}, "isInner": false,
            "elements": [widget("1234abcd", "heading")]
        }]);
        assert!(Validator::is_valid_value(&tree));
    }

    #[test]
    fn test_nested_bad_id_fails() {
        let tree = json!([{
            "id": "0000abcd", "elType": "container", "settings": {}, "isInner": false,
            "elements": [widget("1234abcd", "heading"), widget("ZZZ", "image")]
        }]);
        let err = Validator::validate_value(&tree).unwrap_err();
        assert_eq!(err.rule, "id");
        assert_eq!(err.node_id.as_deref(), Some("ZZZ"));
        assert_eq!(err.hint.as_deref(), Some("content[0].elements[1]"));
    }

    #[test]
    fn test_each_wire_rule() {
        let cases = [
            (json!("text"), "object"),
            (json!({"settings": {}, "elements": [], "isInner": false}), "id"),
            (json!({"id": "0000abcd", "settings": [], "elements": [], "isInner": false}), "settings"),
            (json!({"id": "0000abcd", "settings": {}, "isInner": false}), "elements"),
            (json!({"id": "0000abcd", "elType": "widget", "widgetType": "", "settings": {}, "elements": [], "isInner": false}), "widgetType"),
            (json!({"id": "0000abcd", "settings": {}, "elements": [], "isInner": "no"}), "isInner"),
        ];
        for (value, rule) in cases {
            assert_eq!(Validator::validate_value(&value).unwrap_err().rule, rule, "{value}");
        }
    }

    #[test]
    fn test_typed_tree() {
        let good = ElementNode::container(NodeId::from_u32(1), Settings::new())
            .child(ElementNode::widget(NodeId::from_u32(2), "heading", Settings::new()));
        assert!(Validator::is_valid_elements(std::slice::from_ref(&good)));

        let bad = good.clone().child(ElementNode::widget(NodeId::from_raw("nope"), "image", Settings::new()));
        let err = Validator::validate_elements(&[bad]).unwrap_err();
        assert_eq!(err.hint.as_deref(), Some("content[0].elements[1]"));

        let untyped = ElementNode::widget(NodeId::from_u32(3), "", Settings::new());
        assert_eq!(Validator::validate_elements(&[untyped]).unwrap_err().rule, "widgetType");
    }
}
