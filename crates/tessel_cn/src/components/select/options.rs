//! Option trees for the select component
//!
//! Callers describe choices with [`CallerOption`], a loose shape that accepts
//! alternate field names (`label` or `text`, `groupName` for groups) and any
//! number of extra fields. [`normalize`] turns a caller tree into
//! [`CanonicalOption`]s, the shape the dropdown widget understands.
//!
//! ```ignore
//! let tree = vec![
//!     CallerOption::new("apple", "Apple"),
//!     CallerOption::group("Citrus", vec![
//!         CallerOption::new("lemon", "Lemon"),
//!         CallerOption::new("lime", "Lime").disabled(),
//!     ]),
//! ];
//!
//! let canonical = normalize(&tree);
//! assert_eq!(canonical[1].label, "Citrus");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names owned by [`CanonicalOption`]; never copied from caller extras
const CANONICAL_FIELDS: [&str; 4] = ["value", "label", "isDisabled", "options"];

/// A choice (or group of choices) as supplied by the caller
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerOption {
    /// Identity of a leaf choice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Alternate display label, used when `label` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Group heading; takes precedence over `label` for groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    /// Nested choices. Presence makes this node a group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<CallerOption>>,
    /// Whether this choice can be selected
    #[serde(default)]
    pub disabled: bool,
    /// Widget-specific fields passed through to leaves untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CallerOption {
    /// Create a leaf with value and label
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            label: Some(label.into()),
            ..Default::default()
        }
    }

    /// Create a leaf labelled through the `text` field
    pub fn with_text(value: impl Into<Value>, text: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Create a group with a heading and nested choices
    pub fn group(name: impl Into<String>, items: Vec<CallerOption>) -> Self {
        Self {
            group_name: Some(name.into()),
            items: Some(items),
            ..Default::default()
        }
    }

    /// Mark this option as disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Attach an extra field
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether this node is a group
    pub fn is_group(&self) -> bool {
        self.items.is_some()
    }
}

/// A normalized option record
///
/// A node is either a group (`options` is `Some`) or a leaf. Groups carry
/// `Value::Null` unless the caller gave them a value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalOption {
    pub value: Value,
    pub label: String,
    pub is_disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<CanonicalOption>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CanonicalOption {
    /// Create a leaf record
    pub fn leaf(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            is_disabled: false,
            options: None,
            extra: Map::new(),
        }
    }

    /// Whether this node is a group
    pub fn is_group(&self) -> bool {
        self.options.is_some()
    }

    /// Nested options of a group (empty for a leaf)
    pub fn children(&self) -> &[CanonicalOption] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Depth-first iterator over every leaf beneath (or equal to) this node
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            stack: vec![std::slice::from_ref(self).iter()],
        }
    }
}

/// Depth-first leaf iterator, see [`CanonicalOption::leaves`] and [`leaves`]
pub struct Leaves<'a> {
    stack: Vec<std::slice::Iter<'a, CanonicalOption>>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a CanonicalOption;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(iter) = self.stack.last_mut() {
            match iter.next() {
                Some(node) => match &node.options {
                    Some(children) => self.stack.push(children.iter()),
                    None => return Some(node),
                },
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// Depth-first iterator over every leaf of a tree
pub fn leaves(tree: &[CanonicalOption]) -> Leaves<'_> {
    Leaves {
        stack: vec![tree.iter()],
    }
}

/// Convert a caller tree into canonical records
///
/// Structure-preserving: nothing is dropped, reordered or deduplicated.
pub fn normalize(tree: &[CallerOption]) -> Vec<CanonicalOption> {
    tree.iter().map(normalize_node).collect()
}

fn normalize_node(node: &CallerOption) -> CanonicalOption {
    match &node.items {
        Some(items) => CanonicalOption {
            value: node.value.clone().unwrap_or(Value::Null),
            label: first_label([&node.group_name, &node.label, &node.text]),
            is_disabled: node.disabled,
            options: Some(normalize(items)),
            extra: Map::new(),
        },
        None => CanonicalOption {
            value: node.value.clone().unwrap_or(Value::Null),
            label: first_label([&node.label, &node.text]),
            is_disabled: node.disabled,
            options: None,
            extra: passthrough_fields(&node.extra),
        },
    }
}

fn passthrough_fields(extra: &Map<String, Value>) -> Map<String, Value> {
    extra
        .iter()
        .filter(|(k, _)| !CANONICAL_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn first_label<const N: usize>(candidates: [&Option<String>; N]) -> String {
    candidates
        .into_iter()
        .find_map(|c| c.clone())
        .unwrap_or_default()
}

/// Decode a caller tree from JSON
pub fn parse_options(json: &str) -> crate::Result<Vec<CallerOption>> {
    Ok(serde_json::from_str(json)?)
}

/// Number of leaves in a caller tree
pub fn leaf_count(tree: &[CallerOption]) -> usize {
    tree.iter()
        .map(|node| match &node.items {
            Some(items) => leaf_count(items),
            None => 1,
        })
        .sum()
}

/// Maximum group nesting of a caller tree (a flat list has depth 0)
pub fn depth(tree: &[CallerOption]) -> usize {
    tree.iter()
        .filter_map(|node| node.items.as_ref())
        .map(|items| 1 + depth(items))
        .max()
        .unwrap_or(0)
}

/// Free-text filter used in searchable mode
///
/// Matches leaves whose label or value contains `query` (case-insensitive).
/// Groups survive only when a descendant matches. An empty query returns
/// the tree unchanged.
pub fn filter_options(tree: &[CanonicalOption], query: &str) -> Vec<CanonicalOption> {
    let query = query.trim();
    if query.is_empty() {
        return tree.to_vec();
    }
    let query_lower = query.to_lowercase();
    filter_nodes(tree, &query_lower)
}

fn filter_nodes(tree: &[CanonicalOption], query_lower: &str) -> Vec<CanonicalOption> {
    tree.iter()
        .filter_map(|node| match &node.options {
            Some(children) => {
                let kept = filter_nodes(children, query_lower);
                (!kept.is_empty()).then(|| CanonicalOption {
                    options: Some(kept),
                    ..node.clone()
                })
            }
            None => leaf_matches(node, query_lower).then(|| node.clone()),
        })
        .collect()
}

fn leaf_matches(leaf: &CanonicalOption, query_lower: &str) -> bool {
    if leaf.label.to_lowercase().contains(query_lower) {
        return true;
    }
    match &leaf.value {
        Value::String(s) => s.to_lowercase().contains(query_lower),
        Value::Number(n) => n.to_string().contains(query_lower),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_caller_fields_cannot_shadow_canonical_fields() {
        let tree = parse_options(
            r#"[{"value": "x", "label": "X", "isDisabled": true, "options": [1], "color": "red"}]"#,
        )
        .unwrap();
        let out = normalize(&tree);

        assert!(!out[0].is_disabled);
        assert!(!out[0].is_group());
        assert_eq!(out[0].extra.len(), 1);
        assert_eq!(out[0].extra["color"], json!("red"));

        let encoded = serde_json::to_string(&out[0]).unwrap();
        assert_eq!(
            encoded,
            r#"{"value":"x","label":"X","isDisabled":false,"color":"red"}"#
        );
        let decoded: CanonicalOption = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, out[0]);
    }

    #[test]
    fn test_builder_extras_cannot_shadow_canonical_fields() {
        let caller = CallerOption::new("x", "X")
            .field("value", "spoofed")
            .field("label", "Spoofed")
            .field("team", 7);
        let out = normalize(&[caller]);

        assert_eq!(out[0].value, json!("x"));
        assert_eq!(out[0].label, "X");
        assert_eq!(out[0].extra.keys().collect::<Vec<_>>(), vec!["team"]);
    }

    #[test]
    fn test_leaf_label_falls_back_to_text() {
        let out = normalize(&[
            CallerOption::new("a", "Alpha"),
            CallerOption::with_text("b", "Bravo"),
            CallerOption {
                value: Some(json!("c")),
                ..Default::default()
            },
        ]);

        assert_eq!(out[0].label, "Alpha");
        assert_eq!(out[1].label, "Bravo");
        assert_eq!(out[2].label, "");
    }

    #[test]
    fn test_group_label_precedence() {
        let mut g = CallerOption::group("Heading", vec![CallerOption::new("x", "X")]);
        g.label = Some("Label".into());
        g.text = Some("Text".into());
        assert_eq!(normalize(&[g.clone()])[0].label, "Heading");

        g.group_name = None;
        assert_eq!(normalize(&[g.clone()])[0].label, "Label");

        g.label = None;
        assert_eq!(normalize(&[g])[0].label, "Text");
    }

    #[test]
    fn test_disabled_and_extra_fields_pass_through() {
        let out = normalize(&[CallerOption::new(1, "One")
            .disabled()
            .field("icon", "star")
            .field("rank", 3)]);

        assert!(out[0].is_disabled);
        assert_eq!(out[0].value, json!(1));
        assert_eq!(out[0].extra.get("icon"), Some(&json!("star")));
        assert_eq!(out[0].extra.get("rank"), Some(&json!(3)));
    }

    #[test]
    fn test_group_becomes_options() {
        let out = normalize(&[
            CallerOption::new("a", "A"),
            CallerOption::group("G", vec![CallerOption::new("b", "B")]),
        ]);

        assert!(!out[0].is_group());
        assert!(out[1].is_group());
        assert_eq!(out[1].value, Value::Null);
        assert_eq!(out[1].children(), &[CanonicalOption::leaf("b", "B")]);
    }

    #[test]
    fn test_empty_group_stays_a_group() {
        let out = normalize(&[CallerOption::group("Empty", vec![])]);
        assert_eq!(out[0].options, Some(vec![]));
        assert_eq!(leaves(&out).count(), 0);
    }

    #[test]
    fn test_parse_options_accepts_alternate_field_names() {
        let tree = parse_options(
            r#"[
                {"value": "a", "text": "Alpha"},
                {"groupName": "Greek", "items": [
                    {"value": "b", "label": "Beta", "disabled": true, "hint": "second"}
                ]}
            ]"#,
        )
        .unwrap();

        let out = normalize(&tree);
        assert_eq!(out[0].label, "Alpha");
        assert_eq!(out[1].label, "Greek");
        let beta = &out[1].children()[0];
        assert!(beta.is_disabled);
        assert_eq!(beta.extra.get("hint"), Some(&json!("second")));
    }

    #[test]
    fn test_parse_options_rejects_malformed_json() {
        let err = parse_options("[{\"value\": ").unwrap_err();
        assert!(matches!(err, crate::SelectError::InvalidOptions(_)));
    }

    #[test]
    fn test_canonical_serializes_camel_case() {
        let json = serde_json::to_value(CanonicalOption::leaf("a", "A")).unwrap();
        assert_eq!(json, json!({"value": "a", "label": "A", "isDisabled": false}));
    }

    #[test]
    fn test_filter_options() {
        let tree = normalize(&[
            CallerOption::new("apple", "Apple"),
            CallerOption::group(
                "Citrus",
                vec![CallerOption::new("lemon", "Lemon"), CallerOption::new("lime", "Lime")],
            ),
            CallerOption::group("Berries", vec![CallerOption::new("straw", "Strawberry")]),
        ]);

        let out = filter_options(&tree, "LEM");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, "Citrus");
        assert_eq!(out[0].children().len(), 1);

        // Matches on value too
        assert_eq!(filter_options(&tree, "straw")[0].label, "Berries");

        assert_eq!(filter_options(&tree, "  "), tree);
        assert!(filter_options(&tree, "kiwi").is_empty());
    }

    #[test]
    fn test_leaf_count_and_depth() {
        let tree = vec![
            CallerOption::new("a", "A"),
            CallerOption::group(
                "G",
                vec![
                    CallerOption::new("b", "B"),
                    CallerOption::group("H", vec![CallerOption::new("c", "C")]),
                ],
            ),
        ];
        assert_eq!(leaf_count(&tree), 3);
        assert_eq!(depth(&tree), 2);
        assert_eq!(depth(&tree[..1]), 0);
    }

    fn caller_tree() -> impl Strategy<Value = Vec<CallerOption>> {
        let leaf = (0u32..50, "[a-z]{0,6}").prop_map(|(v, l)| CallerOption::new(v, l));
        let node = leaf.prop_recursive(3, 24, 4, |inner| {
            ("[A-Z]{1,4}", prop::collection::vec(inner, 0..4))
                .prop_map(|(name, items)| CallerOption::group(name, items))
        });
        prop::collection::vec(node, 0..6)
    }

    fn canonical_depth(tree: &[CanonicalOption]) -> usize {
        tree.iter()
            .filter_map(|n| n.options.as_ref())
            .map(|c| 1 + canonical_depth(c))
            .max()
            .unwrap_or(0)
    }

    proptest! {
        #[test]
        fn prop_normalize_preserves_structure(tree in caller_tree()) {
            let out = normalize(&tree);
            prop_assert_eq!(out.len(), tree.len());
            prop_assert_eq!(leaves(&out).count(), leaf_count(&tree));
            prop_assert_eq!(canonical_depth(&out), depth(&tree));
        }

        #[test]
        fn prop_normalize_preserves_leaf_order(tree in caller_tree()) {
            fn caller_values(tree: &[CallerOption], out: &mut Vec<Value>) {
                for node in tree {
                    match &node.items {
                        Some(items) => caller_values(items, out),
                        None => out.push(node.value.clone().unwrap_or(Value::Null)),
                    }
                }
            }
            let mut expected = Vec::new();
            caller_values(&tree, &mut expected);

            let out = normalize(&tree);
            let actual: Vec<Value> = leaves(&out).map(|l| l.value.clone()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
