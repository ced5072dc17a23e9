//! Change events emitted to the surrounding form system
//!
//! The dropdown reports raw records; forms want keys. Every selection is
//! translated into `{ target: { name, value } }` where `value` is built by the
//! key extractor and shaped by the declared multiplicity: an array of keys in
//! multi mode (empty when cleared), otherwise one key or `null`.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::options::CanonicalOption;
use super::resolve::KeyExtractor;

/// What the dropdown reports when its selection changes
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    /// Selection cleared
    None,
    /// A single record (scalar mode)
    One(CanonicalOption),
    /// Several records (multi mode)
    Many(Vec<CanonicalOption>),
}

/// Field name and extracted key(s)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChangeTarget {
    pub name: Option<String>,
    pub value: Value,
}

/// Uniform change event
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub target: ChangeTarget,
}

impl ChangeEvent {
    /// Build an event from a dropdown selection
    ///
    /// `multiple` decides the shape of `value`, whatever the widget reported.
    /// A scalar select handed several records keeps the first.
    pub fn from_selection(
        name: Option<&str>,
        selection: &Selection,
        key: &KeyExtractor,
        multiple: bool,
    ) -> Self {
        let records: &[CanonicalOption] = match selection {
            Selection::None => &[],
            Selection::One(option) => std::slice::from_ref(option),
            Selection::Many(options) => options,
        };
        let value = if multiple {
            Value::Array(records.iter().map(|o| key.key(o)).collect())
        } else {
            records.first().map_or(Value::Null, |o| key.key(o))
        };
        Self {
            target: ChangeTarget {
                name: name.map(str::to_string),
                value,
            },
        }
    }
}

/// Callback receiving change events
pub type ChangeHandler = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_selection_emits_scalar() {
        let event = ChangeEvent::from_selection(
            Some("fruit"),
            &Selection::One(CanonicalOption::leaf("apple", "Apple")),
            &KeyExtractor::default(),
            false,
        );
        assert_eq!(event.target.name.as_deref(), Some("fruit"));
        assert_eq!(event.target.value, json!("apple"));
    }

    #[test]
    fn test_many_selection_emits_array() {
        let event = ChangeEvent::from_selection(
            None,
            &Selection::Many(vec![
                CanonicalOption::leaf(2, "Two"),
                CanonicalOption::leaf(1, "One"),
            ]),
            &KeyExtractor::default(),
            true,
        );
        assert_eq!(event.target.value, json!([2, 1]));
    }

    #[test]
    fn test_cleared_selection_emits_null() {
        let key = KeyExtractor::default();
        let event = ChangeEvent::from_selection(Some("f"), &Selection::None, &key, false);
        assert_eq!(event.target.value, Value::Null);
    }

    #[test]
    fn test_multi_mode_always_emits_array() {
        let key = KeyExtractor::default();
        let one = Selection::One(CanonicalOption::leaf("a", "A"));

        let event = ChangeEvent::from_selection(Some("f"), &one, &key, true);
        assert_eq!(event.target.value, json!(["a"]));

        let event = ChangeEvent::from_selection(Some("f"), &Selection::None, &key, true);
        assert_eq!(event.target.value, json!([]));
    }

    #[test]
    fn test_scalar_mode_never_emits_array() {
        let key = KeyExtractor::default();
        let many = Selection::Many(vec![
            CanonicalOption::leaf("b", "B"),
            CanonicalOption::leaf("c", "C"),
        ]);

        let event = ChangeEvent::from_selection(None, &many, &key, false);
        assert_eq!(event.target.value, json!("b"));

        let event = ChangeEvent::from_selection(None, &Selection::Many(Vec::new()), &key, false);
        assert_eq!(event.target.value, Value::Null);
    }

    #[test]
    fn test_custom_extractor_and_serialized_shape() {
        let key = KeyExtractor::new(|o| json!(o.label.to_lowercase()));
        let event = ChangeEvent::from_selection(
            Some("lang"),
            &Selection::One(CanonicalOption::leaf(7, "Rust")),
            &key,
            false,
        );
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"target": {"name": "lang", "value": "rust"}})
        );
    }
}
