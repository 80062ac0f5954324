//! Declarative field conditions.
//!
//! Three shapes are accepted, tried in this order when deserializing:
//! - a group: `{ "logic": "AND" | "OR", "conditions": [...] }`
//! - an operator condition: `{ "field", "operator", "value" }`
//! - a legacy condition without an operator: `{ "field", "value" }`
//!
//! Comparisons treat a missing field as `undefined`, which is distinct from
//! `null`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Current values of every field in a form.
pub type FormValues = HashMap<String, Value>;

/// Custom predicate over the watched value and the whole form.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(Option<&Value>, &FormValues) -> bool + Send + Sync>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, &FormValues) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, value: Option<&Value>, values: &FormValues) -> bool {
        (self.0)(value, values)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
    In,
}

impl Operator {
    /// Apply the operator to the watched value and the configured value.
    pub fn apply(self, actual: Option<&Value>, expected: Option<&Value>) -> bool {
        match self {
            Operator::Eq => strict_eq(actual, expected),
            Operator::Neq => !strict_eq(actual, expected),
            Operator::Gt => compare(actual, expected).is_some_and(|o| o.is_gt()),
            Operator::Gte => compare(actual, expected).is_some_and(|o| o.is_ge()),
            Operator::Lt => compare(actual, expected).is_some_and(|o| o.is_lt()),
            Operator::Lte => compare(actual, expected).is_some_and(|o| o.is_le()),
            Operator::Contains => match actual {
                Some(Value::Array(items)) => items.iter().any(|i| strict_eq(Some(i), expected)),
                Some(Value::String(s)) => expected.and_then(as_text).is_some_and(|e| s.contains(e.as_str())),
                _ => false,
            },
            Operator::StartsWith => match (actual, expected.and_then(as_text)) {
                (Some(Value::String(s)), Some(e)) => s.starts_with(e.as_str()),
                _ => false,
            },
            Operator::EndsWith => match (actual, expected.and_then(as_text)) {
                (Some(Value::String(s)), Some(e)) => s.ends_with(e.as_str()),
                _ => false,
            },
            Operator::In => match expected {
                Some(Value::Array(items)) => items.iter().any(|i| strict_eq(actual, Some(i))),
                _ => false,
            },
        }
    }
}

/// `===` over JSON values. `None` is `undefined`.
pub fn strict_eq(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (None, Some(_)) | (Some(_), None) => false,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.as_f64() == y.as_f64(),
        (Some(x), Some(y)) => x == y,
    }
}

/// Relational comparison. Two strings compare lexically, anything else is
/// coerced to a number; `undefined` and unparsable strings never compare.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Option<std::cmp::Ordering> {
    if let (Some(Value::String(x)), Some(Value::String(y))) = (a, b) {
        return Some(x.cmp(y));
    }
    to_number(a)?.partial_cmp(&to_number(b)?)
}

fn to_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse().ok(),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// A present `value` key, `null` included, is `Some`; only an absent key is
/// `None` (`undefined`).
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A single operator-based condition on one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Overrides `operator` when set.
    #[serde(skip)]
    pub predicate: Option<Predicate>,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value.into()),
            predicate: None,
        }
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn evaluate(&self, values: &FormValues) -> bool {
        let actual = values.get(&self.field);
        match &self.predicate {
            Some(predicate) => predicate.call(actual, values),
            None => self.operator.apply(actual, self.value.as_ref()),
        }
    }
}

/// Condition shape predating operators: strict equality against `value`, or
/// a predicate over the field value.
///
/// Unknown keys are rejected so a misspelled `operator` never degrades into
/// an equality check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyCondition {
    pub field: String,
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip)]
    pub predicate: Option<Predicate>,
}

impl LegacyCondition {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: Some(value.into()),
            predicate: None,
        }
    }

    pub fn predicate(field: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            field: field.into(),
            value: None,
            predicate: Some(predicate),
        }
    }

    pub fn evaluate(&self, values: &FormValues) -> bool {
        let actual = values.get(&self.field);
        match &self.predicate {
            Some(predicate) => predicate.call(actual, values),
            None => strict_eq(actual, self.value.as_ref()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionGroup {
    #[serde(default)]
    pub logic: Logic,
    pub conditions: Vec<ConditionNode>,
}

impl ConditionGroup {
    pub fn all(conditions: Vec<ConditionNode>) -> Self {
        Self { logic: Logic::And, conditions }
    }

    pub fn any(conditions: Vec<ConditionNode>) -> Self {
        Self { logic: Logic::Or, conditions }
    }

    pub fn evaluate(&self, values: &FormValues) -> bool {
        match self.logic {
            Logic::And => self.conditions.iter().all(|c| c.evaluate(values)),
            Logic::Or => self.conditions.iter().any(|c| c.evaluate(values)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Group(ConditionGroup),
    Single(Condition),
    Legacy(LegacyCondition),
}

impl ConditionNode {
    pub fn evaluate(&self, values: &FormValues) -> bool {
        match self {
            ConditionNode::Group(group) => group.evaluate(values),
            ConditionNode::Single(condition) => condition.evaluate(values),
            ConditionNode::Legacy(condition) => condition.evaluate(values),
        }
    }

    /// Every field this node reads, in first-seen order.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        let field = match self {
            ConditionNode::Group(group) => {
                for child in &group.conditions {
                    child.collect_fields(out);
                }
                return;
            }
            ConditionNode::Single(c) => c.field.as_str(),
            ConditionNode::Legacy(c) => c.field.as_str(),
        };
        if !out.contains(&field) {
            out.push(field);
        }
    }
}

impl From<Condition> for ConditionNode {
    fn from(c: Condition) -> Self {
        ConditionNode::Single(c)
    }
}

impl From<LegacyCondition> for ConditionNode {
    fn from(c: LegacyCondition) -> Self {
        ConditionNode::Legacy(c)
    }
}

impl From<ConditionGroup> for ConditionNode {
    fn from(g: ConditionGroup) -> Self {
        ConditionNode::Group(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn values(pairs: &[(&str, Value)]) -> FormValues {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_undefined_semantics() {
        assert!(strict_eq(None, None));
        assert!(!strict_eq(None, Some(&Value::Null)));
        assert!(strict_eq(Some(&json!(1)), Some(&json!(1.0))));
        assert!(!strict_eq(Some(&json!("1")), Some(&json!(1))));

        assert!(!Operator::Gt.apply(None, Some(&json!(0))));
        assert!(!Operator::Lte.apply(None, Some(&json!(0))));
        assert!(Operator::Eq.apply(None, None));
    }

    #[test]
    fn test_ordering_operators() {
        assert!(Operator::Gt.apply(Some(&json!(5)), Some(&json!(3))));
        assert!(Operator::Gte.apply(Some(&json!(3)), Some(&json!(3))));
        assert!(Operator::Lt.apply(Some(&json!("10")), Some(&json!(20))));
        assert!(Operator::Lt.apply(Some(&json!("apple")), Some(&json!("banana"))));
        assert!(!Operator::Gt.apply(Some(&json!("abc")), Some(&json!(1))));
    }

    #[test]
    fn test_text_and_membership_operators() {
        assert!(Operator::Contains.apply(Some(&json!("hello world")), Some(&json!("lo w"))));
        assert!(Operator::Contains.apply(Some(&json!(["a", "b"])), Some(&json!("b"))));
        assert!(!Operator::Contains.apply(None, Some(&json!("x"))));
        assert!(Operator::StartsWith.apply(Some(&json!("admin_1")), Some(&json!("admin"))));
        assert!(Operator::EndsWith.apply(Some(&json!("file.pdf")), Some(&json!(".pdf"))));
        assert!(Operator::In.apply(Some(&json!(2)), Some(&json!([1, 2, 3]))));
        assert!(!Operator::In.apply(Some(&json!(4)), Some(&json!([1, 2, 3]))));
        assert!(!Operator::In.apply(Some(&json!(1)), Some(&json!("1"))));
    }

    #[test]
    fn test_predicate_takes_priority_over_operator() {
        let cond = Condition::new("age", Operator::Eq, 99)
            .with_predicate(Predicate::new(|v, _| v.and_then(Value::as_i64) == Some(18)));
        assert!(cond.evaluate(&values(&[("age", json!(18))])));
        assert!(!cond.evaluate(&values(&[("age", json!(99))])));
    }

    #[test]
    fn test_and_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let probe = Condition::new("x", Operator::Eq, 0).with_predicate(Predicate::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }));

        let group = ConditionGroup::all(vec![
            Condition::new("a", Operator::Eq, 1).into(),
            probe.clone().into(),
        ]);
        assert!(!group.evaluate(&values(&[("a", json!(2))])));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let group = ConditionGroup::any(vec![
            Condition::new("a", Operator::Eq, 2).into(),
            probe.into(),
        ]);
        assert!(group.evaluate(&values(&[("a", json!(2))])));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_nested_groups() {
        // type == "company" AND (employees > 50 OR listed == true)
        let node: ConditionNode = ConditionGroup::all(vec![
            Condition::new("type", Operator::Eq, "company").into(),
            ConditionGroup::any(vec![
                Condition::new("employees", Operator::Gt, 50).into(),
                Condition::new("listed", Operator::Eq, true).into(),
            ])
            .into(),
        ])
        .into();

        assert!(node.evaluate(&values(&[("type", json!("company")), ("listed", json!(true))])));
        assert!(!node.evaluate(&values(&[("type", json!("company")), ("employees", json!(10))])));
        assert_eq!(node.fields(), vec!["type", "employees", "listed"]);
    }

    #[test]
    fn test_legacy_shape() {
        let eq = LegacyCondition::equals("status", "active");
        assert!(eq.evaluate(&values(&[("status", json!("active"))])));
        assert!(!eq.evaluate(&values(&[])));

        let pred = LegacyCondition::predicate("tags", Predicate::new(|v, _| v.is_some()));
        assert!(pred.evaluate(&values(&[("tags", json!([]))])));
    }

    #[test]
    fn test_deserialize_shapes() {
        let node: ConditionNode = serde_json::from_value(json!({
            "logic": "OR",
            "conditions": [
                { "field": "role", "operator": "in", "value": ["admin", "editor"] },
                { "field": "owner", "value": true }
            ]
        }))
        .unwrap();

        let ConditionNode::Group(group) = &node else {
            panic!("expected group");
        };
        assert_eq!(group.logic, Logic::Or);
        assert!(matches!(group.conditions[0], ConditionNode::Single(_)));
        assert!(matches!(group.conditions[1], ConditionNode::Legacy(_)));
        assert!(node.evaluate(&values(&[("owner", json!(true))])));
    }

    #[test]
    fn test_explicit_null_value_is_not_undefined() {
        let eq: ConditionNode =
            serde_json::from_value(json!({ "field": "x", "operator": "eq", "value": null })).unwrap();
        let neq: ConditionNode =
            serde_json::from_value(json!({ "field": "x", "operator": "neq", "value": null })).unwrap();
        let legacy: ConditionNode = serde_json::from_value(json!({ "field": "x", "value": null })).unwrap();

        let null_x = values(&[("x", Value::Null)]);
        assert!(eq.evaluate(&null_x));
        assert!(!neq.evaluate(&null_x));
        assert!(matches!(legacy, ConditionNode::Legacy(_)));
        assert!(legacy.evaluate(&null_x));

        // a missing field is undefined, which is not null
        let empty = values(&[]);
        assert!(!eq.evaluate(&empty));
        assert!(!legacy.evaluate(&empty));
    }

    #[test]
    fn test_absent_value_stays_undefined() {
        let node: ConditionNode = serde_json::from_value(json!({ "field": "x", "operator": "eq" })).unwrap();
        assert!(node.evaluate(&values(&[])));
        assert!(!node.evaluate(&values(&[("x", Value::Null)])));
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let result = serde_json::from_value::<ConditionNode>(json!({
            "field": "x",
            "operator": "regex",
            "value": "a"
        }));
        assert!(result.is_err());

        let nested = serde_json::from_value::<ConditionNode>(json!({
            "logic": "AND",
            "conditions": [{ "field": "x", "operator": "matches", "value": 1 }]
        }));
        assert!(nested.is_err());
    }
}
