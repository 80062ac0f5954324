//! Field-condition evaluation over a form's values.
//!
//! Rules are re-evaluated synchronously whenever a field they watch changes.
//! `setValue` actions write through an [`EvalContext`] guard; a write made
//! while the guard is held updates the value but does not re-trigger
//! evaluation, so every pass terminates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::condition::{ConditionNode, FormValues};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Action {
    Show,
    Hide,
    Enable,
    Disable,
    SetValue(Value),
}

/// Applies `action` to `field` according to `when`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRule {
    pub field: String,
    pub when: ConditionNode,
    pub action: Action,
}

impl FieldRule {
    pub fn new(field: impl Into<String>, when: impl Into<ConditionNode>, action: Action) -> Self {
        Self {
            field: field.into(),
            when: when.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    pub visible: bool,
    pub disabled: bool,
}

impl Default for FieldState {
    fn default() -> Self {
        Self {
            visible: true,
            disabled: false,
        }
    }
}

/// Reentrancy guard for one evaluation pass.
#[derive(Debug, Default)]
pub struct EvalContext {
    setting_value: u32,
}

impl EvalContext {
    /// True while a `setValue` write is in progress.
    pub fn is_setting_value(&self) -> bool {
        self.setting_value > 0
    }

    pub fn depth(&self) -> u32 {
        self.setting_value
    }

    fn enter(&mut self) {
        self.setting_value += 1;
    }

    fn exit(&mut self) {
        self.setting_value = self.setting_value.saturating_sub(1);
    }
}

#[derive(Debug, Default)]
pub struct FieldConditionEngine {
    rules: Vec<FieldRule>,
    values: FormValues,
    static_states: HashMap<String, FieldState>,
    states: HashMap<String, FieldState>,
    // watched field -> indexes into `rules`
    watchers: HashMap<String, Vec<usize>>,
}

impl FieldConditionEngine {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        let mut watchers: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, rule) in rules.iter().enumerate() {
            for field in rule.when.fields() {
                watchers.entry(field.to_string()).or_default().push(idx);
            }
        }

        Self {
            rules,
            watchers,
            ..Self::default()
        }
    }

    /// Static state a field starts from before any rule is applied.
    pub fn with_static_state(mut self, field: impl Into<String>, state: FieldState) -> Self {
        let field = field.into();
        self.states.insert(field.clone(), state);
        self.static_states.insert(field, state);
        self
    }

    pub fn with_values(mut self, values: FormValues) -> Self {
        self.values = values;
        self
    }

    /// Reset every field to its static state and apply all rules in order.
    pub fn evaluate_all(&mut self) {
        self.states = self.static_states.clone();
        let mut ctx = EvalContext::default();
        for idx in 0..self.rules.len() {
            self.apply_rule(idx, &mut ctx);
        }
    }

    /// Write a field value and re-evaluate the rules watching it.
    pub fn set_value(&mut self, field: impl Into<String>, value: Value) {
        let mut ctx = EvalContext::default();
        self.write(field.into(), value, &mut ctx);
    }

    pub fn state(&self, field: &str) -> FieldState {
        self.states.get(field).copied().unwrap_or_default()
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    fn write(&mut self, field: String, value: Value, ctx: &mut EvalContext) {
        if self.values.get(&field) == Some(&value) {
            return;
        }
        self.values.insert(field.clone(), value);

        if ctx.is_setting_value() {
            tracing::trace!(field = %field, depth = ctx.depth(), "Suppressed re-evaluation for guarded write");
            return;
        }

        let watching = self.watchers.get(&field).cloned().unwrap_or_default();
        for idx in watching {
            self.apply_rule(idx, ctx);
        }
    }

    fn apply_rule(&mut self, idx: usize, ctx: &mut EvalContext) {
        let rule = &self.rules[idx];
        let result = rule.when.evaluate(&self.values);
        let target = rule.field.clone();

        let next_value = match &rule.action {
            Action::SetValue(value) if result => Some(value.clone()),
            Action::SetValue(_) => None,
            action => {
                let state = self.states.entry(target.clone()).or_default();
                match action {
                    Action::Show => state.visible = result,
                    Action::Hide => state.visible = !result,
                    Action::Enable => state.disabled = !result,
                    Action::Disable => state.disabled = result,
                    Action::SetValue(_) => {}
                }
                None
            }
        };

        tracing::trace!(field = %target, result, "Applied field rule");

        if let Some(value) = next_value {
            ctx.enter();
            self.write(target, value, ctx);
            ctx.exit();
        }
    }
}
