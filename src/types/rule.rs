use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::registry::RuleType;
use super::session::Session;
use super::variables::Variables;
use crate::parse::ParseError;

/// A single evaluable unit of logic.
///
/// `test` returns `true` to let the enclosing [`RuleSet`](super::RuleSet)
/// carry on and `false` to stop it: no further rules of that set run and its
/// children are skipped. Side effects (setting variables, recording issues,
/// calling other rule sets) go through the [`Session`].
///
/// `input` is whatever object the current rule set is being evaluated
/// against; kinds downcast it to the type they understand.
pub trait Rule: Any + Send + Sync + fmt::Debug {
    fn test(&self, session: &mut Session<'_>, input: &dyn Any) -> bool;
}

/// A rule instance configured from one definition line.
///
/// Besides the configured rule it keeps the raw templates of fields that
/// were marked dynamic (`--field$ ...`). Those are substituted against the
/// current variables and re-applied before every evaluation.
pub struct ParsedRule {
    kind: Arc<RuleType>,
    rule: Box<dyn Rule>,
    dynamic: Vec<(String, String)>,
}

impl ParsedRule {
    /// A default-configured instance of `kind`.
    #[must_use]
    pub fn new(kind: Arc<RuleType>) -> Self {
        let rule = kind.instantiate();
        Self {
            kind,
            rule,
            dynamic: Vec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &RuleType {
        &self.kind
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        self.kind.name()
    }

    /// The configured rule as resolved at parse time.
    #[must_use]
    pub fn rule(&self) -> &dyn Rule {
        self.rule.as_ref()
    }

    /// The configured rule, if it is of concrete type `R`.
    #[must_use]
    pub fn downcast_ref<R: Rule>(&self) -> Option<&R> {
        let rule: &dyn Any = &*self.rule;
        rule.downcast_ref::<R>()
    }

    /// Assign a field from substituted text.
    ///
    /// Returns `Ok(false)` when the kind does not declare the field.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::FieldCoercion`] if the text does not convert to
    /// the field's kind.
    pub fn set_field(&mut self, field: &str, text: &str) -> Result<bool, ParseError> {
        self.kind.assign(self.rule.as_mut(), field, text)
    }

    /// Record the raw template of a dynamic field. Setting the same field
    /// twice keeps the last template.
    pub fn set_dynamic_value(&mut self, field: impl Into<String>, template: impl Into<String>) {
        let field = field.into();
        let template = template.into();
        match self.dynamic.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = template,
            None => self.dynamic.push((field, template)),
        }
    }

    /// Raw templates of dynamic fields, in the order they were declared.
    pub fn dynamic_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dynamic.iter().map(|(f, t)| (f.as_str(), t.as_str()))
    }

    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        !self.dynamic.is_empty()
    }

    /// Produce a copy of the configured rule with every dynamic field
    /// re-substituted against `variables`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::FieldCoercion`] if a substituted value does not
    /// convert to its field's kind.
    pub fn resolve(&self, variables: &Variables) -> Result<Box<dyn Rule>, ParseError> {
        let mut rule = self.kind.clone_rule(self.rule.as_ref()).ok_or_else(|| {
            ParseError::malformed(format!("rule is not an instance of '{}'", self.kind.name()))
        })?;

        for (field, template) in &self.dynamic {
            let text = variables.substitute(template);
            self.kind.assign(rule.as_mut(), field, &text)?;
        }

        Ok(rule)
    }

    /// Evaluate the rule, re-resolving dynamic fields first.
    ///
    /// A dynamic field that no longer converts to its kind makes the rule
    /// fail, which stops the enclosing rule set.
    pub fn test(&self, session: &mut Session<'_>, input: &dyn Any) -> bool {
        if self.dynamic.is_empty() {
            return self.rule.test(session, input);
        }

        match self.resolve(session.variables()) {
            Ok(rule) => rule.test(session, input),
            Err(err) => {
                warn!(rule_type = %self.kind.name(), error = %err, "failed to resolve dynamic fields");
                false
            }
        }
    }
}

impl fmt::Debug for ParsedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedRule")
            .field("type", &self.kind.name())
            .field("rule", &self.rule)
            .field("dynamic", &self.dynamic)
            .finish()
    }
}
