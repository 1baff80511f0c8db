use std::any::Any;
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::{debug, trace};

use super::error::RegistryError;
use super::rule::Rule;
use super::value::{FieldKind, FieldValue, Value};
use crate::parse::ParseError;

type Factory = Box<dyn Fn() -> Box<dyn Rule> + Send + Sync>;
type Cloner = fn(&dyn Rule) -> Option<Box<dyn Rule>>;
type Setter = Box<dyn Fn(&mut dyn Rule, Value) -> Assigned + Send + Sync>;

/// Outcome of one typed setter call.
enum Assigned {
    Set,
    /// The rule is not an instance of the setter's kind.
    WrongKind,
    /// The coerced value does not fit the setter's Rust type.
    OutOfRange,
}

/// Documentation metadata for one configurable field of a rule type.
///
/// `required` and `default` are informational: they appear in the exported
/// documentation but the parser does not enforce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    description: String,
    required: bool,
    default: Option<String>,
    kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
            default: None,
            kind: FieldKind::String,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, default: impl ToString) -> Self {
        self.default = Some(default.to_string());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

struct FieldEntry {
    field: Field,
    setter: Setter,
}

/// A registered kind of rule: a factory for default-configured instances,
/// a typed setter per field, and the metadata used for documentation.
///
/// Built with [`RuleType::builder`] (or [`RuleType::with_factory`] when the
/// default instance is not `R::default()`).
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use rulecheck::{Field, Rule, RuleType, Session};
///
/// #[derive(Debug, Clone, Default)]
/// struct MinLen {
///     value: String,
///     min: i64,
/// }
///
/// impl Rule for MinLen {
///     fn test(&self, _session: &mut Session<'_>, _input: &dyn Any) -> bool {
///         self.value.len() as i64 >= self.min
///     }
/// }
///
/// let min_len = RuleType::builder::<MinLen>("min-len")
///     .description("Stops when the value is too short")
///     .field(Field::new("value", "Text to measure").required(), |r: &mut MinLen, v: String| {
///         r.value = v
///     })
///     .field(Field::new("min", "Minimum length").default_value(0), |r: &mut MinLen, v: i64| {
///         r.min = v
///     })
///     .build();
///
/// assert_eq!(min_len.name(), "min-len");
/// assert_eq!(min_len.fields().count(), 2);
/// ```
pub struct RuleType {
    name: String,
    description: Option<String>,
    fields: Vec<FieldEntry>,
    factory: Factory,
    cloner: Cloner,
}

impl RuleType {
    #[must_use]
    pub fn builder<R: Rule + Clone + Default>(name: impl Into<String>) -> RuleTypeBuilder<R> {
        Self::with_factory(name, R::default)
    }

    #[must_use]
    pub fn with_factory<R: Rule + Clone>(
        name: impl Into<String>,
        factory: fn() -> R,
    ) -> RuleTypeBuilder<R> {
        RuleTypeBuilder {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            factory,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().map(|e| &e.field)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().find(|f| f.name == name)
    }

    /// Create a default-configured instance of this kind.
    #[must_use]
    pub fn instantiate(&self) -> Box<dyn Rule> {
        (self.factory)()
    }

    /// Coerce `text` to the declared kind of `field` and assign it to `rule`.
    ///
    /// Returns `Ok(false)` when the field is not declared by this kind (the
    /// assignment is ignored) or `rule` is not an instance of this kind.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::FieldCoercion`] if `text` is not a valid value
    /// for the field's kind, or does not fit the setter's type (an integer
    /// outside the range of an `i32` field).
    pub fn assign(&self, rule: &mut dyn Rule, field: &str, text: &str) -> Result<bool, ParseError> {
        let Some(entry) = self.fields.iter().find(|e| e.field.name == field) else {
            trace!(rule_type = %self.name, field, "ignoring unknown field");
            return Ok(false);
        };

        let value = entry
            .field
            .kind
            .coerce(text)
            .ok_or_else(|| ParseError::FieldCoercion {
                field: field.to_owned(),
                value: text.to_owned(),
                kind: entry.field.kind,
            })?;

        match (entry.setter)(rule, value) {
            Assigned::Set => Ok(true),
            Assigned::WrongKind => Ok(false),
            Assigned::OutOfRange => Err(ParseError::FieldCoercion {
                field: field.to_owned(),
                value: text.to_owned(),
                kind: entry.field.kind,
            }),
        }
    }

    /// Copy a configured instance of this kind. `None` if `rule` belongs to
    /// another kind.
    #[must_use]
    pub fn clone_rule(&self, rule: &dyn Rule) -> Option<Box<dyn Rule>> {
        (self.cloner)(rule)
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let invalid = |reason: &str| RegistryError::InvalidKind {
            name: self.name.clone(),
            reason: reason.to_owned(),
        };

        if self.name.is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(invalid("name must not contain whitespace"));
        }
        if self.name.starts_with("--") {
            return Err(invalid("name must not start with '--'"));
        }

        for (i, entry) in self.fields.iter().enumerate() {
            let name = entry.field.name.as_str();
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(invalid(&format!("field name '{name}' is not a single token")));
            }
            if name.ends_with('$') {
                return Err(invalid(&format!("field name '{name}' must not end with '$'")));
            }
            if self.fields[..i].iter().any(|e| e.field.name == name) {
                return Err(invalid(&format!("field '{name}' is declared twice")));
            }
        }

        Ok(())
    }

    fn write_documentation(&self, out: &mut String) -> fmt::Result {
        match &self.description {
            Some(description) => writeln!(out, "--{} ({description})", self.name)?,
            None => writeln!(out, "--{}", self.name)?,
        }

        for field in self.fields() {
            write!(out, "   {}", field.name)?;
            if field.required {
                write!(out, " (Required)")?;
            }
            write!(out, ": {}", field.description)?;
            if let Some(default) = &field.default {
                write!(out, " (Default = {default})")?;
            }
            writeln!(out)?;
        }

        writeln!(out)
    }
}

impl fmt::Debug for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleType")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("fields", &self.fields().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Builder returned by [`RuleType::builder`].
pub struct RuleTypeBuilder<R> {
    name: String,
    description: Option<String>,
    fields: Vec<FieldEntry>,
    factory: fn() -> R,
}

impl<R: Rule + Clone> RuleTypeBuilder<R> {
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a field. Its kind is taken from the setter's value type `T`.
    #[must_use]
    pub fn field<T: FieldValue>(
        mut self,
        field: Field,
        set: impl Fn(&mut R, T) + Send + Sync + 'static,
    ) -> Self {
        let setter: Setter = Box::new(move |rule: &mut dyn Rule, value: Value| {
            let rule: &mut dyn Any = rule;
            let Some(rule) = rule.downcast_mut::<R>() else {
                return Assigned::WrongKind;
            };
            match T::from_value(value) {
                Some(value) => {
                    set(rule, value);
                    Assigned::Set
                }
                None => Assigned::OutOfRange,
            }
        });

        self.fields.push(FieldEntry {
            field: Field {
                kind: T::KIND,
                ..field
            },
            setter,
        });
        self
    }

    #[must_use]
    pub fn build(self) -> RuleType {
        let factory = self.factory;
        RuleType {
            name: self.name,
            description: self.description,
            fields: self.fields,
            factory: Box::new(move || Box::new(factory())),
            cloner: clone_as::<R>,
        }
    }
}

fn clone_as<R: Rule + Clone>(rule: &dyn Rule) -> Option<Box<dyn Rule>> {
    let rule: &dyn Any = rule;
    rule.downcast_ref::<R>()
        .map(|r| Box::new(r.clone()) as Box<dyn Rule>)
}

/// Maps rule type names to their [`RuleType`].
///
/// Populated once at startup; read-only while rule sets are evaluated.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    types: HashMap<String, Arc<RuleType>>,
    order: Vec<String>,
}

impl RuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in rule type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if a built-in type fails validation.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.discover_all()?;
        Ok(registry)
    }

    /// Register a rule type. A later registration under the same name
    /// replaces the earlier one but keeps its position in export order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidKind`] if the type's name or field
    /// declarations cannot be used by the rule parser.
    pub fn register(&mut self, rule_type: RuleType) -> Result<(), RegistryError> {
        rule_type.validate()?;

        let name = rule_type.name.clone();
        debug!(rule_type = %name, fields = rule_type.fields.len(), "registering rule type");
        if self.types.insert(name.clone(), Arc::new(rule_type)).is_none() {
            self.order.push(name);
        }
        Ok(())
    }

    /// Register every type from `types`, stopping at the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError`] encountered.
    pub fn register_all(
        &mut self,
        types: impl IntoIterator<Item = RuleType>,
    ) -> Result<(), RegistryError> {
        types.into_iter().try_for_each(|t| self.register(t))
    }

    /// Register the statically linked built-in rule types.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if a built-in type fails validation.
    pub fn discover_all(&mut self) -> Result<(), RegistryError> {
        self.register_all(crate::rules::builtin_rule_types())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<RuleType>> {
        self.types.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleType> {
        self.order
            .iter()
            .filter_map(|name| self.types.get(name))
            .map(Arc::as_ref)
    }

    /// Render the plain-text reference of every registered type.
    #[must_use]
    pub fn export_documentation(&self) -> String {
        let mut out = String::new();
        for rule_type in self.iter() {
            // Writing into a String cannot fail.
            let _ = rule_type.write_documentation(&mut out);
        }
        out
    }
}
