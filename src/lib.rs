//! A small rule engine for checking inputs against user-defined rule sets.
//!
//! Rules are written one per line in a flag-style language
//! (`match --value$ {file-name} --pattern \.rs$`), grouped into named
//! [`RuleSet`]s that cascade into children, and evaluated by a
//! [`RuleEngine`] against an arbitrary input. Rules record warnings and
//! problems into a [`RuleTest`] report.
//!
//! Rule kinds are plugins: anything implementing [`Rule`] can be registered
//! through a [`RuleType`] describing its fields.
//!
//! ```
//! use rulecheck::RuleEngine;
//!
//! let mut engine = RuleEngine::with_builtins().unwrap();
//! let report = engine
//!     .load_json(r#"{
//!         "variables": { "owner": "ops" },
//!         "rulesets": {
//!             ".": { "rules": ["problem --message 'owned by {owner}' --path config"] }
//!         }
//!     }"#)
//!     .unwrap();
//! assert!(report.is_clean());
//!
//! let result = engine.test_default(&());
//! assert_eq!(result.export(), "[config]: owned by ops\n");
//! ```

mod compile;
pub mod config;
mod engine;
mod error;
pub mod parse;
pub mod rules;
mod types;

pub use config::{ConfigDocument, DroppedRule, IgnoredEntry, LoadReport, RuleSetConfig};
pub use engine::{DEFAULT_ROOT, RuleEngine};
pub use error::RulecheckError;
pub use parse::ParseError;
pub use types::{
    CompileError, Field, FieldKind, FieldValue, Issue, IssueKind, IssueLine, IssueLineError,
    PATH_SEPARATOR, ParsedRule, RegistryError, Rule, RuleRegistry, RuleSet, RuleTest, RuleType,
    RuleTypeBuilder, Session, Value, Variables,
};
