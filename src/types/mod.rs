mod error;
mod issue;
mod registry;
mod rule;
mod ruleset;
mod session;
mod value;
mod variables;

pub use error::{CompileError, IssueLineError, RegistryError};
pub use issue::{Issue, IssueKind, IssueLine};
pub use registry::{Field, RuleRegistry, RuleType, RuleTypeBuilder};
pub use rule::{ParsedRule, Rule};
pub use ruleset::RuleSet;
pub use session::{RuleTest, Session};
pub use value::{FieldKind, FieldValue, PATH_SEPARATOR, Value};
pub use variables::Variables;
