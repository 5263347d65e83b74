//! Names of the built-in entity filters a rule option may refer to.

pub const ENTITY_TYPE: &str = "entity_type";
pub const TAMED: &str = "tamed";
pub const NAMED: &str = "named";

/// All built-in filter names.
pub const BUILTIN: [&str; 3] = [ENTITY_TYPE, TAMED, NAMED];

/// The built-in filter called `name`, if any.
#[must_use]
pub fn builtin(name: &str) -> Option<&'static str> {
    BUILTIN.into_iter().find(|builtin| *builtin == name)
}
