//! Typed option access for handlers
//!
//! Getters take a declared name or a positional index and a `required` flag. A
//! missing required value is a [`RouterError::MissingOption`]; a missing optional
//! value is `Ok(None)`, never a guessed default.
//!
//! Message invocations only carry positional names (`"0"`, `"1"`, ...). When the
//! matched entry declares an option schema, a declared name falls back to its
//! position in that schema, and an index falls back to the declared name at that
//! position, so one handler serves both invocation kinds.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Schema-aware name/index fallback
//! - 1.0.0: Typed getters over hoisted options

use crate::core::error::RouterError;

use super::normalizer::Descended;
use super::options::{OptionDeclaration, OptionKind, OptionSlot, OptionValue};

/// Option lookup key: declared name or positional index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionKey {
    Name(String),
    Index(usize),
}

impl OptionKey {
    fn label(&self) -> String {
        match self {
            OptionKey::Name(name) => name.clone(),
            OptionKey::Index(index) => index.to_string(),
        }
    }
}

impl From<&str> for OptionKey {
    fn from(name: &str) -> Self {
        OptionKey::Name(name.to_string())
    }
}

impl From<String> for OptionKey {
    fn from(name: String) -> Self {
        OptionKey::Name(name)
    }
}

impl From<usize> for OptionKey {
    fn from(index: usize) -> Self {
        OptionKey::Index(index)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionResolver {
    options: Vec<OptionValue>,
    descended: Descended,
    schema: Vec<OptionDeclaration>,
}

impl OptionResolver {
    pub fn new(
        options: Vec<OptionValue>,
        descended: Descended,
        schema: Vec<OptionDeclaration>,
    ) -> Self {
        OptionResolver {
            options,
            descended,
            schema,
        }
    }

    /// Options as produced by the tokenizer or normalizer, markers included
    pub fn all(&self) -> &[OptionValue] {
        &self.options
    }

    /// Arguments with sub-command and group markers peeled off
    pub fn hoisted(&self) -> &[OptionValue] {
        &self.descended.hoisted
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Untyped lookup
    pub fn get(
        &self,
        key: impl Into<OptionKey>,
        required: bool,
    ) -> Result<Option<&OptionValue>, RouterError> {
        let key = key.into();
        match self.find(&key) {
            Some(option) => Ok(Some(option)),
            None if required => Err(RouterError::missing(key.label())),
            None => Ok(None),
        }
    }

    pub fn get_string(
        &self,
        key: impl Into<OptionKey>,
        required: bool,
    ) -> Result<Option<String>, RouterError> {
        self.typed(key.into(), required, |option| match &option.slot {
            OptionSlot::String(s) => Some(s.clone()),
            _ => None,
        })
    }

    /// Numbers; integers widen losslessly for typical values
    pub fn get_number(
        &self,
        key: impl Into<OptionKey>,
        required: bool,
    ) -> Result<Option<f64>, RouterError> {
        self.typed(key.into(), required, |option| match option.slot {
            OptionSlot::Number(n) => Some(n),
            OptionSlot::Integer(i) => Some(i as f64),
            _ => None,
        })
    }

    /// Integers; free-text numbers with no fractional part count too
    pub fn get_integer(
        &self,
        key: impl Into<OptionKey>,
        required: bool,
    ) -> Result<Option<i64>, RouterError> {
        self.typed(key.into(), required, |option| match option.slot {
            OptionSlot::Integer(i) => Some(i),
            OptionSlot::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                Some(n as i64)
            }
            _ => None,
        })
    }

    pub fn get_boolean(
        &self,
        key: impl Into<OptionKey>,
        required: bool,
    ) -> Result<Option<bool>, RouterError> {
        self.typed(key.into(), required, |option| match option.slot {
            OptionSlot::Boolean(b) => Some(b),
            _ => None,
        })
    }

    /// User id; a free-text mention resolves here too
    pub fn get_user(
        &self,
        key: impl Into<OptionKey>,
        required: bool,
    ) -> Result<Option<u64>, RouterError> {
        self.typed(key.into(), required, |option| match &option.slot {
            OptionSlot::User(id) => Some(*id),
            OptionSlot::Mentionable(id) => id.parse().ok(),
            _ => None,
        })
    }

    pub fn get_role(
        &self,
        key: impl Into<OptionKey>,
        required: bool,
    ) -> Result<Option<u64>, RouterError> {
        self.typed(key.into(), required, |option| match &option.slot {
            OptionSlot::Role(id) => Some(*id),
            OptionSlot::Mentionable(id) => id.parse().ok(),
            _ => None,
        })
    }

    pub fn get_channel(
        &self,
        key: impl Into<OptionKey>,
        required: bool,
    ) -> Result<Option<u64>, RouterError> {
        self.typed(key.into(), required, |option| match &option.slot {
            OptionSlot::Channel(id) => Some(*id),
            OptionSlot::Mentionable(id) => id.parse().ok(),
            _ => None,
        })
    }

    /// Mentionable id as text, whatever kind of entity it points at
    pub fn get_mentionable(
        &self,
        key: impl Into<OptionKey>,
        required: bool,
    ) -> Result<Option<String>, RouterError> {
        self.typed(key.into(), required, |option| match &option.slot {
            OptionSlot::Mentionable(id) => Some(id.clone()),
            OptionSlot::User(id) | OptionSlot::Role(id) | OptionSlot::Channel(id) => {
                Some(id.to_string())
            }
            OptionSlot::Otherwise(raw) if option.kind == OptionKind::Mentionable => {
                raw.as_str().map(str::to_string)
            }
            _ => None,
        })
    }

    pub fn get_attachment(
        &self,
        key: impl Into<OptionKey>,
        required: bool,
    ) -> Result<Option<String>, RouterError> {
        self.typed(key.into(), required, |option| match &option.slot {
            OptionSlot::Attachment(id) => Some(id.clone()),
            _ => None,
        })
    }

    pub fn get_subcommand(&self, required: bool) -> Result<Option<&str>, RouterError> {
        match self.descended.sub_command.as_deref() {
            None if required => Err(RouterError::missing("subcommand")),
            found => Ok(found),
        }
    }

    pub fn get_subcommand_group(&self, required: bool) -> Result<Option<&str>, RouterError> {
        match self.descended.group.as_deref() {
            None if required => Err(RouterError::missing("subcommand group")),
            found => Ok(found),
        }
    }

    /// The option the user is currently typing into.
    ///
    /// Only autocomplete interactions carry a focused option. The middleware does not
    /// dispatch those, so this is for integrations that build a `Context` from an
    /// autocomplete event themselves (see `InboundInteraction::from` for serenity's
    /// `AutocompleteInteraction`).
    pub fn get_focused(&self) -> Option<&OptionValue> {
        self.hoisted().iter().find(|option| option.focused)
    }

    fn typed<T>(
        &self,
        key: OptionKey,
        required: bool,
        extract: impl Fn(&OptionValue) -> Option<T>,
    ) -> Result<Option<T>, RouterError> {
        match self.find(&key).and_then(extract) {
            Some(value) => Ok(Some(value)),
            None if required => Err(RouterError::missing(key.label())),
            None => Ok(None),
        }
    }

    fn find(&self, key: &OptionKey) -> Option<&OptionValue> {
        match key {
            OptionKey::Name(name) => self.by_name(name).or_else(|| {
                self.schema
                    .iter()
                    .position(|declared| &declared.name == name)
                    .and_then(|index| self.by_name(&index.to_string()))
            }),
            OptionKey::Index(index) => self.by_name(&index.to_string()).or_else(|| {
                self.schema
                    .get(*index)
                    .and_then(|declared| self.by_name(&declared.name))
            }),
        }
    }

    fn by_name(&self, name: &str) -> Option<&OptionValue> {
        self.hoisted().iter().find(|option| option.name == name)
    }
}
