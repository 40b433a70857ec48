//! Interaction option normalizer
//!
//! Interactions arrive with a typed option tree. `flatten` coerces it into the same
//! `OptionValue` shape the tokenizer produces, and `descend` hoists the arguments out
//! from under sub-command / group markers so getters see them at the top.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Descend through a sub-command nested inside a group
//! - 1.0.0: One level for sub-commands, one more for groups

use super::options::{coerce_typed, OptionKind, OptionValue};
use crate::gateway::event::StructuredOption;

/// Options with sub-command and group markers peeled off
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descended {
    pub sub_command: Option<String>,
    pub group: Option<String>,
    pub hoisted: Vec<OptionValue>,
}

pub fn flatten(options: &[StructuredOption]) -> Vec<OptionValue> {
    options.iter().map(coerce_typed).collect()
}

/// Peel markers off the front of `options`.
///
/// A leading sub-command is entered first, then a leading group. When a group turns
/// out to contain a sub-command (the platform nests them that way) that sub-command
/// is entered as well.
pub fn descend(options: &[OptionValue]) -> Descended {
    let mut descended = Descended {
        hoisted: options.to_vec(),
        ..Descended::default()
    };

    if let Some(first) = leading(&descended.hoisted, OptionKind::SubCommand) {
        descended.sub_command = Some(first.name.clone());
        descended.hoisted = first.options.clone();
    }

    if let Some(first) = leading(&descended.hoisted, OptionKind::SubCommandGroup) {
        descended.group = Some(first.name.clone());
        descended.hoisted = first.options.clone();

        if descended.sub_command.is_none() {
            if let Some(inner) = leading(&descended.hoisted, OptionKind::SubCommand) {
                descended.sub_command = Some(inner.name.clone());
                descended.hoisted = inner.options.clone();
            }
        }
    }

    descended
}

fn leading(options: &[OptionValue], kind: OptionKind) -> Option<&OptionValue> {
    options.first().filter(|option| option.kind == kind)
}
