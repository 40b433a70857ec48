//! Prefixed message tokenizer
//!
//! Turns `!repl ping true` into a command name plus coerced options, probing the
//! registry to decide whether leading words name a sub-command or a sub-command group.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Report the registry path a classification matched
//! - 1.0.0: Prefix stripping, whitespace tokenizing, sub-path probing

use super::options::{coerce_free_text, OptionValue};
use super::registry::{CommandPath, CommandRegistry};

/// Result of [`classify`]
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub options: Vec<OptionValue>,
    /// Registry key that decided the shape, when a sub-path matched
    pub matched: Option<CommandPath>,
}

/// Split a message into `(command_name, tokens)`.
///
/// Returns `None` when the text does not start with `prefix` or nothing follows it.
/// The command name is lowercased; argument tokens are kept verbatim.
pub fn parse(prefix: &str, raw: &str) -> Option<(String, Vec<String>)> {
    let rest = raw.strip_prefix(prefix)?;
    let mut words = rest.split_whitespace();
    let name = words.next()?.to_lowercase();
    Some((name, words.map(str::to_string).collect()))
}

/// Coerce tokens into options for `command_name`.
///
/// A registered `command/tokens[0]` sub-command wins over a registered
/// `command/tokens[0]/tokens[1]` group. The group shape is emitted as observed
/// in the wild: it is named after `tokens[1]` and nests `tokens[1..]`, so the first
/// token is not represented in the options (the matched path still carries it).
pub fn classify(registry: &CommandRegistry, command_name: &str, tokens: &[String]) -> Classified {
    let coerce_all = |tokens: &[String]| -> Vec<OptionValue> {
        tokens
            .iter()
            .enumerate()
            .map(|(index, token)| coerce_free_text(token, index))
            .collect()
    };

    let Some(first) = tokens.first() else {
        return Classified {
            options: Vec::new(),
            matched: None,
        };
    };

    let sub_command = CommandPath::sub_command(command_name, first.as_str());
    if registry.contains(&sub_command) {
        return Classified {
            options: vec![OptionValue::sub_command(first, coerce_all(&tokens[1..]))],
            matched: Some(sub_command),
        };
    }

    if let Some(second) = tokens.get(1) {
        let group = CommandPath::sub_command_group(command_name, first.as_str(), second.as_str());
        if registry.contains(&group) {
            return Classified {
                options: vec![OptionValue::sub_command_group(second, coerce_all(&tokens[1..]))],
                matched: Some(group),
            };
        }
    }

    Classified {
        options: coerce_all(tokens),
        matched: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::handler::{handler_fn, CommandHandler};
    use crate::commands::options::{OptionKind, OptionSlot};
    use std::sync::Arc;

    fn noop() -> Arc<dyn CommandHandler> {
        handler_fn(|_ctx| async { anyhow::Ok(()) })
    }

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_parse_plain_command() {
        assert_eq!(parse("!", "!ping"), Some(("ping".to_string(), vec![])));
    }

    #[test]
    fn test_parse_splits_on_whitespace_runs() {
        let (name, args) = parse("!", "!say   hello \t world\n").unwrap();
        assert_eq!(name, "say");
        assert_eq!(args, tokens(&["hello", "world"]));
    }

    #[test]
    fn test_parse_allows_space_after_prefix_and_lowercases_name() {
        let (name, args) = parse("?", "?  PING Loud").unwrap();
        assert_eq!(name, "ping");
        assert_eq!(args, tokens(&["Loud"]));
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert_eq!(parse("!", "not a command"), None);
        assert_eq!(parse("!", " !ping"), None);
    }

    #[test]
    fn test_parse_rejects_bare_prefix() {
        assert_eq!(parse("!", "!"), None);
        assert_eq!(parse("!", "!   "), None);
    }

    #[test]
    fn test_parse_multi_character_prefix() {
        let (name, _) = parse("bot.", "bot.help").unwrap();
        assert_eq!(name, "help");
    }

    #[test]
    fn test_classify_flat_positional() {
        let registry = CommandRegistry::new();
        let classified = classify(&registry, "echo", &tokens(&["hi", "3", "off"]));

        assert_eq!(classified.matched, None);
        let names: Vec<_> = classified.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["0", "1", "2"]);
        assert_eq!(classified.options[0].slot, OptionSlot::String("hi".to_string()));
        assert_eq!(classified.options[1].slot, OptionSlot::Number(3.0));
        assert_eq!(classified.options[2].slot, OptionSlot::Boolean(false));
    }

    #[test]
    fn test_classify_no_tokens() {
        let registry = CommandRegistry::new();
        let classified = classify(&registry, "ping", &[]);
        assert!(classified.options.is_empty());
        assert_eq!(classified.matched, None);
    }

    #[test]
    fn test_classify_sub_command() {
        let mut registry = CommandRegistry::new();
        registry.register_sub_command("repl", "ping", vec![], noop());

        let classified = classify(&registry, "repl", &tokens(&["ping", "true"]));

        assert_eq!(classified.matched, Some(CommandPath::sub_command("repl", "ping")));
        assert_eq!(classified.options.len(), 1);
        let sub = &classified.options[0];
        assert_eq!(sub.kind, OptionKind::SubCommand);
        assert_eq!(sub.name, "ping");
        assert_eq!(sub.options.len(), 1);
        assert_eq!(sub.options[0].name, "0");
        assert_eq!(sub.options[0].slot, OptionSlot::Boolean(true));
    }

    #[test]
    fn test_classify_group_keeps_observed_shape() {
        let mut registry = CommandRegistry::new();
        registry.register_sub_command_group("mod", "role", "add", vec![], noop());

        let classified = classify(&registry, "mod", &tokens(&["role", "add", "admin"]));

        assert_eq!(
            classified.matched,
            Some(CommandPath::sub_command_group("mod", "role", "add"))
        );
        let group = &classified.options[0];
        assert_eq!(group.kind, OptionKind::SubCommandGroup);
        // named after the second token; the first token ("role") is dropped
        assert_eq!(group.name, "add");
        let nested: Vec<_> = group.options.iter().map(|o| o.to_string()).collect();
        assert_eq!(nested, vec!["add", "admin"]);
        assert_eq!(group.options[0].name, "0");
    }

    #[test]
    fn test_classify_sub_command_beats_group() {
        let mut registry = CommandRegistry::new();
        registry.register_sub_command("mod", "role", vec![], noop());
        registry.register_sub_command_group("mod", "role", "add", vec![], noop());

        let classified = classify(&registry, "mod", &tokens(&["role", "add"]));

        assert_eq!(classified.matched, Some(CommandPath::sub_command("mod", "role")));
        assert_eq!(classified.options[0].kind, OptionKind::SubCommand);
        assert_eq!(classified.options[0].name, "role");
    }

    #[test]
    fn test_classify_probes_exact_command_name() {
        let mut registry = CommandRegistry::new();
        registry.register_sub_command("repl", "ping", vec![], noop());

        let classified = classify(&registry, "other", &tokens(&["ping"]));
        assert_eq!(classified.matched, None);
        assert_eq!(classified.options[0].kind, OptionKind::String);
    }
}
