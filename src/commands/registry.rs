//! Command registry
//!
//! A flat table keyed by [`CommandPath`]. Hierarchy is a property of the key, not of
//! the entries: a sub-command may be registered without its parent command, and the
//! tokenizer decides whether trailing words form a sub-path by probing exact keys.
//!
//! The registry is filled during start-up and then frozen behind an `Arc` that the
//! dispatcher shares; it has no interior mutability, so registering after traffic
//! starts requires building a new dispatcher.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Composite path keys, aliases, option schemas and slash-command export
//! - 1.0.0: Initial implementation for handler dispatch

use log::debug;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::handler::CommandHandler;
use super::options::{OptionDeclaration, OptionKind};
use crate::core::error::RouterError;

/// Registry key. Segments are stored separately so a name containing `/` can never
/// collide with a deeper path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandPath {
    Command(String),
    SubCommand {
        command: String,
        sub_command: String,
    },
    SubCommandGroup {
        command: String,
        group: String,
        sub_command: String,
    },
}

/// Which level of the namespace an entry lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Command,
    SubCommand,
    SubCommandGroup,
}

impl CommandPath {
    pub fn command(name: impl Into<String>) -> Self {
        CommandPath::Command(name.into())
    }

    pub fn sub_command(command: impl Into<String>, sub_command: impl Into<String>) -> Self {
        CommandPath::SubCommand {
            command: command.into(),
            sub_command: sub_command.into(),
        }
    }

    pub fn sub_command_group(
        command: impl Into<String>,
        group: impl Into<String>,
        sub_command: impl Into<String>,
    ) -> Self {
        CommandPath::SubCommandGroup {
            command: command.into(),
            group: group.into(),
            sub_command: sub_command.into(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            CommandPath::Command(_) => EntryKind::Command,
            CommandPath::SubCommand { .. } => EntryKind::SubCommand,
            CommandPath::SubCommandGroup { .. } => EntryKind::SubCommandGroup,
        }
    }

    /// Top-level command name of this path
    pub fn root(&self) -> &str {
        match self {
            CommandPath::Command(command)
            | CommandPath::SubCommand { command, .. }
            | CommandPath::SubCommandGroup { command, .. } => command,
        }
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandPath::Command(command) => write!(f, "{command}"),
            CommandPath::SubCommand {
                command,
                sub_command,
            } => write!(f, "{command}/{sub_command}"),
            CommandPath::SubCommandGroup {
                command,
                group,
                sub_command,
            } => write!(f, "{command}/{group}/{sub_command}"),
        }
    }
}

impl FromStr for CommandPath {
    type Err = RouterError;

    /// Parse the `command/sub/...` form produced by `Display`
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = raw.split('/').collect();
        if segments.iter().any(|segment| segment.trim().is_empty()) {
            return Err(RouterError::InvalidPath(raw.to_string()));
        }

        match segments.as_slice() {
            [command] => Ok(CommandPath::command(*command)),
            [command, sub_command] => Ok(CommandPath::sub_command(*command, *sub_command)),
            [command, group, sub_command] => {
                Ok(CommandPath::sub_command_group(*command, *group, *sub_command))
            }
            _ => Err(RouterError::InvalidPath(raw.to_string())),
        }
    }
}

/// A registered handler and its option schema
///
/// The same shape serves all three levels; `aliases` are only read for commands.
#[derive(Clone)]
pub struct CommandEntry {
    pub path: CommandPath,
    pub description: String,
    pub aliases: Vec<String>,
    pub options: Vec<OptionDeclaration>,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandEntry {
    pub fn new(path: CommandPath, handler: Arc<dyn CommandHandler>) -> Self {
        CommandEntry {
            path,
            description: String::new(),
            aliases: Vec::new(),
            options: Vec::new(),
            handler,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn options(mut self, options: Vec<OptionDeclaration>) -> Self {
        self.options = options;
        self
    }
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("path", &self.path)
            .field("aliases", &self.aliases)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Registry mapping command paths and aliases to entries
///
/// # Example
///
/// ```ignore
/// let mut registry = CommandRegistry::new();
/// registry.register_command("avatar", ["pfp", "avy"], vec![], Arc::new(AvatarHandler));
/// registry.register_sub_command("emotes", "add", vec![], Arc::new(AddEmote));
///
/// let dispatcher = Dispatcher::new(Arc::new(registry), Prefix::from("!"));
/// ```
#[derive(Clone, Default)]
pub struct CommandRegistry {
    entries: HashMap<CommandPath, CommandEntry>,
    aliases: HashMap<String, String>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry under its path, replacing any previous entry at that path.
    ///
    /// Aliases declared on a command entry are registered as well.
    pub fn register(&mut self, entry: CommandEntry) {
        if entry.path.kind() == EntryKind::Command {
            for alias in &entry.aliases {
                self.register_alias(alias, entry.path.root());
            }
        }

        if let Some(previous) = self.entries.insert(entry.path.clone(), entry) {
            debug!("Replaced registry entry for '{}'", previous.path);
        }
    }

    pub fn register_command<I, S>(
        &mut self,
        name: &str,
        aliases: I,
        options: Vec<OptionDeclaration>,
        handler: Arc<dyn CommandHandler>,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(
            CommandEntry::new(CommandPath::command(name), handler)
                .aliases(aliases)
                .options(options),
        );
    }

    pub fn register_sub_command(
        &mut self,
        command: &str,
        sub_command: &str,
        options: Vec<OptionDeclaration>,
        handler: Arc<dyn CommandHandler>,
    ) {
        self.register(
            CommandEntry::new(CommandPath::sub_command(command, sub_command), handler)
                .options(options),
        );
    }

    pub fn register_sub_command_group(
        &mut self,
        command: &str,
        group: &str,
        sub_command: &str,
        options: Vec<OptionDeclaration>,
        handler: Arc<dyn CommandHandler>,
    ) {
        self.register(
            CommandEntry::new(
                CommandPath::sub_command_group(command, group, sub_command),
                handler,
            )
            .options(options),
        );
    }

    /// Map `alias` to `canonical`. The target does not have to exist yet; the last
    /// registration of an alias wins.
    pub fn register_alias(&mut self, alias: &str, canonical: &str) {
        if let Some(previous) = self
            .aliases
            .insert(alias.to_string(), canonical.to_string())
        {
            if previous != canonical {
                debug!("Alias '{alias}' moved from '{previous}' to '{canonical}'");
            }
        }
    }

    /// Exact lookup; never consults aliases
    pub fn lookup(&self, path: &CommandPath) -> Option<&CommandEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &CommandPath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn resolve_alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Top-level command by name, falling back through the alias table once
    pub fn find_command(&self, name: &str) -> Option<&CommandEntry> {
        self.lookup(&CommandPath::command(name)).or_else(|| {
            self.resolve_alias(name)
                .and_then(|canonical| self.lookup(&CommandPath::command(canonical)))
        })
    }

    /// Number of registered paths, all levels included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &CommandPath> {
        self.entries.keys()
    }

    /// Render top-level commands as application-command JSON for bulk registration.
    ///
    /// Sub-commands and groups are nested under their root; paths whose root command
    /// is not registered are left out. Output is sorted by command name.
    pub fn application_commands(&self) -> Vec<Value> {
        let mut roots: BTreeMap<&str, &CommandEntry> = BTreeMap::new();
        for entry in self.entries.values() {
            if let CommandPath::Command(name) = &entry.path {
                roots.insert(name, entry);
            }
        }

        roots
            .into_iter()
            .map(|(name, entry)| {
                let mut options: Vec<Value> = entry.options.iter().map(option_json).collect();
                options.extend(self.sub_command_options(name));
                json!({
                    "name": name,
                    "description": description_or_name(&entry.description, name),
                    "options": options,
                })
            })
            .collect()
    }

    fn sub_command_options(&self, root: &str) -> Vec<Value> {
        let mut subs: BTreeMap<&str, &CommandEntry> = BTreeMap::new();
        let mut groups: BTreeMap<&str, BTreeMap<&str, &CommandEntry>> = BTreeMap::new();

        for entry in self.entries.values() {
            match &entry.path {
                CommandPath::SubCommand {
                    command,
                    sub_command,
                } if command == root => {
                    subs.insert(sub_command, entry);
                }
                CommandPath::SubCommandGroup {
                    command,
                    group,
                    sub_command,
                } if command == root => {
                    groups.entry(group).or_default().insert(sub_command, entry);
                }
                _ => {}
            }
        }

        let mut out: Vec<Value> = subs
            .into_iter()
            .map(|(name, entry)| sub_command_json(name, entry))
            .collect();

        out.extend(groups.into_iter().map(|(group, members)| {
            json!({
                "type": OptionKind::SubCommandGroup.code(),
                "name": group,
                "description": group,
                "options": members
                    .into_iter()
                    .map(|(name, entry)| sub_command_json(name, entry))
                    .collect::<Vec<_>>(),
            })
        }));

        out
    }
}

fn description_or_name<'a>(description: &'a str, name: &'a str) -> &'a str {
    if description.is_empty() {
        name
    } else {
        description
    }
}

fn option_json(option: &OptionDeclaration) -> Value {
    json!({
        "type": option.kind.code(),
        "name": option.name,
        "description": description_or_name(&option.description, &option.name),
        "required": option.required,
    })
}

fn sub_command_json(name: &str, entry: &CommandEntry) -> Value {
    json!({
        "type": OptionKind::SubCommand.code(),
        "name": name,
        "description": description_or_name(&entry.description, name),
        "options": entry.options.iter().map(option_json).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::handler::handler_fn;

    fn noop() -> Arc<dyn CommandHandler> {
        handler_fn(|_ctx| async { anyhow::Ok(()) })
    }

    #[test]
    fn test_path_text_round_trip() {
        for text in ["ping", "repl/ping", "mod/role/add"] {
            let path: CommandPath = text.parse().unwrap();
            assert_eq!(path.to_string(), text);
        }
        assert_eq!(
            "repl/ping".parse::<CommandPath>().unwrap(),
            CommandPath::sub_command("repl", "ping")
        );
    }

    #[test]
    fn test_path_text_rejects_malformed() {
        for text in ["", "repl/", "/ping", "a/b/c/d", "mod//add"] {
            assert_eq!(
                text.parse::<CommandPath>(),
                Err(RouterError::InvalidPath(text.to_string()))
            );
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_lookup_by_kind() {
        let mut registry = CommandRegistry::new();
        registry.register_command("repl", Vec::<String>::new(), vec![], noop());
        registry.register_sub_command("repl", "ping", vec![], noop());
        registry.register_sub_command_group("repl", "admin", "kick", vec![], noop());

        assert_eq!(registry.len(), 3);
        assert!(registry.contains(&CommandPath::command("repl")));
        assert!(registry.contains(&CommandPath::sub_command("repl", "ping")));
        assert!(registry.contains(&CommandPath::sub_command_group("repl", "admin", "kick")));
        assert!(!registry.contains(&CommandPath::command("ping")));
        assert!(!registry.contains(&CommandPath::sub_command("repl", "admin")));
    }

    #[test]
    fn test_registry_last_registration_wins() {
        let mut registry = CommandRegistry::new();
        let ping = CommandPath::command("ping");
        registry.register(CommandEntry::new(ping.clone(), noop()).description("first"));
        registry.register(CommandEntry::new(ping, noop()).description("second"));

        assert_eq!(registry.len(), 1);
        let entry = registry.lookup(&CommandPath::command("ping")).unwrap();
        assert_eq!(entry.description, "second");
    }

    #[test]
    fn test_registry_names_are_case_sensitive() {
        let mut registry = CommandRegistry::new();
        registry.register_command("Ping", Vec::<String>::new(), vec![], noop());
        assert!(registry.find_command("Ping").is_some());
        assert!(registry.find_command("ping").is_none());
    }

    #[test]
    fn test_aliases_resolve_to_canonical_entry() {
        let mut registry = CommandRegistry::new();
        registry.register_command("avatar", ["pfp", "avy"], vec![], noop());

        assert_eq!(registry.resolve_alias("pfp"), Some("avatar"));
        let entry = registry.find_command("avy").unwrap();
        assert_eq!(entry.path, CommandPath::command("avatar"));
        assert!(registry.find_command("pic").is_none());
    }

    #[test]
    fn test_alias_collision_last_writer_wins() {
        let mut registry = CommandRegistry::new();
        registry.register_command("avatar", ["pic"], vec![], noop());
        registry.register_command("picture", ["pic"], vec![], noop());

        assert_eq!(registry.resolve_alias("pic"), Some("picture"));
    }

    #[test]
    fn test_dangling_alias_is_legal_but_resolves_to_nothing() {
        let mut registry = CommandRegistry::new();
        registry.register_alias("ghost", "missing");

        assert_eq!(registry.resolve_alias("ghost"), Some("missing"));
        assert!(registry.find_command("ghost").is_none());
    }

    #[test]
    fn test_slash_in_names_does_not_collide_with_paths() {
        let mut registry = CommandRegistry::new();
        registry.register_command("a/b", Vec::<String>::new(), vec![], noop());

        assert!(!registry.contains(&CommandPath::sub_command("a", "b")));
        assert_eq!(CommandPath::sub_command("a", "b").to_string(), "a/b");
    }

    #[test]
    fn test_sub_command_without_parent_is_allowed() {
        let mut registry = CommandRegistry::new();
        registry.register_sub_command("orphan", "child", vec![], noop());

        assert!(registry.contains(&CommandPath::sub_command("orphan", "child")));
        assert!(registry.find_command("orphan").is_none());
        assert!(registry.application_commands().is_empty());
    }

    #[test]
    fn test_application_commands_nest_sub_paths() {
        let mut registry = CommandRegistry::new();
        registry.register(
            CommandEntry::new(CommandPath::command("emotes"), noop()).description("Manage emotes"),
        );
        registry.register_sub_command(
            "emotes",
            "add",
            vec![OptionDeclaration::new("name", OptionKind::String).required(true)],
            noop(),
        );
        registry.register_sub_command_group("emotes", "bulk", "clear", vec![], noop());

        let commands = registry.application_commands();
        assert_eq!(commands.len(), 1);

        let emotes = &commands[0];
        assert_eq!(emotes["description"], json!("Manage emotes"));
        let options = emotes["options"].as_array().unwrap();
        assert_eq!(options[0]["type"], json!(1));
        assert_eq!(options[0]["name"], json!("add"));
        assert_eq!(options[0]["options"][0]["required"], json!(true));
        assert_eq!(options[1]["type"], json!(2));
        assert_eq!(options[1]["options"][0]["name"], json!("clear"));
    }
}
