use std::collections::HashMap;

use crate::error::{Error, ErrorKind};
use crate::parser::{CommandId, FlagId, Tree};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Name lookup for the flags and subcommands visible from one command.
///
/// Flags come from the command and all of its ancestors; subcommands only from the command itself.
#[derive(Debug, Default)]
pub(crate) struct Lookup {
    long: HashMap<String, FlagId>,
    short: HashMap<char, FlagId>,
    commands: HashMap<String, CommandId>,
}

impl Lookup {
    pub(crate) fn for_scope(tree: &Tree, command: CommandId) -> Result<Self, Error> {
        let mut lookup = Lookup::default();

        for id in tree.scope_flags(command) {
            let node = tree.flag(id);

            if let Some(short) = node.flag.short {
                if let Some(existing) = lookup.short.insert(short, id) {
                    return Err(duplicate(tree, "short name", &format!("-{short}"), existing, id));
                }
            }

            if let Some(long) = &node.flag.long {
                if let Some(existing) = lookup.long.insert(long.to_lowercase(), id) {
                    return Err(duplicate(tree, "long name", &format!("--{long}"), existing, id));
                }
            }
        }

        for child in &tree.command(command).commands {
            let node = tree.command(*child);

            for name in std::iter::once(&node.name).chain(node.aliases.iter()) {
                if lookup.commands.insert(name.clone(), *child).is_some() {
                    return Err(Error::new(
                        ErrorKind::Tag,
                        format!(
                            "command `{name}' is declared more than once under `{parent}'",
                            parent = tree.command(command).name
                        ),
                    ));
                }
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Lookup for command {command:?}: {} long, {} short, {} commands.",
                lookup.long.len(),
                lookup.short.len(),
                lookup.commands.len()
            );
        }

        Ok(lookup)
    }

    pub(crate) fn long(&self, name: &str) -> Option<FlagId> {
        self.long.get(&name.to_lowercase()).copied()
    }

    pub(crate) fn short(&self, name: char) -> Option<FlagId> {
        self.short.get(&name).copied()
    }

    pub(crate) fn command(&self, name: &str) -> Option<CommandId> {
        self.commands.get(name).copied()
    }

    pub(crate) fn long_flags(&self) -> impl Iterator<Item = FlagId> + '_ {
        self.long.values().copied()
    }

    pub(crate) fn short_flags(&self) -> impl Iterator<Item = (char, FlagId)> + '_ {
        self.short.iter().map(|(c, id)| (*c, *id))
    }
}

fn duplicate(tree: &Tree, what: &str, name: &str, existing: FlagId, id: FlagId) -> Error {
    Error::new(
        ErrorKind::Tag,
        format!(
            "{what} `{name}' is used by both `{a}' and `{b}'",
            a = tree.flag(existing),
            b = tree.flag(id)
        ),
    )
}
