use crate::model::ParserOptions;
use crate::parser::interface::wrap;
use crate::parser::tree::{CommandId, FlagId, FlagNode, GroupId, Tree};

const PADDING: usize = 2;
const DISTANCE: usize = 2;
const MINIMUM_DESCRIPTION_WIDTH: usize = 20;

/// Renders the help message of one command.
pub(crate) struct Printer<'t, 'a> {
    tree: &'t Tree<'a>,
    options: &'t ParserOptions,
    command: CommandId,
}

impl<'t, 'a> Printer<'t, 'a> {
    pub(crate) fn new(tree: &'t Tree<'a>, options: &'t ParserOptions, command: CommandId) -> Self {
        Self {
            tree,
            options,
            command,
        }
    }

    pub(crate) fn render(&self) -> String {
        let mut lines = vec!["Usage:".to_string(), format!("  {}", usage(self.tree, self.command))];
        let node = self.tree.command(self.command);

        if let Some(description) = &node.long_description {
            lines.push(String::default());
            lines.extend(wrap(description, self.options.help_width));
        }

        let groups: Vec<(GroupId, Vec<FlagId>)> = visible_groups(self.tree, self.command)
            .into_iter()
            .map(|group| (group, visible_flags(self.tree, group)))
            .filter(|(_, flags)| !flags.is_empty())
            .collect();
        let columns: Vec<Vec<String>> = groups
            .iter()
            .map(|(_, flags)| {
                let has_short = groups
                    .iter()
                    .flat_map(|(_, flags)| flags.iter())
                    .any(|id| self.tree.flag(*id).flag.short.is_some());
                flags
                    .iter()
                    .map(|id| option_column(self.tree.flag(*id), has_short))
                    .collect()
            })
            .collect();
        let width = columns
            .iter()
            .flatten()
            .map(|column| column.chars().count())
            .max()
            .unwrap_or(0)
            + PADDING
            + DISTANCE;

        for ((group, flags), columns) in groups.iter().zip(columns.iter()) {
            let section = self.tree.group(*group);
            lines.push(String::default());
            lines.push(format!("{}:", section.name));

            if let Some(description) = &section.description {
                let description_width = self.options.help_width.saturating_sub(PADDING);
                lines.extend(
                    wrap(description, description_width)
                        .into_iter()
                        .map(|line| format!("{:PADDING$}{line}", "")),
                );
            }

            for (id, column) in flags.iter().zip(columns.iter()) {
                let text = flag_description(self.tree.flag(*id));
                self.push_entry(&mut lines, column, &text, width);
            }
        }

        let positionals: Vec<(String, String)> = node
            .positionals
            .iter()
            .map(|node| {
                (
                    node.positional.name.clone(),
                    node.positional.description.clone().unwrap_or_default(),
                )
            })
            .collect();

        if positionals.iter().any(|(_, description)| !description.is_empty()) {
            let width = positionals
                .iter()
                .map(|(name, _)| name.chars().count())
                .max()
                .unwrap_or(0)
                + PADDING
                + DISTANCE;
            lines.push(String::default());
            lines.push("Arguments:".to_string());

            for (name, description) in &positionals {
                self.push_entry(&mut lines, name, description, width);
            }
        }

        let mut commands: Vec<CommandId> = node.commands.clone();
        commands.sort_by(|a, b| self.tree.command(*a).name.cmp(&self.tree.command(*b).name));

        if !commands.is_empty() {
            let width = commands
                .iter()
                .map(|id| self.tree.command(*id).name.chars().count())
                .max()
                .unwrap_or(0)
                + PADDING
                + DISTANCE;
            lines.push(String::default());
            lines.push("Available commands:".to_string());

            for id in commands {
                let command = self.tree.command(id);
                let mut text = command.description.clone().unwrap_or_default();

                if !command.aliases.is_empty() {
                    if !text.is_empty() {
                        text.push(' ');
                    }

                    text.push_str(&format!("(aliases: {})", command.aliases.join(", ")));
                }

                self.push_entry(&mut lines, &command.name, &text, width);
            }
        }

        lines.join("\n")
    }

    fn push_entry(&self, lines: &mut Vec<String>, column: &str, text: &str, width: usize) {
        let entry = format!("{:PADDING$}{column}", "");

        if text.is_empty() {
            lines.push(entry);
            return;
        }

        let available = std::cmp::max(
            self.options.help_width.saturating_sub(width),
            MINIMUM_DESCRIPTION_WIDTH,
        );
        let mut wrapped = wrap(text, available).into_iter();
        let first = wrapped.next().unwrap_or_default();
        lines.push(format!("{entry:width$}{first}"));

        for line in wrapped {
            lines.push(format!("{:width$}{line}", ""));
        }
    }
}

/// `program [OPTIONS] add [add-OPTIONS] NAME [FILES...] <command>`
pub(crate) fn usage(tree: &Tree, command: CommandId) -> String {
    let mut parts = Vec::default();

    for id in tree.chain(command) {
        let node = tree.command(id);
        parts.push(node.name.clone());

        if has_visible_flags(tree, id) {
            if id == CommandId::ROOT {
                parts.push("[OPTIONS]".to_string());
            } else {
                parts.push(format!("[{}-OPTIONS]", node.name));
            }
        }
    }

    let node = tree.command(command);

    for positional in &node.positionals {
        let mut name = positional.positional.name.clone();

        if positional.is_repeatable() {
            name.push_str("...");
        }

        if positional.positional.required {
            parts.push(name);
        } else {
            parts.push(format!("[{name}]"));
        }
    }

    if !node.commands.is_empty() {
        parts.push("<command>".to_string());
    }

    parts.join(" ")
}

/// `-v, --verbose`, `    --name=NAME` or `-n=COUNT`.
fn option_column(node: &FlagNode, has_short: bool) -> String {
    let flag = &node.flag;
    let mut column = match flag.short {
        Some(short) => format!("-{short}"),
        None if has_short => "  ".to_string(),
        None => String::default(),
    };

    if let Some(long) = &flag.long {
        if flag.short.is_some() {
            column.push_str(", ");
        } else if has_short {
            column.push_str("  ");
        }

        column.push_str(&format!("--{long}"));
    }

    if node.can_argument() {
        let value_name = value_name(node);

        if node.is_optional() {
            column.push_str(&format!("[={value_name}]"));
        } else {
            column.push_str(&format!("={value_name}"));
        }
    }

    column
}

/// The declared value name, or else the upper-cased type name.
pub(crate) fn value_name(node: &FlagNode) -> String {
    node.flag
        .value_name
        .clone()
        .unwrap_or_else(|| node.type_name().to_uppercase())
}

/// The description of a flag, with its default and environment variable.
pub(crate) fn flag_description(node: &FlagNode) -> String {
    let flag = &node.flag;
    let mut parts = Vec::default();

    if let Some(description) = &flag.description {
        parts.push(description.clone());
    }

    let default = match flag.default_mask.as_deref() {
        Some("-") => None,
        Some(mask) => Some(mask.to_string()),
        None if !flag.defaults.is_empty() => Some(flag.defaults.join(", ")),
        None => None,
    };

    if let Some(default) = default {
        parts.push(format!("(default: {default})"));
    }

    if let Some(env) = &flag.env {
        parts.push(format!("[${env}]"));
    }

    parts.join(" ")
}

/// The non-hidden groups in scope of `command`, with the help group last.
pub(crate) fn visible_groups(tree: &Tree, command: CommandId) -> Vec<GroupId> {
    let help = tree.help_group();
    let mut out = Vec::default();

    for id in tree.chain(command) {
        let mut stack = vec![tree.command(id).group];

        while let Some(group) = stack.pop() {
            let node = tree.group(group);

            if node.hidden || Some(group) == help {
                continue;
            }

            out.push(group);
            stack.extend(node.groups.iter().rev());
        }
    }

    if let Some(help) = help {
        out.push(help);
    }

    out
}

pub(crate) fn visible_flags(tree: &Tree, group: GroupId) -> Vec<FlagId> {
    tree.group(group)
        .flags
        .iter()
        .copied()
        .filter(|id| !tree.flag(*id).flag.hidden)
        .collect()
}

fn has_visible_flags(tree: &Tree, command: CommandId) -> bool {
    let help = tree.help_group();
    tree.command_groups(command)
        .into_iter()
        .filter(|group| Some(*group) != help && !tree.group(*group).hidden)
        .any(|group| !visible_flags(tree, group).is_empty())
        || (command == CommandId::ROOT && help.is_some())
}
