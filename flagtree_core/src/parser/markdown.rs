use std::io::Write;

use crate::parser::printer::{usage, value_name, visible_flags, visible_groups};
use crate::parser::tree::{CommandId, FlagNode, GroupId, Tree};

/// Write a markdown page for the whole descriptor tree, laid out like the man page.
pub(crate) fn write_markdown(tree: &Tree, writer: &mut dyn Write, date: &str) -> std::io::Result<()> {
    let root = tree.command(CommandId::ROOT);

    writeln!(writer, "# {} 1 \"{date}\"", escape(&root.name))?;
    writeln!(writer, "## NAME")?;
    writeln!(writer, "### {}", escape(&root.name))?;
    writeln!(
        writer,
        "> {}",
        escape(root.description.as_deref().unwrap_or_default())
    )?;
    writeln!(writer, "## SYNOPSIS")?;
    writeln!(writer, "**`{}`**", usage(tree, CommandId::ROOT))?;
    writeln!(writer, "## DESCRIPTION")?;
    writeln!(
        writer,
        "{}",
        emphasize_quoted(root.long_description.as_deref().unwrap_or_default())
    )?;
    writeln!(writer, "## OPTIONS")?;
    write_options(tree, writer, CommandId::ROOT, &visible_groups(tree, CommandId::ROOT), "###")?;

    if !root.commands.is_empty() {
        writeln!(writer, "## COMMANDS")?;
        write_commands(tree, writer, CommandId::ROOT, "")?;
    }

    Ok(())
}

fn write_commands(
    tree: &Tree,
    writer: &mut dyn Write,
    parent: CommandId,
    path: &str,
) -> std::io::Result<()> {
    let mut children = tree.command(parent).commands.clone();
    children.sort_by(|a, b| tree.command(*a).name.cmp(&tree.command(*b).name));

    for child in children {
        let node = tree.command(child);
        let child_path = if path.is_empty() {
            node.name.clone()
        } else {
            format!("{path} {}", node.name)
        };

        writeln!(writer, "### {}", escape(&child_path))?;
        writeln!(
            writer,
            "{}",
            escape(node.description.as_deref().unwrap_or_default())
        )?;

        if let Some(long_description) = &node.long_description {
            writeln!(writer)?;
            writeln!(writer, "{}", emphasize_quoted(long_description))?;
        }

        writeln!(writer)?;
        writeln!(writer, "**Usage**: `{}`", usage(tree, child))?;

        if !node.aliases.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "**Aliases**: {}", escape(&node.aliases.join(", ")))?;
        }

        writeln!(writer)?;
        let groups: Vec<GroupId> = tree
            .command_groups(child)
            .into_iter()
            .filter(|group| !tree.group(*group).hidden)
            .collect();
        write_options(tree, writer, child, &groups, "####")?;
        write_commands(tree, writer, child, &child_path)?;
    }

    Ok(())
}

fn write_options(
    tree: &Tree,
    writer: &mut dyn Write,
    command: CommandId,
    groups: &[GroupId],
    heading: &str,
) -> std::io::Result<()> {
    for group in groups {
        let flags = visible_flags(tree, *group);
        let node = tree.group(*group);

        if flags.is_empty() {
            continue;
        }

        // The command's own group is titled by the enclosing section.
        if *group != tree.command(command).group {
            writeln!(writer, "{heading} {}", escape(&node.name))?;

            if let Some(description) = &node.description {
                writeln!(writer, "{}", emphasize_quoted(description))?;
            }
        }

        for id in flags {
            writeln!(writer, "{}", option_entry(tree.flag(id)))?;
        }
    }

    Ok(())
}

/// ``- `-v`, `--verbose` *VALUE* <default: *x*> (*required*) description``
fn option_entry(node: &FlagNode) -> String {
    let flag = &node.flag;
    let mut names = Vec::default();

    if let Some(short) = flag.short {
        names.push(format!("`-{short}`"));
    }

    if let Some(long) = &flag.long {
        names.push(format!("`--{}`", escape(long)));
    }

    let mut entry = format!("- {}", names.join(", "));

    if node.can_argument() {
        let value = escape(&value_name(node));

        match &flag.optional_value {
            Some(values) => {
                entry.push_str(&format!(" [*{value}={}*]", escape(&values.join(", "))))
            }
            None => entry.push_str(&format!(" *{value}*")),
        }
    }

    if !flag.defaults.is_empty() && flag.default_mask.as_deref() != Some("-") {
        let default = flag
            .default_mask
            .clone()
            .unwrap_or_else(|| flag.defaults.join(", "));
        entry.push_str(&format!(" <default: *{}*>", escape(&default)));
    } else if let Some(env) = &flag.env {
        entry.push_str(&format!(" <default: *${}*>", escape(env)));
    }

    if flag.required {
        entry.push_str(" (*required*)");
    }

    if let Some(description) = &flag.description {
        entry.push(' ');
        entry.push_str(&emphasize_quoted(description));
    }

    entry
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
}

/// Render `quoted' terms in bold.
fn emphasize_quoted(text: &str) -> String {
    let mut out = String::default();
    let mut rest = text;

    while let Some(start) = rest.find('`') {
        out.push_str(&escape(&rest[..start]));
        let after = &rest[start + 1..];

        match after.find('\'') {
            Some(end) => {
                out.push_str(&format!("**{}**", escape(&after[..end])));
                rest = &after[end + 1..];
            }
            None => {
                rest = after;
                break;
            }
        }
    }

    out.push_str(&escape(rest));
    out
}
