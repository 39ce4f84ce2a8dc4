use std::io::Write;

use crate::parser::printer::{flag_description, usage, visible_flags, visible_groups};
use crate::parser::tree::{describe, CommandId, GroupId, Tree};

/// Write a groff man page (section 1) for the whole descriptor tree.
pub(crate) fn write_man_page(tree: &Tree, writer: &mut dyn Write, date: &str) -> std::io::Result<()> {
    let root = tree.command(CommandId::ROOT);
    let synopsis = usage(tree, CommandId::ROOT);
    let synopsis = synopsis
        .strip_prefix(root.name.as_str())
        .unwrap_or(&synopsis)
        .trim_start();

    writeln!(writer, ".TH {} 1 \"{date}\"", root.name)?;
    writeln!(writer, ".SH NAME")?;
    writeln!(
        writer,
        "{} \\- {}",
        root.name,
        root.description.as_deref().unwrap_or_default()
    )?;
    writeln!(writer, ".SH SYNOPSIS")?;
    writeln!(writer, "\\fB{}\\fP {synopsis}", root.name)?;
    writeln!(writer, ".SH DESCRIPTION")?;
    writeln!(
        writer,
        "{}",
        bold_quoted(root.long_description.as_deref().unwrap_or_default())
    )?;
    writeln!(writer, ".SH OPTIONS")?;
    write_options(tree, writer, &visible_groups(tree, CommandId::ROOT))?;

    if !root.commands.is_empty() {
        writeln!(writer, ".SH COMMANDS")?;

        for child in &root.commands {
            write_command(tree, writer, *child, &tree.command(*child).name)?;
        }
    }

    Ok(())
}

fn write_command(
    tree: &Tree,
    writer: &mut dyn Write,
    command: CommandId,
    path: &str,
) -> std::io::Result<()> {
    let node = tree.command(command);
    writeln!(writer, ".SS {path}")?;

    if let Some(description) = &node.description {
        writeln!(writer, "{}", bold_quoted(description))?;
    }

    if let Some(long_description) = &node.long_description {
        writeln!(writer)?;
        writeln!(writer, "{}", bold_quoted(long_description))?;
    }

    if !node.aliases.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "\\fBAliases\\fP: {}", node.aliases.join(", "))?;
    }

    let groups: Vec<GroupId> = tree
        .command_groups(command)
        .into_iter()
        .filter(|group| !tree.group(*group).hidden)
        .collect();
    write_options(tree, writer, &groups)?;

    for child in &node.commands {
        let child_path = format!("{path} {}", tree.command(*child).name);
        write_command(tree, writer, *child, &child_path)?;
    }

    Ok(())
}

fn write_options(tree: &Tree, writer: &mut dyn Write, groups: &[GroupId]) -> std::io::Result<()> {
    for group in groups {
        let flags = visible_flags(tree, *group);

        if let Some(description) = &tree.group(*group).description {
            if !flags.is_empty() {
                writeln!(writer, ".PP")?;
                writeln!(writer, "{}", bold_quoted(description))?;
            }
        }

        for id in flags {
            let node = tree.flag(id);
            writeln!(writer, ".TP")?;
            writeln!(
                writer,
                "\\fB{}\\fP",
                describe(node.flag.short, node.flag.long.as_deref())
            )?;
            writeln!(writer, "{}", bold_quoted(&flag_description(node)))?;
        }
    }

    Ok(())
}

/// Render `quoted' terms in bold.
fn bold_quoted(text: &str) -> String {
    let mut out = String::default();
    let mut rest = text;

    while let Some(start) = rest.find('`') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        match after.find('\'') {
            Some(end) => {
                out.push_str(&format!("\\fB{}\\fP", &after[..end]));
                rest = &after[end + 1..];
            }
            None => {
                rest = after;
                break;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Command, Flag, Group, Scalar};
    use crate::model::ParserOptions;
    use crate::test::assert_contains;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("use `name' here", "use \\fBname\\fP here")]
    #[case("`a' and `b'", "\\fBa\\fP and \\fBb\\fP")]
    #[case("open `quote", "open quote")]
    fn bold(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(bold_quoted(text), expected);
    }

    #[test]
    fn man_page() {
        // Setup
        let mut verbose = false;
        let mut force = false;
        let root = Command::new("program")
            .description("A test program")
            .long_description("Run `program' with care.")
            .add(
                Flag::new(Scalar::new(&mut verbose))
                    .short('v')
                    .long("verbose")
                    .description("Be loud"),
            )
            .command(
                Command::new("add")
                    .alias("a")
                    .description("Add a file")
                    .add(Flag::new(Scalar::new(&mut force)).long("force"))
                    .command(Command::new("deep")),
            );
        let tree = Tree::build(root, &ParserOptions::default()).unwrap();
        let mut out: Vec<u8> = Vec::default();

        // Execute
        write_man_page(&tree, &mut out, "1 January 2024").unwrap();

        // Verify
        let page = String::from_utf8(out).unwrap();
        assert!(page.starts_with(
            ".TH program 1 \"1 January 2024\"\n.SH NAME\nprogram \\- A test program\n.SH SYNOPSIS\n\\fBprogram\\fP [OPTIONS] <command>\n"
        ));
        assert_contains!(page, ".SH DESCRIPTION\nRun \\fBprogram\\fP with care.\n");
        assert_contains!(page, ".TP\n\\fB-v, --verbose\\fP\nBe loud\n");
        assert_contains!(page, ".TP\n\\fB-h, --help\\fP\n");
        assert_contains!(page, ".SH COMMANDS\n.SS add\nAdd a file\n");
        assert_contains!(page, "\\fBAliases\\fP: a\n");
        assert_contains!(page, ".TP\n\\fB--force\\fP\n");
        assert_contains!(page, ".SS add deep\n");
    }

    #[test]
    fn man_page_group_description() {
        let mut host = String::default();
        let root = Command::new("program").group(
            Group::new("Network")
                .description("Where to `connect'")
                .add(Flag::new(Scalar::new(&mut host)).long("host")),
        );
        let tree = Tree::build(root, &ParserOptions::none()).unwrap();
        let mut out: Vec<u8> = Vec::default();

        write_man_page(&tree, &mut out, "1 January 2024").unwrap();

        assert_contains!(
            String::from_utf8(out).unwrap(),
            ".SH OPTIONS\n.PP\nWhere to \\fBconnect\\fP\n.TP\n\\fB--host\\fP\n"
        );
    }
}
