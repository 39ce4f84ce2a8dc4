use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::path::Path;

use thiserror::Error;

use crate::error::{Error, ErrorKind};
use crate::model::IniOptions;
use crate::parser::{CommandId, FlagId, GroupId, Tree};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Failure to read or apply an INI file.
#[derive(Debug, Error)]
pub enum IniError {
    /// The content is not well formed.
    #[error("{file}:{line}: {message}")]
    Syntax {
        /// The file name, or `<input>` when reading from a stream.
        file: String,
        /// The 1-based line number.
        line: usize,
        /// What is wrong with the line.
        message: String,
    },
    /// The file could not be read.
    #[error("{file}: {source}")]
    Io {
        /// The file name.
        file: String,
        /// The underlying failure.
        source: std::io::Error,
    },
    /// The content is well formed, but could not be applied to the flags.
    #[error(transparent)]
    Apply(#[from] Error),
}

impl IniError {
    fn syntax(file: &str, line: usize, message: &str) -> Self {
        IniError::Syntax {
            file: file.to_string(),
            line,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct IniValue {
    pub(crate) name: String,
    pub(crate) value: String,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct IniSection {
    /// `None` for the keys before the first section header.
    pub(crate) name: Option<String>,
    pub(crate) values: Vec<IniValue>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Ini {
    pub(crate) sections: Vec<IniSection>,
}

pub(crate) fn read(reader: impl BufRead, file: &str) -> Result<Ini, IniError> {
    let mut sections = vec![IniSection {
        name: None,
        values: Vec::default(),
    }];

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IniError::Io {
            file: file.to_string(),
            source,
        })?;
        let number = index + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or_else(|| IniError::syntax(file, number, "malformed section header"))?
                .trim();

            if name.is_empty() {
                return Err(IniError::syntax(file, number, "empty section name"));
            }

            sections.push(IniSection {
                name: Some(name.to_string()),
                values: Vec::default(),
            });
            continue;
        }

        let (name, value) = line
            .split_once('=')
            .ok_or_else(|| IniError::syntax(file, number, "malformed key=value"))?;
        let name = name.trim();

        if name.is_empty() {
            return Err(IniError::syntax(file, number, "empty key"));
        }

        match sections.last_mut() {
            Some(section) => section.values.push(IniValue {
                name: name.to_string(),
                value: unquote(value.trim()),
            }),
            None => unreachable!("internal error - the unnamed section always exists"),
        }
    }

    Ok(Ini { sections })
}

pub(crate) fn read_file(path: &Path) -> Result<Ini, IniError> {
    let file = path.display().to_string();
    let handle = std::fs::File::open(path).map_err(|source| IniError::Io {
        file: file.clone(),
        source,
    })?;
    read(std::io::BufReader::new(handle), &file)
}

/// Apply `ini` to the flags of the tree, without resetting them first.
pub(crate) fn apply(tree: &mut Tree, ini: &Ini, ignore_unknown: bool) -> Result<(), Error> {
    let mut cleared: HashSet<FlagId> = HashSet::default();

    for section in &ini.sections {
        let candidates = match &section.name {
            None => tree.scope_flags(CommandId::ROOT),
            Some(name) => {
                let group = find_group(tree, name).ok_or_else(|| {
                    Error::new(
                        ErrorKind::UnknownGroup,
                        format!("could not find option group `{name}'"),
                    )
                })?;
                tree.group(group).flags.clone()
            }
        };

        for value in &section.values {
            let Some(id) = find_flag(tree, &candidates, &value.name) else {
                if ignore_unknown {
                    continue;
                }

                return Err(Error::new(
                    ErrorKind::UnknownFlag,
                    format!("unknown option: {}", value.name),
                ));
            };

            if !tree.flag(id).is_ini() {
                continue;
            }

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Applying {}={:?}.", value.name, value.value);
            }

            let node = tree.flag_mut(id);
            let kind = node.kind();

            if kind.is_repeatable() && cleared.insert(id) {
                node.clear();
            }

            if kind.is_boolean() && value.value.is_empty() {
                node.capture(None)?;
            } else {
                node.capture(Some(&value.value))?;
            }

            node.is_set = true;
        }
    }

    Ok(())
}

/// Load the INI file at `path` into the tree, as an include flag does mid-parse.
pub(crate) fn include(tree: &mut Tree, path: &str, ignore_unknown: bool) -> Result<(), Error> {
    let ini = read_file(Path::new(path)).map_err(|error| match error {
        IniError::Apply(error) => error,
        other => Error::new(ErrorKind::Unknown, other.to_string()),
    })?;
    apply(tree, &ini, ignore_unknown)
}

fn find_group(tree: &Tree, name: &str) -> Option<GroupId> {
    tree.commands()
        .into_iter()
        .flat_map(|command| tree.command_groups(command))
        .find(|group| tree.section_name(*group).eq_ignore_ascii_case(name))
}

/// Match by ini name, then long name, then short name.
fn find_flag(tree: &Tree, candidates: &[FlagId], key: &str) -> Option<FlagId> {
    let key = key.to_lowercase();
    let by_ini_name = candidates.iter().find(|id| {
        tree.flag(**id)
            .flag
            .ini_name
            .as_ref()
            .map_or(false, |name| name.to_lowercase() == key)
    });
    let by_long = || {
        candidates.iter().find(|id| {
            tree.flag(**id)
                .flag
                .long
                .as_ref()
                .map_or(false, |long| long.to_lowercase() == key)
        })
    };
    let by_short = || {
        candidates.iter().find(|id| {
            tree.flag(**id)
                .flag
                .short
                .map_or(false, |short| short.to_lowercase().to_string() == key)
        })
    };

    by_ini_name.or_else(by_long).or_else(by_short).copied()
}

/// Write the current values of every INI-capable flag, one section per group.
pub(crate) fn write(tree: &Tree, writer: &mut dyn Write, options: &IniOptions) -> std::io::Result<()> {
    let mut first = true;

    for command in tree.commands() {
        for group in tree.command_groups(command) {
            let lines = group_lines(tree, group, options);

            if lines.is_empty() {
                continue;
            }

            if !first {
                writeln!(writer)?;
            }

            first = false;
            writeln!(writer, "[{}]", tree.section_name(group))?;

            for line in lines {
                writeln!(writer, "{line}")?;
            }
        }
    }

    Ok(())
}

fn group_lines(tree: &Tree, group: GroupId, options: &IniOptions) -> Vec<String> {
    let mut lines = Vec::default();

    for id in &tree.group(group).flags {
        let node = tree.flag(*id);

        if !node.is_ini() {
            continue;
        }

        let values = node.render();
        let is_default = values == node.default_rendered;

        if values.is_empty() || (is_default && !options.include_defaults) {
            continue;
        }

        if options.include_comments {
            if let Some(description) = &node.flag.description {
                lines.push(format!("; {description}"));
            }
        }

        let prefix = if is_default && options.comment_defaults {
            "; "
        } else {
            ""
        };
        let name = node.ini_name();

        for value in &values {
            lines.push(format!("{prefix}{name} = {}", quote(value)));
        }
    }

    lines
}

fn needs_quotes(value: &str) -> bool {
    value != value.trim()
        || value.starts_with(';')
        || value.starts_with('#')
        || value.contains(['"', '\\', '\n', '\r', '\t'])
}

pub(crate) fn quote(value: &str) -> String {
    if !needs_quotes(value) {
        return value.to_string();
    }

    let mut out = String::from('"');

    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }

    out.push('"');
    out
}

/// The inverse of [`quote`]; values that are not double quoted are returned as is.
pub(crate) fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|value| value.strip_suffix('"'))
    else {
        return value.to_string();
    };
    let mut out = String::default();
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
