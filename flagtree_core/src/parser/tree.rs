use crate::api::{
    Action, Command, Completer, Executor, Flag, Group, InvalidCapture, Positional, ValueKind,
};
use crate::constant::*;
use crate::error::{Error, ErrorKind};
use crate::matcher::Lookup;
use crate::model::{Environment, OptionStyle, ParserOptions};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct FlagId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct GroupId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct CommandId(pub(crate) usize);

impl CommandId {
    pub(crate) const ROOT: CommandId = CommandId(0);
}

pub(crate) struct FlagNode<'a> {
    pub(crate) flag: Flag<'a>,
    pub(crate) is_set: bool,
    pub(crate) default_rendered: Vec<String>,
}

impl<'a> FlagNode<'a> {
    pub(crate) fn kind(&self) -> ValueKind {
        self.flag.action.kind()
    }

    pub(crate) fn can_argument(&self) -> bool {
        self.kind().can_argument()
    }

    pub(crate) fn is_optional(&self) -> bool {
        self.flag.optional_value.is_some()
    }

    pub(crate) fn is_numeric(&self) -> bool {
        match &self.flag.action {
            Action::Store(field) => field.is_numeric(),
            Action::Include | Action::Help => false,
        }
    }

    /// Whether the flag can be written to (and read from) INI files.
    pub(crate) fn is_ini(&self) -> bool {
        !self.flag.no_ini
            && matches!(&self.flag.action, Action::Store(_))
            && !matches!(self.kind(), ValueKind::Callback { .. } | ValueKind::Nested)
    }

    pub(crate) fn ini_name(&self) -> String {
        if let Some(name) = &self.flag.ini_name {
            name.clone()
        } else if let Some(long) = &self.flag.long {
            long.clone()
        } else {
            self.flag.short.map(String::from).unwrap_or_default()
        }
    }

    pub(crate) fn capture(&mut self, token: Option<&str>) -> Result<(), Error> {
        let result = match &mut self.flag.action {
            Action::Store(field) => field.capture(token, self.flag.base),
            Action::Include | Action::Help => {
                unreachable!("internal error - only storing flags may capture")
            }
        };
        result.map_err(|error| marshal(&self.to_string(), "flag", error))
    }

    pub(crate) fn begin_capture(&mut self) {
        if let Action::Store(field) = &mut self.flag.action {
            field.begin_capture();
        }
    }

    pub(crate) fn clear(&mut self) {
        if let Action::Store(field) = &mut self.flag.action {
            field.clear();
        }
    }

    pub(crate) fn render(&self) -> Vec<String> {
        match &self.flag.action {
            Action::Store(field) => field.render(self.flag.base),
            Action::Include | Action::Help => Vec::default(),
        }
    }

    pub(crate) fn type_name(&self) -> String {
        match &self.flag.action {
            Action::Store(field) => field.type_name(),
            Action::Include => "path".to_string(),
            Action::Help => String::default(),
        }
    }

    /// Reset to the declared value, then apply the environment variable or else the defaults.
    fn apply_defaults(&mut self, environment: &dyn Environment) -> Result<(), Error> {
        self.is_set = false;
        let kind = self.kind();
        let Flag {
            action,
            short,
            long,
            defaults,
            base,
            env,
            env_delimiter,
            ..
        } = &mut self.flag;
        let Action::Store(field) = action else {
            return Ok(());
        };

        field.reset();
        let values = match env.as_deref().and_then(|key| environment.var(key)) {
            Some(value) => match env_delimiter.as_deref() {
                Some(delimiter) if kind.is_repeatable() => {
                    value.split(delimiter).map(String::from).collect()
                }
                _ => vec![value],
            },
            None => defaults.clone(),
        };

        if !values.is_empty() {
            field.clear();

            for value in &values {
                field
                    .capture(Some(value), *base)
                    .map_err(|error| marshal(&describe(*short, long.as_deref()), "flag", error))?;
            }
        }

        self.default_rendered = field.render(*base);
        Ok(())
    }
}

impl<'a> std::fmt::Display for FlagNode<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", describe(self.flag.short, self.flag.long.as_deref()))
    }
}

/// `-v, --verbose`, `-v` or `--verbose`.
pub(crate) fn describe(short: Option<char>, long: Option<&str>) -> String {
    match (short, long) {
        (Some(short), Some(long)) => format!("-{short}, --{long}"),
        (Some(short), None) => format!("-{short}"),
        (None, Some(long)) => format!("--{long}"),
        (None, None) => String::default(),
    }
}

pub(crate) fn marshal(name: &str, what: &str, error: InvalidCapture) -> Error {
    match error {
        InvalidCapture::InvalidConversion {
            type_name, cause, ..
        } => Error::new(
            ErrorKind::Marshal,
            format!("invalid argument for {what} `{name}' (expected {type_name}): {cause}"),
        ),
        InvalidCapture::Rejected(error) => error,
    }
}

pub(crate) struct GroupNode {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) flags: Vec<FlagId>,
    pub(crate) groups: Vec<GroupId>,
    pub(crate) command: CommandId,
    pub(crate) is_help: bool,
}

pub(crate) struct PositionalNode<'a> {
    pub(crate) positional: Positional<'a>,
    pub(crate) is_set: bool,
}

impl<'a> PositionalNode<'a> {
    pub(crate) fn is_repeatable(&self) -> bool {
        self.positional.field.kind().is_repeatable()
    }

    pub(crate) fn capture(&mut self, token: &str) -> Result<(), Error> {
        let result = self
            .positional
            .field
            .capture(Some(token), DEFAULT_BASE);
        self.is_set = true;
        result.map_err(|error| marshal(&self.positional.name, "positional", error))
    }
}

pub(crate) struct CommandNode<'a> {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) long_description: Option<String>,
    pub(crate) group: GroupId,
    pub(crate) positionals: Vec<PositionalNode<'a>>,
    pub(crate) commands: Vec<CommandId>,
    pub(crate) parent: Option<CommandId>,
    pub(crate) subcommands_optional: bool,
    pub(crate) reject_extra_args: bool,
    pub(crate) executor: Option<Executor<'a>>,
}

/// The descriptor tree, flattened into arenas addressed by id.
///
/// Each group owns its flags, each command owns its top group, and the root command is [`CommandId::ROOT`].
pub(crate) struct Tree<'a> {
    flags: Vec<FlagNode<'a>>,
    groups: Vec<GroupNode>,
    commands: Vec<CommandNode<'a>>,
}

impl<'a> std::fmt::Debug for Tree<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("flags", &self.flags.len())
            .field("groups", &self.groups.len())
            .field("commands", &self.commands.len())
            .finish()
    }
}

impl<'a> Tree<'a> {
    pub(crate) fn build(root: Command<'a>, options: &ParserOptions) -> Result<Self, Error> {
        let mut tree = Tree {
            flags: Vec::default(),
            groups: Vec::default(),
            commands: Vec::default(),
        };
        tree.add_command(root, None);

        if options.help_flag {
            tree.add_help_group(options.style);
        }

        tree.validate()?;

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Built tree: {} flags, {} groups, {} commands.",
                tree.flags.len(),
                tree.groups.len(),
                tree.commands.len()
            );
        }

        Ok(tree)
    }

    fn add_command(&mut self, command: Command<'a>, parent: Option<CommandId>) -> CommandId {
        let Command {
            name,
            aliases,
            description,
            long_description,
            title,
            mut options,
            positionals,
            commands,
            subcommands_optional,
            reject_extra_args,
            executor,
        } = command;
        let id = CommandId(self.commands.len());
        options.name = match (title, parent) {
            (Some(title), _) => title,
            (None, None) => ROOT_GROUP.to_string(),
            (None, Some(_)) => description.clone().unwrap_or_else(|| name.clone()),
        };
        let group = self.add_group(options, id, "", "");
        self.commands.push(CommandNode {
            name,
            aliases,
            description,
            long_description,
            group,
            positionals: positionals
                .into_iter()
                .map(|positional| PositionalNode {
                    positional,
                    is_set: false,
                })
                .collect(),
            commands: Vec::default(),
            parent,
            subcommands_optional,
            reject_extra_args,
            executor,
        });

        for child in commands {
            let child_id = self.add_command(child, Some(id));
            self.commands[id.0].commands.push(child_id);
        }

        id
    }

    fn add_group(
        &mut self,
        group: Group<'a>,
        command: CommandId,
        namespace: &str,
        env_namespace: &str,
    ) -> GroupId {
        let Group {
            name,
            description,
            namespace: own_namespace,
            env_namespace: own_env_namespace,
            hidden,
            flags,
            groups,
        } = group;
        let namespace = join(namespace, own_namespace.as_deref(), NAMESPACE_DELIMITER);
        let env_namespace = join(
            env_namespace,
            own_env_namespace.as_deref(),
            ENV_NAMESPACE_DELIMITER,
        );
        let id = GroupId(self.groups.len());
        self.groups.push(GroupNode {
            name,
            description,
            hidden,
            flags: Vec::default(),
            groups: Vec::default(),
            command,
            is_help: false,
        });

        for mut flag in flags {
            flag.long = flag
                .long
                .map(|long| join(&namespace, Some(&long), NAMESPACE_DELIMITER));
            flag.env = flag
                .env
                .map(|env| join(&env_namespace, Some(&env), ENV_NAMESPACE_DELIMITER));
            let flag_id = FlagId(self.flags.len());
            self.flags.push(FlagNode {
                flag,
                is_set: false,
                default_rendered: Vec::default(),
            });
            self.groups[id.0].flags.push(flag_id);
        }

        for child in groups {
            let child_id = self.add_group(child, command, &namespace, &env_namespace);
            self.groups[id.0].groups.push(child_id);
        }

        id
    }

    fn add_help_group(&mut self, style: OptionStyle) {
        let mut group = Group::new(HELP_GROUP).add(
            Flag::help()
                .short(HELP_SHORT)
                .long(HELP_NAME)
                .description(HELP_MESSAGE),
        );

        if style == OptionStyle::Windows {
            group = group.add(
                Flag::help()
                    .short(HELP_WINDOWS_SHORT)
                    .description(HELP_MESSAGE)
                    .hidden(),
            );
        }

        let root_group = self.command(CommandId::ROOT).group;
        let id = self.add_group(group, CommandId::ROOT, "", "");
        self.groups[id.0].is_help = true;
        self.groups[root_group.0].groups.push(id);
    }

    fn validate(&self) -> Result<(), Error> {
        for node in &self.flags {
            let flag = &node.flag;
            let kind = node.kind();

            if flag.short.is_none() && flag.long.as_deref().map_or(true, str::is_empty) {
                return Err(tag("a flag must have a short or a long name".to_string()));
            }

            if flag.short.map_or(false, |c| c == '-' || c.is_whitespace()) {
                return Err(tag(format!("flag `{node}' has an invalid short name")));
            }

            if flag.terminator.is_some() && !kind.is_repeatable() {
                return Err(tag(format!(
                    "flag `{node}' has a terminator, but only repeatable flags may be terminated"
                )));
            }

            if flag.terminator.is_some() && kind.is_boolean() {
                return Err(tag(format!(
                    "flag `{node}' has a terminator, but takes no argument"
                )));
            }

            if node.is_optional() && !kind.can_argument() {
                return Err(tag(format!(
                    "flag `{node}' has an optional value, but takes no argument"
                )));
            }

            if !(2..=36).contains(&flag.base) {
                return Err(tag(format!(
                    "flag `{node}' has base {}, but the base must be within 2 and 36",
                    flag.base
                )));
            }
        }

        for (index, command) in self.commands.iter().enumerate() {
            Lookup::for_scope(self, CommandId(index))?;
            let last = command.positionals.len().saturating_sub(1);

            for (position, node) in command.positionals.iter().enumerate() {
                if node.is_repeatable() && position != last {
                    return Err(tag(format!(
                        "positional `{}' of `{}' is repeatable, so it must be the last positional",
                        node.positional.name, command.name
                    )));
                }
            }
        }

        Ok(())
    }

    pub(crate) fn flag(&self, id: FlagId) -> &FlagNode<'a> {
        &self.flags[id.0]
    }

    pub(crate) fn flag_mut(&mut self, id: FlagId) -> &mut FlagNode<'a> {
        &mut self.flags[id.0]
    }

    pub(crate) fn group(&self, id: GroupId) -> &GroupNode {
        &self.groups[id.0]
    }

    pub(crate) fn command(&self, id: CommandId) -> &CommandNode<'a> {
        &self.commands[id.0]
    }

    pub(crate) fn command_mut(&mut self, id: CommandId) -> &mut CommandNode<'a> {
        &mut self.commands[id.0]
    }

    /// Every command, parents before children.
    pub(crate) fn commands(&self) -> Vec<CommandId> {
        let mut out = Vec::default();
        let mut stack = vec![CommandId::ROOT];

        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.command(id).commands.iter().rev());
        }

        out
    }

    /// The commands from the root down to `command`.
    pub(crate) fn chain(&self, command: CommandId) -> Vec<CommandId> {
        let mut chain = vec![command];
        let mut current = command;

        while let Some(parent) = self.command(current).parent {
            chain.push(parent);
            current = parent;
        }

        chain.reverse();
        chain
    }

    pub(crate) fn command_path(&self, command: CommandId) -> Vec<&str> {
        self.chain(command)
            .into_iter()
            .map(|id| self.command(id).name.as_str())
            .collect()
    }

    /// The groups owned by `command`, depth first.
    pub(crate) fn command_groups(&self, command: CommandId) -> Vec<GroupId> {
        let mut out = Vec::default();
        let mut stack = vec![self.command(command).group];

        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.group(id).groups.iter().rev());
        }

        out
    }

    /// The groups visible from `command`: its own and its ancestors'.
    pub(crate) fn scope_groups(&self, command: CommandId) -> Vec<GroupId> {
        self.chain(command)
            .into_iter()
            .flat_map(|id| self.command_groups(id))
            .collect()
    }

    pub(crate) fn scope_flags(&self, command: CommandId) -> Vec<FlagId> {
        self.scope_groups(command)
            .into_iter()
            .flat_map(|id| self.group(id).flags.iter().copied())
            .collect()
    }

    /// The INI section name of a group: the group name, prefixed by its command path below the root.
    pub(crate) fn section_name(&self, group: GroupId) -> String {
        let node = self.group(group);
        let mut path: Vec<&str> = self.command_path(node.command).into_iter().skip(1).collect();
        path.push(&node.name);
        path.join(SECTION_DELIMITER)
    }

    pub(crate) fn help_group(&self) -> Option<GroupId> {
        self.groups
            .iter()
            .position(|group| group.is_help)
            .map(GroupId)
    }

    /// Reset every field, then apply environment variables and defaults.
    pub(crate) fn store_defaults(&mut self, environment: &dyn Environment) -> Result<(), Error> {
        for node in self.flags.iter_mut() {
            node.apply_defaults(environment)?;
        }

        for command in self.commands.iter_mut() {
            for node in command.positionals.iter_mut() {
                node.positional.field.reset();
                node.is_set = false;
            }
        }

        Ok(())
    }

    pub(crate) fn completer(&self, id: FlagId) -> Option<&Completer<'a>> {
        self.flag(id).flag.completer.as_ref()
    }
}

fn join(prefix: &str, name: Option<&str>, delimiter: &str) -> String {
    match name {
        Some(name) if !prefix.is_empty() => format!("{prefix}{delimiter}{name}"),
        Some(name) => name.to_string(),
        None => prefix.to_string(),
    }
}

fn tag(message: String) -> Error {
    Error::new(ErrorKind::Tag, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Callback, Collection, Scalar};
    use rstest::rstest;
    use std::collections::HashMap;

    #[test]
    fn build_flattens() {
        // Setup
        let mut a = false;
        let mut b = false;
        let mut c = false;
        let root = Command::new("program")
            .add(Flag::new(Scalar::new(&mut a)).short('a'))
            .group(
                Group::new("Outer")
                    .namespace("outer")
                    .env_namespace("OUTER")
                    .add(Flag::new(Scalar::new(&mut b)).long("b").env("B"))
                    .group(
                        Group::new("Inner")
                            .namespace("inner")
                            .add(Flag::new(Scalar::new(&mut c)).long("c")),
                    ),
            )
            .command(Command::new("sub").description("A command"));

        // Execute
        let tree = Tree::build(root, &ParserOptions::default()).unwrap();

        // Verify
        assert_eq!(tree.flag(FlagId(1)).flag.long, Some("outer.b".to_string()));
        assert_eq!(tree.flag(FlagId(1)).flag.env, Some("OUTER_B".to_string()));
        assert_eq!(
            tree.flag(FlagId(2)).flag.long,
            Some("outer.inner.c".to_string())
        );
        let names: Vec<String> = tree
            .scope_groups(CommandId::ROOT)
            .into_iter()
            .map(|id| tree.section_name(id))
            .collect();
        assert_eq!(
            names,
            vec!["Application Options", "Outer", "Inner", "Help Options"]
        );
        let groups = tree.scope_groups(CommandId::ROOT);
        assert_eq!(tree.group(groups[1]).flags, vec![FlagId(1)]);
        assert_eq!(tree.group(groups[2]).flags, vec![FlagId(2)]);
        let sub = tree.command(CommandId::ROOT).commands[0];
        assert_eq!(tree.section_name(tree.command(sub).group), "sub.A command");
        assert_eq!(tree.command_path(sub), vec!["program", "sub"]);
        assert_eq!(tree.commands(), vec![CommandId::ROOT, sub]);
        assert!(tree.help_group().is_some());
        assert_eq!(
            format!("{tree:?}"),
            "Tree { flags: 4, groups: 5, commands: 2 }"
        );
    }

    #[test]
    fn build_windows_help() {
        let tree = Tree::build(
            Command::new("program"),
            &ParserOptions::default().style(OptionStyle::Windows),
        )
        .unwrap();
        let lookup = Lookup::for_scope(&tree, CommandId::ROOT).unwrap();
        assert!(lookup.short('?').is_some());
        assert!(lookup.short('h').is_some());
    }

    #[test]
    fn build_duplicate_across_scopes() {
        let mut a = false;
        let mut b = false;
        let root = Command::new("program")
            .add(Flag::new(Scalar::new(&mut a)).long("name"))
            .command(Command::new("sub").add(Flag::new(Scalar::new(&mut b)).long("NAME")));

        let error = Tree::build(root, &ParserOptions::none()).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Tag);
        assert_eq!(
            error.message(),
            "long name `--NAME' is used by both `--name' and `--NAME'"
        );
    }

    #[test]
    fn build_duplicate_help() {
        let mut a = false;
        let root = Command::new("program").add(Flag::new(Scalar::new(&mut a)).short('h'));

        assert_eq!(
            Tree::build(root, &ParserOptions::default())
                .unwrap_err()
                .kind(),
            ErrorKind::Tag
        );
    }

    #[test]
    fn build_duplicate_command() {
        let root = Command::new("program")
            .command(Command::new("add").alias("a"))
            .command(Command::new("a"));

        assert_eq!(
            Tree::build(root, &ParserOptions::none())
                .unwrap_err()
                .kind(),
            ErrorKind::Tag
        );
    }

    #[rstest]
    #[case::unnamed(Flag::new(Callback::new(|| Ok(()))))]
    #[case::terminated_callback(Flag::new(Callback::new(|| Ok(()))).long("x").terminator(";"))]
    #[case::optional_callback(Flag::new(Callback::new(|| Ok(()))).long("x").optional_value("1"))]
    #[case::base(Flag::include().long("x").base(1))]
    #[case::dash(Flag::include().short('-'))]
    fn build_invalid_flag(#[case] flag: Flag<'static>) {
        let root = Command::new("program").add(flag);
        let error = Tree::build(root, &ParserOptions::none()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Tag);
    }

    #[test]
    fn build_terminator_scalar() {
        let mut a: u32 = 0;
        let root = Command::new("program").add(Flag::new(Scalar::new(&mut a)).long("a").terminator(";"));
        let error = Tree::build(root, &ParserOptions::none()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Tag);
    }

    #[test]
    fn build_repeatable_positional_last() {
        let mut items: Vec<String> = Vec::default();
        let mut name = String::default();
        let root = Command::new("program")
            .positional(Positional::new(Collection::new(&mut items), "ITEMS"))
            .positional(Positional::new(Scalar::new(&mut name), "NAME"));
        let error = Tree::build(root, &ParserOptions::none()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Tag);
    }

    #[test]
    fn store_defaults() {
        // Setup
        let mut level: u32 = 9;
        let mut items: Vec<String> = vec!["initial".to_string()];
        let mut name = String::default();

        {
            let root = Command::new("program")
                .add(Flag::new(Scalar::new(&mut level)).long("level").default("ff").base(16))
                .add(
                    Flag::new(Collection::new(&mut items))
                        .long("item")
                        .default("x")
                        .env("ITEMS")
                        .env_delimiter(","),
                )
                .add(Flag::new(Scalar::new(&mut name)).long("name"));
            let mut tree = Tree::build(root, &ParserOptions::none()).unwrap();
            let environment = HashMap::from([("ITEMS", "a,b")]);

            // Execute
            tree.store_defaults(&environment).unwrap();

            // Verify
            assert_eq!(tree.flag(FlagId(0)).default_rendered, vec!["ff"]);
            assert_eq!(tree.flag(FlagId(1)).default_rendered, vec!["a", "b"]);
            assert_eq!(tree.flag(FlagId(2)).default_rendered, vec![""]);
        }

        assert_eq!(level, 255);
        assert_eq!(items, vec!["a", "b"]);
        assert_eq!(name, "");
    }

    #[test]
    fn store_defaults_invalid() {
        let mut level: u32 = 0;
        let root = Command::new("program")
            .add(Flag::new(Scalar::new(&mut level)).short('l').default("x"));
        let mut tree = Tree::build(root, &ParserOptions::none()).unwrap();
        let environment: HashMap<&str, &str> = HashMap::default();

        let error = tree.store_defaults(&environment).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Marshal);
        assert_eq!(
            error.message(),
            "invalid argument for flag `-l' (expected u32): invalid digit found in string"
        );
    }

    #[rstest]
    #[case(Some('v'), Some("verbose"), "-v, --verbose")]
    #[case(Some('v'), None, "-v")]
    #[case(None, Some("verbose"), "--verbose")]
    fn describe_names(#[case] short: Option<char>, #[case] long: Option<&str>, #[case] expected: &str) {
        assert_eq!(describe(short, long), expected);
    }
}
