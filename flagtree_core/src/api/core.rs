use crate::api::{Flag, Positional};
use crate::error::Error;

pub(crate) type Executor<'a> = Box<dyn FnMut(&[String]) -> Result<(), Error> + 'a>;

/// A named collection of flags (and nested groups), shown as one section of the help message
/// and one section of INI files.
///
/// ### Example
/// ```
/// # use flagtree_core as flagtree;
/// use flagtree::{Flag, Group, Scalar};
///
/// let mut host = String::default();
/// let mut port: u16 = 0;
/// Group::new("Server Options")
///     .namespace("server")
///     .env_namespace("SERVER")
///     .add(Flag::new(Scalar::new(&mut host)).long("host").env("HOST"))
///     .add(Flag::new(Scalar::new(&mut port)).long("port").env("PORT"));
/// ```
pub struct Group<'a> {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) namespace: Option<String>,
    pub(crate) env_namespace: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) flags: Vec<Flag<'a>>,
    pub(crate) groups: Vec<Group<'a>>,
}

impl<'a> Group<'a> {
    /// Create an option group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            namespace: None,
            env_namespace: None,
            hidden: false,
            flags: Vec::default(),
            groups: Vec::default(),
        }
    }

    /// Document the group.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// Prefix the long names of this group's flags with `namespace.`.
    /// Namespaces of nested groups compose.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace.replace(namespace.into());
        self
    }

    /// Prefix the environment keys of this group's flags with `namespace_`.
    pub fn env_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.env_namespace.replace(namespace.into());
        self
    }

    /// Exclude this group from the help message.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Add a flag to the group.
    pub fn add(mut self, flag: Flag<'a>) -> Self {
        self.flags.push(flag);
        self
    }

    /// Nest a group within this group.
    pub fn group(mut self, group: Group<'a>) -> Self {
        self.groups.push(group);
        self
    }
}

/// A command in the descriptor tree.
/// The root command names the program; nested commands are subcommands selected by name (or alias).
///
/// Flags of a command are visible while parsing the command and all of its descendants.
///
/// ### Example
/// ```
/// # use flagtree_core as flagtree;
/// use flagtree::{Command, Flag, Parser, ParserOptions, Positional, Scalar};
///
/// let mut verbose = false;
/// let mut file = String::default();
///
/// {
///     let root = Command::new("program")
///         .add(Flag::new(Scalar::new(&mut verbose)).short('v'))
///         .command(
///             Command::new("add")
///                 .alias("a")
///                 .description("Add a file")
///                 .positional(Positional::new(Scalar::new(&mut file), "FILE").required()),
///         );
///     let mut parser = Parser::new(root, ParserOptions::default()).unwrap();
///     let remaining = parser.parse_args(["a", "-v", "notes.txt"]).unwrap();
///     assert!(remaining.is_empty());
///     assert_eq!(parser.active_command(), vec!["program", "add"]);
/// }
///
/// assert!(verbose);
/// assert_eq!(file, "notes.txt");
/// ```
pub struct Command<'a> {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) long_description: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) options: Group<'a>,
    pub(crate) positionals: Vec<Positional<'a>>,
    pub(crate) commands: Vec<Command<'a>>,
    pub(crate) subcommands_optional: bool,
    pub(crate) reject_extra_args: bool,
    pub(crate) executor: Option<Executor<'a>>,
}

impl<'a> Command<'a> {
    /// Create a command.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::default(),
            description: None,
            long_description: None,
            title: None,
            options: Group::new(String::default()),
            positionals: Vec::default(),
            commands: Vec::default(),
            subcommands_optional: false,
            reject_extra_args: false,
            executor: None,
        }
    }

    /// Add an alternative name for the command.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Document the command with a one line description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// Document the command in full paragraph format.
    pub fn long_description(mut self, description: impl Into<String>) -> Self {
        self.long_description.replace(description.into());
        self
    }

    /// Name the section holding the flags added directly to the command.
    ///
    /// Defaults to `Application Options` for the root command, and the description (or name) otherwise.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title.replace(title.into());
        self
    }

    /// Add a flag to the command.
    pub fn add(mut self, flag: Flag<'a>) -> Self {
        self.options.flags.push(flag);
        self
    }

    /// Add an option group to the command.
    pub fn group(mut self, group: Group<'a>) -> Self {
        self.options.groups.push(group);
        self
    }

    /// Add a positional argument.
    /// The order of positionals corresponds to their binding order during parsing.
    pub fn positional(mut self, positional: Positional<'a>) -> Self {
        self.positionals.push(positional);
        self
    }

    /// Add a subcommand.
    pub fn command(mut self, command: Command<'a>) -> Self {
        self.commands.push(command);
        self
    }

    /// Allow the command to be used without selecting one of its subcommands.
    pub fn subcommands_optional(mut self) -> Self {
        self.subcommands_optional = true;
        self
    }

    /// Fail with [`ErrorKind::TooManyArgs`](crate::ErrorKind::TooManyArgs) when arguments remain.
    pub fn reject_extra_args(mut self) -> Self {
        self.reject_extra_args = true;
        self
    }

    /// Run `executor` with the remaining arguments when parsing selects this command.
    ///
    /// When the executor runs, parsing returns no remaining arguments.
    pub fn execute(mut self, executor: impl FnMut(&[String]) -> Result<(), Error> + 'a) -> Self {
        self.executor.replace(Box::new(executor));
        self
    }
}
