use std::env;
use std::io::{BufRead, Write};
use std::path::Path;
use std::rc::Rc;

use crate::api::Command;
use crate::completion;
use crate::error::Error;
use crate::ini::{self, IniError};
use crate::model::{Environment, IniOptions, ParserOptions, ProcessEnvironment};
use crate::parser::base::Resolver;
use crate::parser::interface::{ConsoleInterface, ErrorContext, UserInterface};
use crate::parser::man;
use crate::parser::markdown;
use crate::parser::printer::Printer;
use crate::parser::tree::{CommandId, Tree};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Fields hold their defaults, possibly overlaid with INI values.
    Prepared,
    /// A command line has been resolved into the fields.
    Parsed,
}

/// The command line parser.
///
/// Built from a root [`Command`]; parsing writes directly into the variables bound by the command's fields.
/// Every field holds its default value (or its environment variable) as soon as the parser is built.
///
/// ### Example
/// ```
/// # use flagtree_core as flagtree;
/// use flagtree::{Command, Flag, Parser, ParserOptions, Scalar};
///
/// let mut count: u32 = 0;
///
/// {
///     let root = Command::new("program")
///         .add(Flag::new(Scalar::new(&mut count)).short('c').long("count").default("1"));
///     let mut parser = Parser::new(root, ParserOptions::default()).unwrap();
///     let remaining = parser.parse_args(["--count", "3", "extra"]).unwrap();
///     assert_eq!(remaining, vec!["extra"]);
/// }
///
/// assert_eq!(count, 3);
/// ```
pub struct Parser<'a> {
    tree: Tree<'a>,
    options: ParserOptions,
    environment: Box<dyn Environment + 'a>,
    user_interface: Rc<dyn UserInterface>,
    stage: Stage,
    active: CommandId,
}

impl<'a> std::fmt::Debug for Parser<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("program", &self.tree.command(CommandId::ROOT).name)
            .field("options", &self.options)
            .field("stage", &self.stage)
            .finish()
    }
}

impl<'a> Parser<'a> {
    /// Build the parser, validating the descriptor tree and applying defaults from the process environment.
    ///
    /// Fails with [`ErrorKind::Tag`](crate::ErrorKind::Tag) when the tree is malformed,
    /// or [`ErrorKind::Marshal`](crate::ErrorKind::Marshal) when a default cannot be converted.
    pub fn new(root: Command<'a>, options: ParserOptions) -> Result<Self, Error> {
        let mut tree = Tree::build(root, &options)?;
        let environment: Box<dyn Environment + 'a> = Box::new(ProcessEnvironment::default());
        tree.store_defaults(environment.as_ref())?;

        Ok(Self {
            tree,
            options,
            environment,
            user_interface: Rc::new(ConsoleInterface::default()),
            stage: Stage::Prepared,
            active: CommandId::ROOT,
        })
    }

    /// Read environment variables from `environment` instead of the process, and re-apply the defaults.
    ///
    /// ### Example
    /// ```
    /// # use flagtree_core as flagtree;
    /// use flagtree::{Command, Flag, Parser, ParserOptions, Scalar};
    /// use std::collections::HashMap;
    ///
    /// let mut host = String::default();
    ///
    /// {
    ///     let root = Command::new("program")
    ///         .add(Flag::new(Scalar::new(&mut host)).long("host").env("HOST").default("localhost"));
    ///     let environment = HashMap::from([("HOST", "example.org")]);
    ///     let mut parser = Parser::new(root, ParserOptions::default())
    ///         .unwrap()
    ///         .with_environment(environment)
    ///         .unwrap();
    ///     parser.parse_args(Vec::<String>::default()).unwrap();
    /// }
    ///
    /// assert_eq!(host, "example.org");
    /// ```
    pub fn with_environment(mut self, environment: impl Environment + 'a) -> Result<Self, Error> {
        self.environment = Box::new(environment);
        self.tree.store_defaults(self.environment.as_ref())?;
        self.stage = Stage::Prepared;
        Ok(self)
    }

    #[cfg(test)]
    pub(crate) fn with_interface(mut self, user_interface: Rc<dyn UserInterface>) -> Self {
        self.user_interface = user_interface;
        self
    }

    /// Parse the command line arguments of the process (skipping the program name).
    pub fn parse(&mut self) -> Result<Vec<String>, Error> {
        self.parse_args(env::args().skip(1))
    }

    /// Parse `args`, returning the arguments no flag, positional or command consumed.
    ///
    /// Each call starts over from the defaults, except that values loaded by a preceding
    /// [`Parser::parse_ini`] carry over into the next call.
    /// When the selected command has an executor, it is run with the remaining arguments and nothing is returned.
    ///
    /// With [`ParserOptions::print_errors`], failures are also printed; a help request prints the help message.
    pub fn parse_args<I, S>(&mut self, args: I) -> Result<Vec<String>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string())
            .collect();

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Parsing {args:?}.");
        }

        let result = self.run(args.clone());

        if let Err(error) = &result {
            self.report(error, &args);
        }

        result
    }

    fn run(&mut self, args: Vec<String>) -> Result<Vec<String>, Error> {
        if self.stage == Stage::Parsed {
            self.tree.store_defaults(self.environment.as_ref())?;
        }

        self.stage = Stage::Parsed;
        self.active = CommandId::ROOT;
        let outcome = Resolver::new(&mut self.tree, &self.options, args)?.resolve()?;
        self.active = outcome.command;

        match &mut self.tree.command_mut(outcome.command).executor {
            Some(executor) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Executing with {:?}.", outcome.remaining);
                }

                executor(outcome.remaining.as_slice())?;
                Ok(Vec::default())
            }
            None => Ok(outcome.remaining),
        }
    }

    fn report(&self, error: &Error, args: &[String]) {
        if !self.options.print_errors {
            return;
        }

        if error.is_help() {
            self.user_interface.print(error.message().to_string());
            return;
        }

        self.user_interface.print_error(error);

        if let Some(position) = error.position() {
            self.user_interface
                .print_error_context(ErrorContext::new(position, args));
        }
    }

    /// The names of the commands selected by the last parse, starting with the program name.
    pub fn active_command(&self) -> Vec<&str> {
        self.tree.command_path(self.active)
    }

    /// The help message for the active command.
    pub fn help(&self) -> String {
        Printer::new(&self.tree, &self.options, self.active).render()
    }

    /// Write the help message for the active command.
    pub fn write_help(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writeln!(writer, "{}", self.help())
    }

    /// Write a man page covering every command, dated `date` (for example `2 January 2006`).
    pub fn write_man_page(&self, writer: &mut impl Write, date: &str) -> std::io::Result<()> {
        man::write_man_page(&self.tree, writer, date)
    }

    /// Write the same page as [`Parser::write_man_page`], in markdown.
    pub fn write_markdown(&self, writer: &mut impl Write, date: &str) -> std::io::Result<()> {
        markdown::write_markdown(&self.tree, writer, date)
    }

    /// Load INI content into the fields.
    ///
    /// Sections are named after option groups (`[Application Options]`, `[Server]`, `[command.Group]`);
    /// keys before the first section resolve against the root command.
    /// After a completed parse, the fields are reset to their defaults first.
    pub fn parse_ini(&mut self, reader: impl BufRead) -> Result<(), IniError> {
        let ini = ini::read(reader, "<input>")?;
        self.apply_ini(&ini)
    }

    /// Load the INI file at `path` into the fields, as [`Parser::parse_ini`] does.
    pub fn parse_ini_file(&mut self, path: impl AsRef<Path>) -> Result<(), IniError> {
        let ini = ini::read_file(path.as_ref())?;
        self.apply_ini(&ini)
    }

    fn apply_ini(&mut self, ini: &ini::Ini) -> Result<(), IniError> {
        if self.stage == Stage::Parsed {
            self.tree.store_defaults(self.environment.as_ref())?;
            self.stage = Stage::Prepared;
        }

        ini::apply(&mut self.tree, ini, self.options.ignore_unknown)?;
        Ok(())
    }

    /// Write the current values of the fields in INI format.
    pub fn write_ini(&self, writer: &mut impl Write, options: IniOptions) -> std::io::Result<()> {
        ini::write(&self.tree, writer, &options)
    }

    /// Write the current values of the fields to the INI file at `path`.
    pub fn write_ini_file(&self, path: impl AsRef<Path>, options: IniOptions) -> Result<(), IniError> {
        let path = path.as_ref();
        let io_error = |source| IniError::Io {
            file: path.display().to_string(),
            source,
        };
        let mut file = std::fs::File::create(path).map_err(io_error)?;
        self.write_ini(&mut file, options).map_err(io_error)
    }

    /// Completions for the last element of `args`, resolving the elements before it.
    /// The fields are not modified.
    ///
    /// ### Example
    /// ```
    /// # use flagtree_core as flagtree;
    /// use flagtree::{Command, Parser, ParserOptions};
    ///
    /// let root = Command::new("program")
    ///     .command(Command::new("add"))
    ///     .command(Command::new("remove"));
    /// let parser = Parser::new(root, ParserOptions::default()).unwrap();
    ///
    /// assert_eq!(parser.complete(&["re"]), vec!["remove"]);
    /// assert_eq!(parser.complete(&["--he"]), vec!["--help"]);
    /// ```
    pub fn complete(&self, args: &[&str]) -> Vec<String> {
        completion::complete(&self.tree, &self.options, args)
    }
}
