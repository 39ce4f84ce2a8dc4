//! `flagtree` is a command line option parser for Rust, built around an explicit tree of commands, groups and flags.
//!
//! The parser follows the conventions of the classic `getopt` family:
//! * *Posix style options*:
//! short flags (`-v`), short clusters (`-vfx`), attached values (`-ovalue`, `-o=value`), long flags (`--name value`, `--name=value`).
//! Windows style (`/v`, `/name:value`) is available via [`OptionStyle::Windows`].
//! * *Typed fields*:
//! every flag and positional writes into a variable you own, through a field such as [`Scalar`] or [`Collection`].
//! Conversion is driven by the [`FlagValue`](./prelude/trait.FlagValue.html) trait, with integer bases, durations and custom types.
//! * *Scoped sub-commands*:
//! flags of a command stay visible while parsing its sub-commands, so `prog -v sub -x` and `prog sub -v -x` are equivalent.
//! * *Layered configuration*:
//! defaults, environment variables, INI files and command line arguments apply in that order, with the last write winning.
//!
//! # Usage
//! ```
//! use flagtree::{Collection, Command, Flag, Parser, ParserOptions, Positional, Scalar};
//!
//! let mut verbose = false;
//! let mut name = String::default();
//! let mut files: Vec<String> = Vec::default();
//!
//! {
//!     let root = Command::new("greeter")
//!         .description("Greets people")
//!         .add(Flag::new(Scalar::new(&mut verbose)).short('v').long("verbose").description("Be loud"))
//!         .add(
//!             Flag::new(Scalar::new(&mut name))
//!                 .short('n')
//!                 .long("name")
//!                 .value_name("NAME")
//!                 .default("world")
//!                 .env("GREETER_NAME")
//!                 .description("Who to greet"),
//!         )
//!         .positional(Positional::new(Collection::new(&mut files), "FILES"));
//!     let mut parser = Parser::new(root, ParserOptions::default()).unwrap();
//!     let remaining = parser.parse_args(["-vn", "Ada", "a.txt", "b.txt"]).unwrap();
//!     assert!(remaining.is_empty());
//! }
//!
//! assert!(verbose);
//! assert_eq!(name, "Ada");
//! assert_eq!(files, vec!["a.txt", "b.txt"]);
//! ```
//!
//! The generated help (`greeter -h`):
//! ```console
//! Usage:
//!   greeter [OPTIONS] [FILES...]
//!
//! Application Options:
//!   -v, --verbose    Be loud
//!   -n, --name=NAME  Who to greet (default: world) [$GREETER_NAME]
//!
//! Help Options:
//!   -h, --help       Show this help message
//! ```
//!
//! # Descriptor tree
//! A program is described by a root [`Command`].
//! * [`Flag`]: a named option, with a short name, a long name, or both.
//! Flags carry defaults, an environment variable, an optional value, a terminator, and help/INI metadata.
//! * [`Positional`]: a named argument bound by position.
//! A positional over a [`Collection`] must come last, and captures every remaining argument.
//! * [`Group`]: a titled section of flags, optionally namespacing the long names (`--server.host`) and environment variables (`SERVER_HOST`).
//! * [`Command`]: a sub-command, selected by name or alias, with its own flags, positionals and sub-commands.
//! A command may run an executor once it is selected.
//!
//! ### Fields
//! * [`Scalar`]: a single value; the last occurrence wins. Over `bool`, the flag takes no argument.
//! * [`Switch`]: takes no argument, and stores a fixed target value.
//! * [`Optional`]: a single value into an `Option<T>`.
//! * [`Collection`]: one value per occurrence, into any [Collectable](./prelude/trait.Collectable.html) (`Vec`, `VecDeque`, `HashSet`, `BTreeSet`).
//! * [`Nested`]: a list of lists, for terminated flags (`-x a b ; -x c`).
//! * [`Mapping`]: `key:value` pairs, into any [Mappable](./prelude/trait.Mappable.html) (`HashMap`, `BTreeMap`).
//! * [`Callback`] and [`Handler`]: run a function for each occurrence, without or with a value.
//!
//! # Errors
//! Parsing fails with an [`Error`] carrying an [`ErrorKind`] and the position of the offending argument.
//! A help request is reported as [`ErrorKind::Help`], with the rendered help as its message.
//!
//! ```
//! use flagtree::{Command, ErrorKind, Flag, Parser, ParserOptions, Scalar};
//!
//! let mut count: u8 = 0;
//! let root = Command::new("program").add(Flag::new(Scalar::new(&mut count)).short('c'));
//! let mut parser = Parser::new(root, ParserOptions::none()).unwrap();
//!
//! let error = parser.parse_args(["-c", "300"]).unwrap_err();
//! assert_eq!(error.kind(), ErrorKind::Marshal);
//! assert_eq!(error.position(), Some(1));
//! ```
//!
//! # INI files
//! [`Parser::parse_ini`] and [`Parser::write_ini`] read and write the same flags in INI format, one section per group.
//! A flag created with [`Flag::include`] loads an INI file named on the command line, in the middle of parsing.
//!
//! # Completion
//! [`Parser::complete`] returns the completions for a partial command line, without modifying any field.

pub use flagtree_core::*;
