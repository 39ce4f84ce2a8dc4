use crate::api::capture::{Capturable, CliPositional, ValueKind};
use crate::constant::DEFAULT_BASE;
use crate::error::{Error, ErrorKind};

pub(crate) type Completer<'a> = Box<dyn Fn(&str) -> Vec<String> + 'a>;

/// What a flag does when it is given.
pub(crate) enum Action<'a> {
    Store(Box<dyn Capturable + 'a>),
    Include,
    Help,
}

impl<'a> Action<'a> {
    pub(crate) fn kind(&self) -> ValueKind {
        match self {
            Action::Store(field) => field.kind(),
            Action::Include => ValueKind::Single,
            Action::Help => ValueKind::Callback { arity: 0 },
        }
    }
}

/// An option parameter: a named flag such as `-v` or `--verbose`.
///
/// ### Example
/// ```
/// # use flagtree_core as flagtree;
/// use flagtree::{Flag, Scalar};
///
/// let mut level: u32 = 0;
/// Flag::new(Scalar::new(&mut level))
///     .short('l')
///     .long("level")
///     .description("The level of detail.")
///     .default("1")
///     .env("LEVEL");
/// ```
pub struct Flag<'a> {
    pub(crate) action: Action<'a>,
    pub(crate) short: Option<char>,
    pub(crate) long: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) value_name: Option<String>,
    pub(crate) defaults: Vec<String>,
    pub(crate) default_mask: Option<String>,
    pub(crate) optional_value: Option<Vec<String>>,
    pub(crate) required: bool,
    pub(crate) terminator: Option<String>,
    pub(crate) base: u32,
    pub(crate) env: Option<String>,
    pub(crate) env_delimiter: Option<String>,
    pub(crate) ini_name: Option<String>,
    pub(crate) no_ini: bool,
    pub(crate) hidden: bool,
    pub(crate) completer: Option<Completer<'a>>,
}

impl<'a> std::fmt::Debug for Flag<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flag")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("kind", &self.action.kind())
            .finish()
    }
}

impl<'a> Flag<'a> {
    /// Create a flag that stores into `field`.
    pub fn new(field: impl Capturable + 'a) -> Self {
        Self::with_action(Action::Store(Box::new(field)))
    }

    /// Create a flag that loads an INI file, named by its value, into the parser mid-parse.
    /// Values from the file are applied at the point the flag appears, so later arguments win.
    ///
    /// ### Example
    /// ```
    /// # use flagtree_core as flagtree;
    /// use flagtree::Flag;
    ///
    /// Flag::include().long("config").value_name("FILE");
    /// ```
    pub fn include() -> Self {
        Self::with_action(Action::Include).no_ini()
    }

    pub(crate) fn help() -> Self {
        Self::with_action(Action::Help).no_ini()
    }

    fn with_action(action: Action<'a>) -> Self {
        Self {
            action,
            short: None,
            long: None,
            description: None,
            value_name: None,
            defaults: Vec::default(),
            default_mask: None,
            optional_value: None,
            required: false,
            terminator: None,
            base: DEFAULT_BASE,
            env: None,
            env_delimiter: None,
            ini_name: None,
            no_ini: false,
            hidden: false,
            completer: None,
        }
    }

    /// The single character name, given as `-c`.
    pub fn short(mut self, name: char) -> Self {
        self.short.replace(name);
        self
    }

    /// The single character name, taken from a string.
    /// Fails with [`ErrorKind::ShortNameTooLong`] when `name` is longer than one character.
    ///
    /// ### Example
    /// ```
    /// # use flagtree_core as flagtree;
    /// use flagtree::{ErrorKind, Flag, Scalar};
    ///
    /// let mut verbose = false;
    /// let error = Flag::new(Scalar::new(&mut verbose))
    ///     .short_name("vv")
    ///     .unwrap_err();
    /// assert_eq!(error.kind(), ErrorKind::ShortNameTooLong);
    /// ```
    pub fn short_name(self, name: &str) -> Result<Self, Error> {
        let mut chars = name.chars();

        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(self.short(c)),
            _ => Err(Error::new(
                ErrorKind::ShortNameTooLong,
                format!("short names can only be 1 character long, not `{name}'"),
            )),
        }
    }

    /// The long name, given as `--name`.
    /// Long names match case-insensitively.
    pub fn long(mut self, name: impl Into<String>) -> Self {
        self.long.replace(name.into());
        self
    }

    /// Document the flag for the help message.
    /// If repeated, only the final message will apply.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// The placeholder shown for the flag's value in the help message.
    pub fn value_name(mut self, name: impl Into<String>) -> Self {
        self.value_name.replace(name.into());
        self
    }

    /// Add a default value, applied at the start of every parse.
    /// Repeat for repeatable fields.
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.defaults.push(value.into());
        self
    }

    /// Replace the default shown in the help message; `"-"` hides it.
    pub fn default_mask(mut self, mask: impl Into<String>) -> Self {
        self.default_mask.replace(mask.into());
        self
    }

    /// Make the flag's argument optional, applying `value` when it is given bare.
    /// Arguments to optional flags can only be given inline (`--name=value`).
    /// Repeat for repeatable fields.
    pub fn optional_value(mut self, value: impl Into<String>) -> Self {
        self.optional_value
            .get_or_insert_with(Vec::default)
            .push(value.into());
        self
    }

    /// Fail the parse when this flag is not given.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Capture every following token up to `terminator` (or the end of the arguments).
    /// Only valid for repeatable fields.
    ///
    /// ### Example
    /// ```
    /// # use flagtree_core as flagtree;
    /// use flagtree::{Collection, Flag};
    ///
    /// let mut command: Vec<String> = Vec::default();
    /// Flag::new(Collection::new(&mut command))
    ///     .long("exec")
    ///     .terminator(";");
    /// ```
    pub fn terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator.replace(terminator.into());
        self
    }

    /// The numeric base for integer values, in `2..=36`.
    pub fn base(mut self, base: u32) -> Self {
        self.base = base;
        self
    }

    /// The environment variable consulted when applying defaults.
    pub fn env(mut self, key: impl Into<String>) -> Self {
        self.env.replace(key.into());
        self
    }

    /// Split the environment variable on `delimiter` for repeatable fields.
    pub fn env_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.env_delimiter.replace(delimiter.into());
        self
    }

    /// The key used for this flag in INI files.
    pub fn ini_name(mut self, name: impl Into<String>) -> Self {
        self.ini_name.replace(name.into());
        self
    }

    /// Exclude this flag from INI files.
    pub fn no_ini(mut self) -> Self {
        self.no_ini = true;
        self
    }

    /// Exclude this flag from the help message and completion.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Complete values for this flag, given the partial value.
    pub fn complete_with(mut self, completer: impl Fn(&str) -> Vec<String> + 'a) -> Self {
        self.completer.replace(Box::new(completer));
        self
    }
}

/// A positional argument parameter, bound by position from non-option tokens.
///
/// A trailing repeatable positional receives every remaining token.
///
/// ### Example
/// ```
/// # use flagtree_core as flagtree;
/// use flagtree::{Collection, Positional};
///
/// let mut files: Vec<String> = Vec::default();
/// Positional::new(Collection::new(&mut files), "FILE")
///     .description("The files to process.")
///     .required();
/// ```
pub struct Positional<'a> {
    pub(crate) field: Box<dyn Capturable + 'a>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) required: bool,
    pub(crate) completer: Option<Completer<'a>>,
}

impl<'a> std::fmt::Debug for Positional<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Positional")
            .field("name", &self.name)
            .field("kind", &self.field.kind())
            .finish()
    }
}

impl<'a> Positional<'a> {
    /// Create a positional argument.
    pub fn new(field: impl Capturable + CliPositional + 'a, name: impl Into<String>) -> Self {
        Self {
            field: Box::new(field),
            name: name.into(),
            description: None,
            required: false,
            completer: None,
        }
    }

    /// Document the argument for the help message.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// Fail the parse when this argument is not given.
    /// A required repeatable argument needs at least one value.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Complete values for this argument, given the partial value.
    pub fn complete_with(mut self, completer: impl Fn(&str) -> Vec<String> + 'a) -> Self {
        self.completer.replace(Box::new(completer));
        self
    }
}
