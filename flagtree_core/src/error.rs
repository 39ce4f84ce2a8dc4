use thiserror::Error;

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Any failure without a more specific category (for example, an unreadable include file).
    Unknown,
    /// An option that requires a value was given none.
    ExpectedArgument,
    /// An option name that is not declared in the active scope.
    UnknownFlag,
    /// An INI section that names no option group.
    UnknownGroup,
    /// A value could not be converted to the option's type.
    Marshal,
    /// The help flag was given; the message holds the rendered help.
    Help,
    /// A boolean option was given an inline value.
    NoArgumentForBool,
    /// A required option, argument or subcommand is missing.
    Required,
    /// A short name longer than one character.
    ShortNameTooLong,
    /// The descriptor tree is inconsistent.
    Tag,
    /// Surplus arguments for a command that rejects them.
    TooManyArgs,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Unknown => "unknown",
            ErrorKind::ExpectedArgument => "expected argument",
            ErrorKind::UnknownFlag => "unknown flag",
            ErrorKind::UnknownGroup => "unknown group",
            ErrorKind::Marshal => "marshal",
            ErrorKind::Help => "help",
            ErrorKind::NoArgumentForBool => "no argument for bool",
            ErrorKind::Required => "required",
            ErrorKind::ShortNameTooLong => "short name too long",
            ErrorKind::Tag => "tag",
            ErrorKind::TooManyArgs => "too many args",
        };
        write!(f, "{name}")
    }
}

/// The error produced by configuration, parsing and the callbacks invoked during parsing.
///
/// Its `Display` is exactly the message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    position: Option<usize>,
}

impl Error {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The index of the argument that caused the error, when it came from one.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Whether this error carries the rendered help message.
    pub fn is_help(&self) -> bool {
        self.kind == ErrorKind::Help
    }

    // The innermost position wins.
    pub(crate) fn at(mut self, position: usize) -> Self {
        if self.position.is_none() {
            self.position = Some(position);
        }
        self
    }
}
