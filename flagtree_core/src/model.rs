use std::collections::HashMap;

use crate::constant::DEFAULT_HELP_WIDTH;

/// The syntax used to spell options on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionStyle {
    /// `-v`, `--verbose`, `--name=value`.
    #[default]
    Posix,
    /// Accepts everything [`OptionStyle::Posix`] does, plus `/v`, `/verbose` and `/name:value`.
    Windows,
}

/// Behaviour switches for a [`Parser`](crate::Parser).
///
/// The default enables the built-in help flag, error printing and double dash pass-through.
/// ```
/// use flagtree_core::ParserOptions;
///
/// let options = ParserOptions::none()
///     .help_flag(true)
///     .ignore_unknown(true);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    pub(crate) help_flag: bool,
    pub(crate) pass_double_dash: bool,
    pub(crate) ignore_unknown: bool,
    pub(crate) print_errors: bool,
    pub(crate) pass_after_non_option: bool,
    pub(crate) style: OptionStyle,
    pub(crate) help_width: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            help_flag: true,
            pass_double_dash: true,
            ignore_unknown: false,
            print_errors: true,
            pass_after_non_option: false,
            style: OptionStyle::Posix,
            help_width: DEFAULT_HELP_WIDTH,
        }
    }
}

impl ParserOptions {
    /// Options with every behaviour switched off.
    pub fn none() -> Self {
        Self {
            help_flag: false,
            pass_double_dash: false,
            ignore_unknown: false,
            print_errors: false,
            pass_after_non_option: false,
            style: OptionStyle::Posix,
            help_width: DEFAULT_HELP_WIDTH,
        }
    }

    /// Add the built-in `-h`/`--help` flag (and `/?` under [`OptionStyle::Windows`]).
    pub fn help_flag(mut self, enabled: bool) -> Self {
        self.help_flag = enabled;
        self
    }

    /// Treat everything after `--` as a remaining argument.
    pub fn pass_double_dash(mut self, enabled: bool) -> Self {
        self.pass_double_dash = enabled;
        self
    }

    /// Return unknown options in the remaining arguments instead of failing.
    pub fn ignore_unknown(mut self, enabled: bool) -> Self {
        self.ignore_unknown = enabled;
        self
    }

    /// Print errors (and help) through the console when parsing fails.
    pub fn print_errors(mut self, enabled: bool) -> Self {
        self.print_errors = enabled;
        self
    }

    /// Stop option processing at the first argument that is neither an option nor a command.
    pub fn pass_after_non_option(mut self, enabled: bool) -> Self {
        self.pass_after_non_option = enabled;
        self
    }

    /// Select the option syntax.
    pub fn style(mut self, style: OptionStyle) -> Self {
        self.style = style;
        self
    }

    /// The column width used to wrap the help message.
    pub fn help_width(mut self, width: usize) -> Self {
        self.help_width = width;
        self
    }
}

/// Switches for [`Parser::write_ini`](crate::Parser::write_ini).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IniOptions {
    pub(crate) include_defaults: bool,
    pub(crate) include_comments: bool,
    pub(crate) comment_defaults: bool,
}

impl Default for IniOptions {
    fn default() -> Self {
        Self {
            include_defaults: false,
            include_comments: true,
            comment_defaults: false,
        }
    }
}

impl IniOptions {
    /// Options with every switch off.
    pub fn none() -> Self {
        Self {
            include_defaults: false,
            include_comments: false,
            comment_defaults: false,
        }
    }

    /// Write options whose value equals their default.
    pub fn include_defaults(mut self, enabled: bool) -> Self {
        self.include_defaults = enabled;
        self
    }

    /// Write option descriptions as `;` comments.
    pub fn include_comments(mut self, enabled: bool) -> Self {
        self.include_comments = enabled;
        self
    }

    /// Write default-valued options commented out.
    /// Implies [`IniOptions::include_defaults`].
    pub fn comment_defaults(mut self, enabled: bool) -> Self {
        self.comment_defaults = enabled;
        if enabled {
            self.include_defaults = true;
        }
        self
    }
}

/// Source of environment variables consulted when applying defaults.
pub trait Environment {
    /// Look up a variable, `None` when it is absent.
    fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Environment for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| value.to_string())
    }
}
