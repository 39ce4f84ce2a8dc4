use thiserror::Error;

use crate::error::Error;
use crate::prelude::FlagValue;

/// Marker trait for capturable types that can formulate a positional argument in the Cli.
pub trait CliPositional {}

/// The shape of the values a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[doc(hidden)]
pub enum ValueKind {
    /// Takes no argument; `repeated` fields record every occurrence.
    Boolean { repeated: bool },
    /// Exactly one value, the last occurrence wins.
    Single,
    /// One value per occurrence, accumulated.
    Repeated,
    /// A list of lists; each terminated capture starts a new inner list.
    Nested,
    /// `key:value` pairs.
    Map,
    /// A callback invoked per occurrence, with `arity` arguments (0 or 1).
    Callback { arity: u8 },
}

impl ValueKind {
    pub(crate) fn can_argument(&self) -> bool {
        match self {
            ValueKind::Boolean { .. } => false,
            ValueKind::Callback { arity } => *arity > 0,
            ValueKind::Single | ValueKind::Repeated | ValueKind::Nested | ValueKind::Map => true,
        }
    }

    pub(crate) fn is_boolean(&self) -> bool {
        matches!(self, ValueKind::Boolean { .. })
    }

    pub(crate) fn is_repeatable(&self) -> bool {
        matches!(
            self,
            ValueKind::Boolean { repeated: true }
                | ValueKind::Repeated
                | ValueKind::Nested
                | ValueKind::Map
        )
    }
}

/// Behaviour to capture tokens into a typed field, without exposing the type.
///
/// We use this at the bottom of the descriptor tree so the compiler can maintain each field's type,
/// while the engine works across all of them.
#[doc(hidden)]
pub trait Capturable {
    /// The shape of the values this field accepts.
    fn kind(&self) -> ValueKind;

    /// Capture one occurrence; `None` when the option appeared without a value.
    fn capture(&mut self, token: Option<&str>, base: u32) -> Result<(), InvalidCapture>;

    /// Remove any accumulated values.
    fn clear(&mut self);

    /// Restore the value the field held when it was declared.
    fn reset(&mut self);

    /// Prepare for a terminated capture.
    fn begin_capture(&mut self) {
        self.clear();
    }

    /// The current value as tokens that `capture` would accept.
    fn render(&self, base: u32) -> Vec<String>;

    /// The name of the value type, shown in conversion errors.
    fn type_name(&self) -> String;

    /// Whether a negative number is acceptable as a next-token argument.
    fn is_numeric(&self) -> bool {
        false
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[doc(hidden)]
pub enum InvalidCapture {
    #[error("cannot convert `{token}' to {type_name}: {cause}")]
    InvalidConversion {
        token: String,
        type_name: String,
        cause: String,
    },
    #[error(transparent)]
    Rejected(#[from] Error),
}

pub(crate) fn convert<T: FlagValue>(token: Option<&str>, base: u32) -> Result<T, InvalidCapture> {
    let token = token.unwrap_or_default();
    T::parse_flag(token, base).map_err(|cause| InvalidCapture::InvalidConversion {
        token: token.to_string(),
        type_name: T::type_description(),
        cause,
    })
}
