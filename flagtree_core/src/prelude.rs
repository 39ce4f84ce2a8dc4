//! Traits which, typically, may be imported without concern: `use flagtree::prelude::*`.

/// Behaviour for multiple (0 to many) items T to be collected together.
// Needs to be imported in order to implement a custom `Collectable`.
pub trait Collectable<T> {
    /// Add a value to this `Collectable`.
    fn add(&mut self, item: T);

    /// Remove every value.
    fn clear(&mut self);

    /// The values, in the order they should be rendered.
    fn values(&self) -> Vec<&T>;
}

/// Behaviour for key/value pairs collected together.
pub trait Mappable<K, V> {
    /// Insert (or replace) the value for `key`.
    fn insert(&mut self, key: K, value: V);

    /// Remove every entry.
    fn clear(&mut self);

    /// The entries, in any order.
    fn entries(&self) -> Vec<(&K, &V)>;
}

/// Conversion between a command line token and a typed value.
///
/// Implemented for the integer, float, `bool`, `char`, `String`, `PathBuf` and `Duration` types.
/// Implement it to accept a custom type:
/// ```
/// use flagtree_core::prelude::FlagValue;
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Colour {
///     Red,
///     Blue,
/// }
///
/// impl FlagValue for Colour {
///     fn parse_flag(token: &str, _base: u32) -> Result<Self, String> {
///         match token {
///             "red" => Ok(Colour::Red),
///             "blue" => Ok(Colour::Blue),
///             _ => Err(format!("unknown colour `{token}'")),
///         }
///     }
///
///     fn format_flag(&self, _base: u32) -> String {
///         match self {
///             Colour::Red => "red".to_string(),
///             Colour::Blue => "blue".to_string(),
///         }
///     }
/// }
///
/// assert_eq!(Colour::parse_flag("red", 10), Ok(Colour::Red));
/// ```
pub trait FlagValue: Sized {
    /// Parse a token; `base` is the numeric base declared on the option.
    fn parse_flag(token: &str, base: u32) -> Result<Self, String>;

    /// Render the value so that `parse_flag` reproduces it.
    fn format_flag(&self, base: u32) -> String;

    /// The name shown in conversion errors.
    fn type_description() -> String {
        let name = std::any::type_name::<Self>();
        name.rsplit("::").next().unwrap_or(name).to_string()
    }

    /// Boolean values form flags that take no argument.
    fn is_boolean() -> bool {
        false
    }

    /// Numeric values may take a negative number (`-1`) as their next-token argument.
    fn is_numeric() -> bool {
        false
    }
}
