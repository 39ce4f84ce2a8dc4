mod capture;
mod convert;
mod core;
mod field;
mod parameter;

pub use self::core::*;
pub use capture::*;
pub use field::*;
pub use parameter::*;
