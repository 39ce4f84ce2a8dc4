//! Engine module for `flagtree`.
//! See [documentation root](https://docs.rs/flagtree/latest/flagtree/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod completion;
mod constant;
mod error;
mod ini;
mod matcher;
mod model;
mod parser;
#[allow(missing_docs)]
pub mod prelude;

pub use api::*;
pub use completion::complete_filenames;
pub use error::{Error, ErrorKind};
pub use ini::IniError;
pub use model::*;
pub use parser::Parser;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
