mod lookup;
mod tokens;

pub(crate) use lookup::*;
pub(crate) use tokens::*;
