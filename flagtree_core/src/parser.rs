mod base;
mod interface;
mod man;
mod markdown;
mod middleware;
mod printer;
mod suggest;
mod tree;

pub use self::middleware::Parser;
pub(crate) use self::tree::{CommandId, FlagId, GroupId, Tree};
