//! ENS name resolution

mod namehash;
mod resolver;

pub use namehash::{namehash, normalize_name, reverse_name};
pub use resolver::{EnsResolver, ENS_REGISTRY};
