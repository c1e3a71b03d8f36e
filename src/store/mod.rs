pub mod name_cache;
pub mod session;

pub use name_cache::{CachedName, NameCache};
pub use session::SessionStore;
