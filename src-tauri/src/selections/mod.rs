pub mod aliases;
pub mod store;

pub use aliases::{default_aliases, load_aliases, AliasConfig};
pub use store::{SelectionEntry, SelectionStore};
