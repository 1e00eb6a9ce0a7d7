// Dictionary module - the tables the resolver reads and the loader that fills them

mod expander;
mod loader;
mod store;

pub use expander::{ExpansionResult, RegexExpander};
pub use loader::{load, load_str, BlockType, LoadError, SECTION_MARKER};
pub use store::{
    Dictionary, DictionaryError, IgnoreRegexEntry, RegexEntry, SharedDictionary, WordEntry,
};
