mod errors;
mod memory;
mod types;

pub use errors::SnippetError;
pub use memory::MemorySnippetStore;
pub use types::{Snippet, SnippetStore};
