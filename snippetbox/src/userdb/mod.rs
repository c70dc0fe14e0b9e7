mod errors;
mod memory;
mod types;

pub use errors::UserError;
pub use memory::MemoryUserStore;
pub use types::{User, UserStore};
