pub mod types;
pub use types::{InMemoryPaiolRepository, PaiolRepository};
