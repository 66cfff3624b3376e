pub mod batcher;
pub(crate) mod delivery;
pub mod engine;
pub mod entry;
pub mod matcher;
pub mod mime;
pub mod query;
pub mod traversal;
pub mod types;
pub mod visited;
mod worker;

pub use engine::*;
pub use matcher::{Matcher, NameMimeMatcher};
pub use mime::MimeFilter;
pub use query::{Query, QuerySnapshot};
pub use types::*;
