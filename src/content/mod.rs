//! Content module - posts, front-matter and the sources they are read from

mod error;
mod frontmatter;
mod post;
pub mod source;

pub use error::ContentError;
pub use frontmatter::{parse_date_string, FrontMatter};
pub use post::{read_time, slug_from_source, word_count, ParseOptions, Post};
pub use post::{DEFAULT_CATEGORY, WORDS_PER_MINUTE};
pub use source::{ContentSource, DirectorySource, MemorySource, RawContent};
