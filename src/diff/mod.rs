pub mod filter;
pub mod language;
pub mod parser;

pub use filter::ExcludeFilter;
pub use language::detect_language;
pub use parser::{commentable_lines, parse_patch, DiffLine, Hunk, LineKind};
