//! On-disk state for observational memory: paths, atomic writes, cursors

mod cursor;
mod io;
mod paths;
mod tokens;

pub use cursor::{Cursor, CursorPosition, CursorStore};
pub use io::{atomic_write, read_jsonl, read_or_empty};
pub use paths::{Paths, MEMORY_DIR_ENV};
pub use tokens::{char_len, estimate_tokens, DEFAULT_CHARS_PER_TOKEN};
