//! Heap string storage and the FNV-1a interning pool.
//!
//! [`StringStorage`] holds raw UTF-8 bytes with lazily cached character
//! length and hash; it is the object a GC heap slot or a pool slot
//! ultimately owns. [`StringPool`] deduplicates short, frequently
//! repeated strings (identifiers, map keys, literals) so equal content
//! collapses to one allocation.

mod error;
mod levenshtein;
mod number_words;
mod pool;
mod storage;

pub use error::{StringsError, StringsResult};
pub use levenshtein::edit_distance;
pub use number_words::{number_to_text, text_to_number};
pub use pool::StringPool;
pub use storage::{fnv1a, is_null_or_whitespace, StringStorage};
