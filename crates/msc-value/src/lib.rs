//! msc-value - the NaN-boxed dynamic `Value` representation.
//!
//! Construction and type tests live entirely here and need no heap
//! access. Operations that may read or allocate heap data (string
//! concatenation, list/map hashing, display) take a `&dyn HeapView` so
//! this crate has no dependency on the string, list, or map crates that
//! implement it; see [`heap_view::HeapView`].

mod heap_view;
mod ops;
mod value;

pub use heap_view::HeapView;
pub use ops::{
    is_truthy, repr, string_bytes_owned, to_number, to_string, value_add, value_and, value_div,
    value_equal, value_ge, value_gt, value_hash, value_le, value_lt, value_mod, value_mult,
    value_or, value_shl, value_shr, value_sub, value_unary, value_xor, value_identical,
};
pub use value::{Kind, Value, TINY_STRING_MAX_LEN};

pub use msc_gc::Handle;
