//! Arithmetic, comparison, hashing, and stringification over [`Value`].
//!
//! Every operation that might touch heap-resident data accepts a
//! `&dyn HeapView` (or `&mut dyn HeapView` if it may allocate) rather
//! than reaching into a global pool, per the "pass a Runtime handle
//! explicitly" design direction: it keeps `msc-value` free of a
//! dependency on the string/list/map crates and lets tests build
//! independent runtimes.

use std::collections::HashSet;

use crate::heap_view::HeapView;
use crate::value::{Kind, Value};

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn mix_bits(bits: u64) -> u32 {
    let mut x = bits;
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x as u32
}

/// Bit pattern to hash a number by, so `value_hash(make_int(5)) ==
/// value_hash(make_double(5.0))`: both go through `as_number()` as an
/// `f64`, with `-0.0` folded into `0.0` and every NaN folded into one
/// canonical bit pattern, since `f64::to_bits` would otherwise
/// distinguish values that compare equal.
fn canonical_number_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0.0f64.to_bits()
    } else {
        n.to_bits()
    }
}

fn non_zero(hash: u32) -> u32 {
    if hash == 0 {
        1
    } else {
        hash
    }
}

/// Owned byte view of a string `Value` (tiny or heap). Panics if `v` is
/// not a string.
pub fn string_bytes_owned(v: Value, heap: &dyn HeapView) -> Vec<u8> {
    if let Some(bytes) = v.tiny_string_bytes() {
        let len = v.tiny_string_len().unwrap();
        bytes[..len].to_vec()
    } else if let Some(handle) = v.as_heap_string_handle() {
        heap.string_bytes(handle).to_vec()
    } else {
        panic!("string_bytes_owned called on a non-string Value");
    }
}

// ---------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------

fn numeric_add(a: Value, b: Value) -> Value {
    if a.is_int() && b.is_int() {
        match a.as_int().checked_add(b.as_int()) {
            Some(r) => Value::make_int(r),
            None => Value::make_double(a.as_int() as f64 + b.as_int() as f64),
        }
    } else {
        Value::make_double(a.as_number() + b.as_number())
    }
}

fn numeric_sub(a: Value, b: Value) -> Value {
    if a.is_int() && b.is_int() {
        match a.as_int().checked_sub(b.as_int()) {
            Some(r) => Value::make_int(r),
            None => Value::make_double(a.as_int() as f64 - b.as_int() as f64),
        }
    } else {
        Value::make_double(a.as_number() - b.as_number())
    }
}

fn numeric_mult(a: Value, b: Value) -> Value {
    if a.is_int() && b.is_int() {
        match a.as_int().checked_mul(b.as_int()) {
            Some(r) => Value::make_int(r),
            None => Value::make_double(a.as_int() as f64 * b.as_int() as f64),
        }
    } else {
        Value::make_double(a.as_number() * b.as_number())
    }
}

fn numeric_div(a: Value, b: Value) -> Value {
    if a.is_int() && b.is_int() {
        let (ai, bi) = (a.as_int(), b.as_int());
        if bi != 0 && ai % bi == 0 && !(ai == i32::MIN && bi == -1) {
            return Value::make_int(ai / bi);
        }
    }
    Value::make_double(a.as_number() / b.as_number())
}

fn repeat_string(s: Value, count: f64, heap: &mut dyn HeapView) -> Value {
    let count = count.trunc();
    if !count.is_finite() || count <= 0.0 {
        return heap.alloc_string(b"");
    }
    let bytes = string_bytes_owned(s, heap);
    let repeated = bytes.repeat(count as usize);
    heap.alloc_string(&repeated)
}

fn stringify_operand(v: Value, heap: &mut dyn HeapView) -> Vec<u8> {
    if v.is_string() {
        string_bytes_owned(v, heap)
    } else {
        to_string(v, heap).into_bytes()
    }
}

pub fn value_add(a: Value, b: Value, heap: &mut dyn HeapView) -> Value {
    if a.is_number() && b.is_number() {
        numeric_add(a, b)
    } else if a.is_string() || b.is_string() {
        let mut bytes = stringify_operand(a, heap);
        bytes.extend(stringify_operand(b, heap));
        heap.alloc_string(&bytes)
    } else {
        Value::make_null()
    }
}

pub fn value_sub(a: Value, b: Value) -> Value {
    if a.is_number() && b.is_number() {
        numeric_sub(a, b)
    } else {
        Value::make_null()
    }
}

pub fn value_mult(a: Value, b: Value, heap: &mut dyn HeapView) -> Value {
    if a.is_number() && b.is_number() {
        numeric_mult(a, b)
    } else if a.is_string() && b.is_number() {
        repeat_string(a, b.as_number(), heap)
    } else if b.is_string() && a.is_number() {
        repeat_string(b, a.as_number(), heap)
    } else {
        Value::make_null()
    }
}

pub fn value_div(a: Value, b: Value, heap: &mut dyn HeapView) -> Value {
    if a.is_number() && b.is_number() {
        numeric_div(a, b)
    } else if a.is_string() && b.is_number() {
        repeat_string(a, 1.0 / b.as_number(), heap)
    } else {
        Value::make_null()
    }
}

pub fn value_mod(a: Value, b: Value) -> Value {
    if !a.is_number() || !b.is_number() {
        return Value::make_null();
    }
    if a.is_int() && b.is_int() {
        let bi = b.as_int();
        if bi == 0 {
            Value::make_double(f64::NAN)
        } else if bi == -1 {
            Value::make_int(0)
        } else {
            Value::make_int(a.as_int().wrapping_rem(bi))
        }
    } else {
        Value::make_double(a.as_number() % b.as_number())
    }
}

pub fn value_and(a: Value, b: Value) -> Value {
    if a.is_int() && b.is_int() {
        Value::make_int(a.as_int() & b.as_int())
    } else {
        Value::make_null()
    }
}

pub fn value_or(a: Value, b: Value) -> Value {
    if a.is_int() && b.is_int() {
        Value::make_int(a.as_int() | b.as_int())
    } else {
        Value::make_null()
    }
}

pub fn value_xor(a: Value, b: Value) -> Value {
    if a.is_int() && b.is_int() {
        Value::make_int(a.as_int() ^ b.as_int())
    } else {
        Value::make_null()
    }
}

/// Bitwise complement, the one unary bitwise operator in the contract.
pub fn value_unary(a: Value) -> Value {
    if a.is_int() {
        Value::make_int(!a.as_int())
    } else {
        Value::make_null()
    }
}

pub fn value_shl(a: Value, b: Value) -> Value {
    if a.is_int() && b.is_int() {
        Value::make_int(a.as_int().wrapping_shl(b.as_int() as u32 & 31))
    } else {
        Value::make_null()
    }
}

pub fn value_shr(a: Value, b: Value) -> Value {
    if a.is_int() && b.is_int() {
        Value::make_int(a.as_int().wrapping_shr(b.as_int() as u32 & 31))
    } else {
        Value::make_null()
    }
}

// ---------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------

fn comparable(a: Value, b: Value) -> bool {
    (a.is_number() && b.is_number()) || (a.is_string() && b.is_string())
}

pub fn value_equal(a: Value, b: Value, heap: &dyn HeapView) -> bool {
    if a.is_number() && b.is_number() {
        a.as_number() == b.as_number()
    } else if a.is_string() && b.is_string() {
        string_bytes_owned(a, heap) == string_bytes_owned(b, heap)
    } else if a.kind() == b.kind() {
        a.to_bits() == b.to_bits()
    } else {
        false
    }
}

pub fn value_lt(a: Value, b: Value, heap: &dyn HeapView) -> bool {
    if a.is_number() && b.is_number() {
        a.as_number() < b.as_number()
    } else if a.is_string() && b.is_string() {
        string_bytes_owned(a, heap) < string_bytes_owned(b, heap)
    } else {
        false
    }
}

pub fn value_le(a: Value, b: Value, heap: &dyn HeapView) -> bool {
    if a.is_number() && b.is_number() {
        a.as_number() <= b.as_number()
    } else if a.is_string() && b.is_string() {
        string_bytes_owned(a, heap) <= string_bytes_owned(b, heap)
    } else {
        false
    }
}

/// Defined as `¬le` on the comparable domain (numbers, or strings),
/// rather than inheriting the source's apparent `lt`-vs-`gt` mixup.
pub fn value_gt(a: Value, b: Value, heap: &dyn HeapView) -> bool {
    comparable(a, b) && !value_le(a, b, heap)
}

/// Defined as `¬lt` on the comparable domain.
pub fn value_ge(a: Value, b: Value, heap: &dyn HeapView) -> bool {
    comparable(a, b) && !value_lt(a, b, heap)
}

pub fn value_identical(a: Value, b: Value) -> bool {
    a.to_bits() == b.to_bits()
}

// ---------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------

pub fn value_hash(v: Value, heap: &dyn HeapView) -> u32 {
    let mut in_progress = HashSet::new();
    non_zero(value_hash_rec(v, heap, &mut in_progress))
}

fn value_hash_rec(v: Value, heap: &dyn HeapView, in_progress: &mut HashSet<u64>) -> u32 {
    match v.kind() {
        Kind::Null => mix_bits(0),
        Kind::Int | Kind::Double => mix_bits(canonical_number_bits(v.as_number())),
        Kind::TinyString => {
            let len = v.tiny_string_len().unwrap();
            fnv1a(&v.tiny_string_bytes().unwrap()[..len])
        }
        Kind::HeapString => heap.string_hash(v.as_heap_string_handle().unwrap()),
        Kind::List => {
            let key = v.to_bits();
            if !in_progress.insert(key) {
                return 1;
            }
            let handle = v.as_list_handle().unwrap();
            let mut hash = FNV_OFFSET_BASIS;
            for i in 0..heap.list_len(handle) {
                let child = heap.list_get(handle, i);
                hash ^= value_hash_rec(child, heap, in_progress);
                hash = hash.wrapping_mul(FNV_PRIME);
            }
            in_progress.remove(&key);
            hash
        }
        Kind::Map => {
            let key = v.to_bits();
            if !in_progress.insert(key) {
                return 1;
            }
            let handle = v.as_map_handle().unwrap();
            let mut xor_acc = 0u32;
            for slot in 0..heap.map_capacity(handle) {
                if let Some((k, val)) = heap.map_entry(handle, slot) {
                    let mut entry_hash = FNV_OFFSET_BASIS;
                    entry_hash ^= value_hash_rec(k, heap, in_progress);
                    entry_hash = entry_hash.wrapping_mul(FNV_PRIME);
                    entry_hash ^= value_hash_rec(val, heap, in_progress);
                    entry_hash = entry_hash.wrapping_mul(FNV_PRIME);
                    xor_acc ^= entry_hash;
                }
            }
            in_progress.remove(&key);
            let mut hash = FNV_OFFSET_BASIS;
            hash ^= xor_acc;
            hash.wrapping_mul(FNV_PRIME)
        }
    }
}

// ---------------------------------------------------------------------
// Stringification
// ---------------------------------------------------------------------

fn format_double_g(d: f64) -> String {
    if d.is_nan() {
        return "nan".to_string();
    }
    if d.is_infinite() {
        return if d > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let mut s = format!("{d:.6e}");
    if let Some(epos) = s.find('e') {
        let (mantissa, exp) = s.split_at(epos);
        let exp_val: i32 = exp[1..].parse().unwrap_or(0);
        if (-4..6).contains(&exp_val) {
            s = format!("{d}");
            if s.contains('.') {
                while s.ends_with('0') {
                    s.pop();
                }
                if s.ends_with('.') {
                    s.pop();
                }
            }
            return s;
        }
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        return format!("{mantissa}e{exp_val:+03}");
    }
    s
}

/// Display form used for a bare `to_string(v)`: strings render as their
/// own content (no quotes).
pub fn to_string(v: Value, heap: &dyn HeapView) -> String {
    let mut in_progress = HashSet::new();
    to_string_rec(v, heap, false, &mut in_progress)
}

/// Display form used when `v` appears nested inside a list or map
/// (`value_repr`): strings are quoted.
pub fn repr(v: Value, heap: &dyn HeapView) -> String {
    let mut in_progress = HashSet::new();
    to_string_rec(v, heap, true, &mut in_progress)
}

fn to_string_rec(v: Value, heap: &dyn HeapView, quote_strings: bool, in_progress: &mut HashSet<u64>) -> String {
    match v.kind() {
        Kind::Null => "null".to_string(),
        Kind::Int => v.as_int().to_string(),
        Kind::Double => format_double_g(v.as_double()),
        Kind::TinyString | Kind::HeapString => {
            let bytes = string_bytes_owned(v, heap);
            let text = String::from_utf8_lossy(&bytes).into_owned();
            if quote_strings {
                format!("\"{}\"", text.replace('"', "\"\""))
            } else {
                text
            }
        }
        Kind::List => {
            let key = v.to_bits();
            if !in_progress.insert(key) {
                return "[...]".to_string();
            }
            let handle = v.as_list_handle().unwrap();
            let parts: Vec<String> = (0..heap.list_len(handle))
                .map(|i| to_string_rec(heap.list_get(handle, i), heap, true, in_progress))
                .collect();
            in_progress.remove(&key);
            format!("[{}]", parts.join(", "))
        }
        Kind::Map => {
            let key = v.to_bits();
            if !in_progress.insert(key) {
                return "{...}".to_string();
            }
            let handle = v.as_map_handle().unwrap();
            let mut parts = Vec::new();
            for slot in 0..heap.map_capacity(handle) {
                if let Some((k, val)) = heap.map_entry(handle, slot) {
                    parts.push(format!(
                        "{}: {}",
                        to_string_rec(k, heap, true, in_progress),
                        to_string_rec(val, heap, true, in_progress)
                    ));
                }
            }
            in_progress.remove(&key);
            format!("{{{}}}", parts.join(", "))
        }
    }
}

/// Parses a numeric string into `make_int`/`make_double`; `null` for
/// anything else, numbers passed through unchanged.
pub fn to_number(v: Value, heap: &dyn HeapView) -> Value {
    if v.is_number() {
        return v;
    }
    if !v.is_string() {
        return Value::make_null();
    }
    let bytes = string_bytes_owned(v, heap);
    let text = match std::str::from_utf8(&bytes) {
        Ok(t) => t.trim(),
        Err(_) => return Value::make_null(),
    };
    if text.is_empty() {
        return Value::make_null();
    }
    if !text.contains('.') && !text.contains(['e', 'E']) {
        if let Ok(i) = text.parse::<i32>() {
            return Value::make_int(i);
        }
    }
    match text.parse::<f64>() {
        Ok(d) => Value::make_double(d),
        Err(_) => Value::make_null(),
    }
}

/// `null`, numeric zero, and the empty string are falsey; lists and
/// maps are truthy regardless of emptiness. This resolves the open
/// "is_truthy" question: collections signal emptiness through their
/// own length, not through boolean coercion.
pub fn is_truthy(v: Value, heap: &dyn HeapView) -> bool {
    match v.kind() {
        Kind::Null => false,
        Kind::Int => v.as_int() != 0,
        Kind::Double => v.as_double() != 0.0,
        Kind::TinyString => v.tiny_string_len().unwrap() != 0,
        Kind::HeapString => !heap.string_bytes(v.as_heap_string_handle().unwrap()).is_empty(),
        Kind::List | Kind::Map => true,
    }
}
