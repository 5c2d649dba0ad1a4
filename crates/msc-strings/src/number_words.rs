//! English number words: `numberToText`/`textToNumber`.
//!
//! Same scale words and the same units/teens/tens split as the source
//! this is grounded on, rewritten over plain `&str`/`String` since the
//! original's GC-protected `Value` concatenation chain has no
//! counterpart once this lives outside the heap.

const SINGLES: [&str; 10] = [
    "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];
const TEENS: [&str; 10] = [
    "ten", "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
    "eighteen", "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];
const SCALES: [&str; 3] = ["thousand", "million", "billion"];

fn chunk_to_words(h: u64) -> String {
    debug_assert!(h < 1000);
    let mut words = Vec::new();
    let hundreds = h / 100;
    let rest = h % 100;
    if hundreds > 0 {
        words.push(format!("{} hundred", SINGLES[hundreds as usize]));
    }
    if rest > 0 && rest < 10 {
        words.push(SINGLES[rest as usize].to_string());
    } else if rest >= 10 && rest < 20 {
        words.push(TEENS[(rest - 10) as usize].to_string());
    } else if rest >= 20 {
        let tens_word = TENS[(rest / 10) as usize];
        let ones = rest % 10;
        if ones > 0 {
            words.push(format!("{}-{}", tens_word, SINGLES[ones as usize]));
        } else {
            words.push(tens_word.to_string());
        }
    }
    words.join(" ")
}

/// Renders `n` as English words: `numberToText(-1234) == "negative
/// one thousand two hundred thirty-four"`.
pub fn number_to_text(n: i64) -> String {
    if n == 0 {
        return "zero".to_string();
    }
    let mut magnitude = n.unsigned_abs();
    let mut chunks = Vec::new();
    while magnitude > 0 {
        chunks.push(magnitude % 1000);
        magnitude /= 1000;
    }

    let mut parts = Vec::new();
    for (scale_index, &chunk) in chunks.iter().enumerate().rev() {
        if chunk == 0 {
            continue;
        }
        let mut text = chunk_to_words(chunk);
        if scale_index > 0 {
            text = format!("{} {}", text, SCALES[scale_index - 1]);
        }
        parts.push(text);
    }

    let mut result = parts.join(" ");
    if n < 0 {
        result = format!("negative {result}");
    }
    result
}

/// Parses text produced by [`number_to_text`] back into an integer.
/// Returns `None` for input that isn't recognized number words.
pub fn text_to_number(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("zero") {
        return Some(0);
    }

    let mut words = s.replace('-', " ").split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().into_iter();
    let mut negative = false;
    let mut peeked = words.next();
    if peeked.as_deref() == Some("negative") {
        negative = true;
        peeked = words.next();
    }

    let mut total: i64 = 0;
    let mut current: i64 = 0;
    let mut any = false;
    let mut word = peeked;
    while let Some(w) = word {
        any = true;
        if let Some(scale) = SCALES.iter().position(|s| *s == w) {
            let multiplier = 1000i64.pow(scale as u32 + 1);
            total += current.max(1) * multiplier;
            current = 0;
        } else if w == "hundred" {
            current = current.max(1) * 100;
        } else if let Some(v) = SINGLES.iter().position(|s| *s == w).filter(|&v| v > 0) {
            current += v as i64;
        } else if let Some(v) = TEENS.iter().position(|s| *s == w) {
            current += 10 + v as i64;
        } else if let Some(v) = TENS.iter().position(|s| *s == w).filter(|&v| v > 0) {
            current += (v as i64) * 10;
        } else {
            return None;
        }
        word = words.next();
    }
    if !any {
        return None;
    }
    total += current;
    Some(if negative { -total } else { total })
}
