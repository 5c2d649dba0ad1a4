//! Line splitting and tokenization.
//!
//! The source this is grounded on tokenizes with a plain `strtok` over
//! `" \t,"`, which would shred a `"..."` string literal containing a
//! space into several tokens. Since string constants with embedded
//! spaces are an explicit operand kind here, tokenization is
//! quote-aware instead: a `"..."` run is always one token regardless
//! of what it contains.

use crate::error::{AsmError, AsmResult};

/// Truncates `line` at the first `#` or `;` that is not inside a
/// string literal, then trims surrounding whitespace.
pub fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' | ';' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Splits an already comment-stripped line into whitespace/comma
/// separated tokens, keeping `"..."` runs intact.
pub fn tokenize(line_no: usize, line: &str) -> AsmResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        if ch == '"' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            let mut literal = String::from("\"");
            let mut closed = false;
            for c2 in chars.by_ref() {
                literal.push(c2);
                if c2 == '"' {
                    closed = true;
                    break;
                }
            }
            if !closed {
                return Err(AsmError::UnterminatedString {
                    line: line_no,
                    text: line.to_string(),
                });
            }
            tokens.push(literal);
        } else if ch.is_whitespace() || ch == ',' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}
