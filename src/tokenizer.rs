//! Line tokenizer for delimited text
//!
//! Splits a single line into field strings. Double quotes group characters
//! so that delimiters inside them are literal, and a doubled quote inside a
//! quoted run stands for one literal quote. Malformed quoting is never an
//! error: an unterminated quote simply runs to the end of the line.

const QUOTE: char = '"';

/// Split one line (without its trailing newline) into fields
///
/// A line without any delimiter yields one field; a trailing delimiter
/// yields a trailing empty field.
pub fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == QUOTE {
            if in_quotes && chars.peek() == Some(&QUOTE) {
                current.push(QUOTE);
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    fields.push(current);
    fields
}
