//! Input validation utilities
//!
//! Username and line-length rules shared by the server and the client.

/// A username is 1..=`max_len` ASCII alphanumeric characters.
pub fn is_valid_name(name: &str, max_len: usize) -> bool {
    !name.is_empty() && name.len() <= max_len && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Strip the line terminator (`\n` or `\r\n`) from a received line.
pub fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}
