/// Strip a trailing `#` comment and surrounding whitespace
pub fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => line[..idx].trim(),
        None => line.trim()
    }
}

/// Split a line into its first token (the keyword) and the remaining tokens
pub fn split_keyword(line: &str) -> Option<(&str, Vec<&str>)> {
    let mut split = line.split_whitespace();
    let key = split.next()?;

    Some((key, split.collect()))
}
