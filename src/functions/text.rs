//! Line and word lookups over plain text sources
//!
//! Indices are 1-based; an out-of-range index is an error, never an empty
//! string, so a bad expected answer can't masquerade as a blank one.

use super::{expect_args, parse_index, read_source};
use crate::error::{ResolveError, ResolveResult};

/// `file_line:N:path` — the Nth line (1-indexed)
pub fn file_line(name: &str, args: &[String]) -> ResolveResult<String> {
    expect_args(name, args, 2)?;
    let line_no = one_indexed(name, &args[0], "line number")?;
    let content = read_source(name, &args[1])?;
    let lines: Vec<&str> = content.lines().collect();
    lines
        .get(line_no - 1)
        .map(|line| line.to_string())
        .ok_or_else(|| ResolveError::NotFound {
            function: name.to_string(),
            missing: format!("line {line_no}"),
            container: format!("{} ({} lines)", args[1], lines.len()),
        })
}

/// `file_word:N:path` — the Nth whitespace-separated word (1-indexed)
pub fn file_word(name: &str, args: &[String]) -> ResolveResult<String> {
    expect_args(name, args, 2)?;
    let word_no = one_indexed(name, &args[0], "word number")?;
    let content = read_source(name, &args[1])?;
    let words: Vec<&str> = content.split_whitespace().collect();
    words
        .get(word_no - 1)
        .map(|word| word.to_string())
        .ok_or_else(|| ResolveError::NotFound {
            function: name.to_string(),
            missing: format!("word {word_no}"),
            container: format!("{} ({} words)", args[1], words.len()),
        })
}

/// `line_count:path`
pub fn line_count(name: &str, args: &[String]) -> ResolveResult<String> {
    expect_args(name, args, 1)?;
    let content = read_source(name, &args[0])?;
    Ok(content.lines().count().to_string())
}

/// `word_count:path`
pub fn word_count(name: &str, args: &[String]) -> ResolveResult<String> {
    expect_args(name, args, 1)?;
    let content = read_source(name, &args[0])?;
    Ok(content.split_whitespace().count().to_string())
}

fn one_indexed(name: &str, raw: &str, what: &str) -> ResolveResult<usize> {
    let index = parse_index(name, raw, what)?;
    if index == 0 {
        return Err(ResolveError::Argument {
            function: name.to_string(),
            reason: format!("{what} is 1-indexed"),
        });
    }
    Ok(index)
}
