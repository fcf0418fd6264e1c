//! Parser for `git diff --raw -z` output
//!
//! Each record is a header chunk starting with `:` whose last token is the
//! status (a letter plus an optional similarity score), followed by one path,
//! or two (prior, new) for copies and renames. Chunks are NUL separated.

use std::path::PathBuf;

use refine_core::ModificationKind;

use crate::error::{GitError, Result};

/// One changed path as reported by git.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChange {
    pub kind: ModificationKind,
    /// Similarity percentage for copies and renames, 0 otherwise.
    pub similarity: u8,
    pub path: PathBuf,
    pub prior_path: Option<PathBuf>,
}

pub fn parse_raw_diff(diff: &str) -> Result<Vec<RawChange>> {
    let mut records: Vec<Vec<&str>> = Vec::new();
    for chunk in diff.split('\0').filter(|chunk| !chunk.is_empty()) {
        if chunk.starts_with(':') {
            records.push(Vec::new());
        }
        match records.last_mut() {
            Some(record) => record.push(chunk),
            None => {
                return Err(GitError::MalformedRecord {
                    record: chunk.to_string(),
                });
            }
        }
    }
    records.iter().map(|record| parse_record(record)).collect()
}

fn parse_record(chunks: &[&str]) -> Result<RawChange> {
    let malformed = || GitError::MalformedRecord {
        record: chunks.join("\\0"),
    };

    let status = chunks
        .first()
        .and_then(|header| header.split_whitespace().last())
        .ok_or_else(malformed)?;
    let mut status_chars = status.chars();
    let letter = status_chars.next().ok_or_else(malformed)?;
    let kind = ModificationKind::from_status_letter(letter).ok_or(GitError::UnknownStatus { letter })?;
    let similarity = status_chars.as_str().parse().unwrap_or(0);

    let (path, prior_path) = match chunks {
        [_, prior, new, ..] => (PathBuf::from(*new), Some(PathBuf::from(*prior))),
        [_, path] => (PathBuf::from(*path), None),
        _ => return Err(malformed()),
    };

    Ok(RawChange {
        kind,
        similarity,
        path,
        prior_path,
    })
}
