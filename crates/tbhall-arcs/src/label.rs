//! Configuration labels with natural ordering.
//!
//! Labels such as `N8`, `N12` and `N32` name cluster sizes. Comparing them
//! as plain strings would put `N12` before `N8`; [`ArcLabel`] orders digit
//! runs numerically so collections iterate in the order a reader expects.

use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    Number(u64),
    Text(String),
}

/// Alphanumeric configuration identifier extracted from a data file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcLabel {
    raw: String,
    key: Vec<Chunk>,
}

impl ArcLabel {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let key = chunks(&raw);
        Self { raw, key }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn chunks(raw: &str) -> Vec<Chunk> {
    let mut out = Vec::new();
    let mut digits = String::new();
    let mut text = String::new();

    for c in raw.chars() {
        if c.is_ascii_digit() {
            if !text.is_empty() {
                out.push(Chunk::Text(std::mem::take(&mut text)));
            }
            digits.push(c);
        } else {
            if !digits.is_empty() {
                out.push(number_chunk(std::mem::take(&mut digits)));
            }
            text.push(c);
        }
    }
    if !text.is_empty() {
        out.push(Chunk::Text(text));
    }
    if !digits.is_empty() {
        out.push(number_chunk(digits));
    }
    out
}

fn number_chunk(digits: String) -> Chunk {
    // Digit runs longer than u64 fall back to text comparison.
    match digits.parse::<u64>() {
        Ok(n) => Chunk::Number(n),
        Err(_) => Chunk::Text(digits),
    }
}

impl Ord for ArcLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for ArcLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ArcLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.raw)
    }
}

impl From<String> for ArcLabel {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for ArcLabel {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
