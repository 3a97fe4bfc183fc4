//! Menu selection parsing.
//!
//! Menus are numbered from 1. An answer is either `all` or a list of numbers
//! and inclusive ranges separated by whitespace or commas (`1 3 5-7`).
//! Entries that do not parse or fall outside the menu are skipped and
//! reported as warnings; they never abort the selection.

use std::collections::BTreeSet;

/// Parsed answer: zero-based menu indices, ascending and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub indices: Vec<usize>,
    /// One message per skipped entry.
    pub warnings: Vec<String>,
}

impl Selection {
    pub fn all(count: usize) -> Self {
        Self {
            indices: (0..count).collect(),
            warnings: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The selected items of `items`, in menu order.
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Vec<&'a T> {
        self.indices.iter().filter_map(|&i| items.get(i)).collect()
    }
}

/// Parse `input` against a menu of `count` entries.
pub fn parse_selection(input: &str, count: usize) -> Selection {
    if input.trim().eq_ignore_ascii_case("all") {
        return Selection::all(count);
    }

    let mut picked = BTreeSet::new();
    let mut warnings = Vec::new();

    for token in input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        match parse_token(token, count) {
            Ok((first, last)) => picked.extend(first - 1..last),
            Err(message) => {
                tracing::warn!("{message}");
                warnings.push(message);
            }
        }
    }

    Selection {
        indices: picked.into_iter().collect(),
        warnings,
    }
}

/// One token as an inclusive, one-based range.
fn parse_token(token: &str, count: usize) -> Result<(usize, usize), String> {
    let (first, last) = match token.split_once('-') {
        Some((a, b)) => (parse_number(a, token)?, parse_number(b, token)?),
        None => {
            let n = parse_number(token, token)?;
            (n, n)
        }
    };
    if first > last {
        return Err(format!("skipping '{token}': range is reversed"));
    }
    if first == 0 || last > count {
        return Err(format!("skipping '{token}': out of range (1-{count})"));
    }
    Ok((first, last))
}

fn parse_number(text: &str, token: &str) -> Result<usize, String> {
    text.trim()
        .parse::<usize>()
        .map_err(|_| format!("skipping '{token}': not a number"))
}
