//! Playlist item selection parsing ("1,3,5", "2-4", "all")

use crate::error::SelectionError;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSelection {
    /// No explicit selection; every item is wanted
    All,
    /// Sorted, deduplicated 1-based indices. Empty means nothing was selected.
    Explicit(Vec<usize>),
}

impl ItemSelection {
    pub fn is_empty(&self) -> bool {
        matches!(self, ItemSelection::Explicit(items) if items.is_empty())
    }

    /// Value for `--playlist-items`, or `None` when everything is wanted.
    pub fn playlist_items(&self) -> Option<String> {
        match self {
            ItemSelection::All => None,
            ItemSelection::Explicit(_) => Some(self.to_string()),
        }
    }
}

impl fmt::Display for ItemSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemSelection::All => write!(f, "all"),
            ItemSelection::Explicit(items) => {
                let joined: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", joined.join(","))
            }
        }
    }
}

/// Upper bound used when the number of items is not known. Every valid index
/// is materialised, so the bound must stay small.
pub const UNKNOWN_COUNT_LIMIT: usize = 9999;

/// Outcome of a parse: what survived plus every rejected token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub items: ItemSelection,
    pub problems: Vec<SelectionError>,
}

/// Parse a selection against `1..=max_items`. Bad tokens are collected in
/// `problems` and skipped; they never abort the rest of the parse.
pub fn parse_selection(input: &str, max_items: usize) -> Selection {
    let input = input.trim().to_lowercase();
    if input == "all" {
        return Selection {
            items: ItemSelection::All,
            problems: Vec::new(),
        };
    }

    let mut selected = BTreeSet::new();
    let mut problems = Vec::new();
    let upper = i64::try_from(max_items).unwrap_or(i64::MAX);

    for part in input.split(',') {
        let part = part.trim();
        if part.contains('-') {
            match parse_range(part) {
                Some((start, end)) if 1 <= start && start <= end && end <= upper => {
                    selected.extend(start as usize..=end as usize);
                }
                Some(_) => problems.push(SelectionError::RangeOutOfBounds {
                    range: part.to_string(),
                    max: max_items,
                }),
                None => problems.push(SelectionError::MalformedRange(part.to_string())),
            }
        } else {
            match part.parse::<i64>() {
                Ok(idx) if 1 <= idx && idx <= upper => {
                    selected.insert(idx as usize);
                }
                Ok(idx) => problems.push(SelectionError::OutOfBounds {
                    index: idx,
                    max: max_items,
                }),
                Err(_) => problems.push(SelectionError::MalformedNumber(part.to_string())),
            }
        }
    }

    Selection {
        items: ItemSelection::Explicit(selected.into_iter().collect()),
        problems,
    }
}

fn parse_range(part: &str) -> Option<(i64, i64)> {
    let mut pieces = part.split('-');
    let start = pieces.next()?.trim().parse().ok()?;
    let end = pieces.next()?.trim().parse().ok()?;
    if pieces.next().is_some() {
        return None;
    }
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_unconstrained() {
        for input in ["all", "ALL", "  All "] {
            let sel = parse_selection(input, 3);
            assert_eq!(sel.items, ItemSelection::All);
            assert_eq!(sel.items.playlist_items(), None);
            assert!(sel.problems.is_empty());
        }
    }

    #[test]
    fn test_dedup_and_sort() {
        let sel = parse_selection("3,1,3,2", 5);
        assert_eq!(sel.items.to_string(), "1,2,3");
        assert!(sel.problems.is_empty());
    }

    #[test]
    fn test_range() {
        let sel = parse_selection("2-4", 5);
        assert_eq!(sel.items, ItemSelection::Explicit(vec![2, 3, 4]));
        assert_eq!(sel.items.playlist_items().as_deref(), Some("2,3,4"));
    }

    #[test]
    fn test_out_of_bounds() {
        let sel = parse_selection("9", 5);
        assert_eq!(sel.items.to_string(), "");
        assert!(sel.items.is_empty());
        assert_eq!(
            sel.problems,
            vec![SelectionError::OutOfBounds { index: 9, max: 5 }]
        );
    }

    #[test]
    fn test_not_a_number() {
        let sel = parse_selection("abc", 5);
        assert_eq!(sel.items.to_string(), "");
        assert_eq!(
            sel.problems,
            vec![SelectionError::MalformedNumber("abc".to_string())]
        );
    }

    #[test]
    fn test_bad_tokens_do_not_abort() {
        let sel = parse_selection("1, x, 4-2, 2-3, 1-2-3, 0, 7", 5);
        assert_eq!(sel.items.to_string(), "1,2,3");
        assert_eq!(sel.problems.len(), 5);
        assert!(matches!(sel.problems[0], SelectionError::MalformedNumber(_)));
        assert!(matches!(sel.problems[1], SelectionError::RangeOutOfBounds { .. }));
        assert!(matches!(sel.problems[2], SelectionError::MalformedRange(_)));
        assert!(matches!(sel.problems[3], SelectionError::OutOfBounds { index: 0, .. }));
        assert!(matches!(sel.problems[4], SelectionError::OutOfBounds { index: 7, .. }));
    }

    #[test]
    fn test_empty_is_not_all() {
        let sel = parse_selection("", 5);
        assert_ne!(sel.items, ItemSelection::All);
        assert!(sel.items.is_empty());
    }

    #[test]
    fn test_unknown_item_count() {
        let sel = parse_selection("7,2-3", UNKNOWN_COUNT_LIMIT);
        assert_eq!(sel.items.to_string(), "2,3,7");
        assert!(sel.problems.is_empty());
    }

    #[test]
    fn test_huge_range_with_unknown_count_is_rejected() {
        let sel = parse_selection("1-10000000000, 2", UNKNOWN_COUNT_LIMIT);
        assert_eq!(sel.items, ItemSelection::Explicit(vec![2]));
        assert_eq!(
            sel.problems,
            vec![SelectionError::RangeOutOfBounds {
                range: "1-10000000000".to_string(),
                max: UNKNOWN_COUNT_LIMIT,
            }]
        );

        let sel = parse_selection("1-9999", UNKNOWN_COUNT_LIMIT);
        assert!(matches!(sel.items, ItemSelection::Explicit(ref v) if v.len() == 9999));
    }
}
