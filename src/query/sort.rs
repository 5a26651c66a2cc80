use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::{Employee, Field};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" | "up" => Ok(SortDirection::Asc),
            "desc" | "descending" | "down" => Ok(SortDirection::Desc),
            other => Err(format!("invalid sort order '{other}', expected asc or desc")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub key: Field,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: Field::HiringTestId,
            direction: SortDirection::Asc,
        }
    }
}

impl SortState {
    /// Same key flips the direction, a new key starts ascending.
    pub fn toggle(self, key: Field) -> Self {
        if self.key == key {
            Self {
                key,
                direction: self.direction.flip(),
            }
        } else {
            Self {
                key,
                direction: SortDirection::Asc,
            }
        }
    }

    pub fn indicator(&self, key: Field) -> &'static str {
        if self.key == key {
            self.direction.arrow()
        } else {
            ""
        }
    }
}

/// Stable sort by one field. Missing values go last in either direction.
pub fn sort(records: &[Employee], key: Field, direction: SortDirection) -> Vec<Employee> {
    let mut out = records.to_vec();
    out.sort_by(|a, b| compare_by(a, b, key, direction));
    out
}

pub fn compare_by(a: &Employee, b: &Employee, key: Field, direction: SortDirection) -> Ordering {
    match (a.get(key), b.get(key)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => match direction {
            SortDirection::Asc => natural_cmp(x, y),
            SortDirection::Desc => natural_cmp(y, x),
        },
    }
}

/// Case-insensitive comparison that orders embedded digit runs by value,
/// so `T2 < T10`. Case (lowercase first) and leading zeros only break ties.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    compare_folded(a, b).then_with(|| compare_exact(a, b))
}

fn compare_folded(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    loop {
        let (x, y) = match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => (x, y),
        };
        if x.is_ascii_digit() && y.is_ascii_digit() {
            let l = take_digits(&mut left);
            let r = take_digits(&mut right);
            let ord = compare_digit_runs(&l, &r);
            if ord != Ordering::Equal {
                return ord;
            }
            continue;
        }
        let ord = fold(x).cmp(&fold(y));
        if ord != Ordering::Equal {
            return ord;
        }
        left.next();
        right.next();
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

fn compare_digit_runs(l: &str, r: &str) -> Ordering {
    let l = l.trim_start_matches('0');
    let r = r.trim_start_matches('0');
    l.len().cmp(&r.len()).then_with(|| l.cmp(r))
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn compare_exact(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        if fold(x) == fold(y) {
            return if x.is_lowercase() {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        return x.cmp(&y);
    }
    a.chars().count().cmp(&b.chars().count())
}
