use distance::levenshtein;

use crate::model::{Employee, Field};

/// Moderately permissive: tolerates a typo in every four query characters.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Fields consulted by the fuzzy search.
pub const SEARCH_FIELDS: [Field; 5] = [
    Field::HiringTestId,
    Field::FirstName,
    Field::LastName,
    Field::City,
    Field::Country,
];

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredEmployee {
    pub employee: Employee,
    /// 0.0 is an exact (substring) hit, 1.0 is unrelated.
    pub score: f64,
    pub field: Field,
}

/// Approximate multi-field matcher.
///
/// A field's score is the smallest Levenshtein distance between the query and
/// any window of the field that is one character shorter, equal, or one
/// longer than the query, divided by the query length. Comparison is
/// case-insensitive. A record matches when its best field score is at or
/// below the threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl FuzzyMatcher {
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_nan() {
            DEFAULT_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn score(&self, query: &str, candidate: &str) -> f64 {
        let query: Vec<char> = query.trim().chars().flat_map(char::to_lowercase).collect();
        let candidate: Vec<char> = candidate
            .trim()
            .chars()
            .flat_map(char::to_lowercase)
            .collect();
        window_score(&query, &candidate)
    }

    /// Best field score for a record, or `None` if no searchable field is set.
    pub fn score_record(&self, query: &str, employee: &Employee) -> Option<(f64, Field)> {
        let mut best: Option<(f64, Field)> = None;
        for field in SEARCH_FIELDS {
            let Some(value) = employee.get(field) else {
                continue;
            };
            let score = self.score(query, value);
            if best.map(|(s, _)| score < s).unwrap_or(true) {
                best = Some((score, field));
            }
            if score == 0.0 {
                break;
            }
        }
        best
    }

    /// Matches with their scores, best first; ties keep input order.
    pub fn rank(&self, records: &[Employee], query: &str) -> Vec<ScoredEmployee> {
        let mut hits: Vec<ScoredEmployee> = records
            .iter()
            .filter_map(|employee| {
                let (score, field) = self.score_record(query, employee)?;
                (score <= self.threshold).then(|| ScoredEmployee {
                    employee: employee.clone(),
                    score,
                    field,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        hits
    }

    pub fn filter(&self, records: &[Employee], query: &str) -> Vec<Employee> {
        if query.trim().is_empty() {
            return records.to_vec();
        }
        self.rank(records, query)
            .into_iter()
            .map(|hit| hit.employee)
            .collect()
    }
}

/// [`FuzzyMatcher::filter`] with the default threshold.
pub fn filter(records: &[Employee], query: &str) -> Vec<Employee> {
    FuzzyMatcher::default().filter(records, query)
}

fn window_score(query: &[char], candidate: &[char]) -> f64 {
    if query.is_empty() {
        return 0.0;
    }
    if candidate.is_empty() {
        return 1.0;
    }
    let q: String = query.iter().collect();
    let qlen = query.len();

    if candidate.len() <= qlen + 1 {
        let c: String = candidate.iter().collect();
        return normalise(levenshtein(&q, &c), qlen);
    }

    let mut best = usize::MAX;
    let shortest = qlen.saturating_sub(1).max(1);
    for start in 0..candidate.len() {
        for len in shortest..=qlen + 1 {
            let end = start + len;
            if end > candidate.len() {
                break;
            }
            let window: String = candidate[start..end].iter().collect();
            best = best.min(levenshtein(&q, &window));
            if best == 0 {
                return 0.0;
            }
        }
    }
    normalise(best, qlen)
}

fn normalise(edits: usize, qlen: usize) -> f64 {
    (edits as f64 / qlen as f64).min(1.0)
}
