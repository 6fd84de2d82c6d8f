//! Edit-distance similarity for fuzzy catalog lookup.

/// Minimum similarity ratio for a fuzzy hit, as the fraction `NUM / DEN`.
const THRESHOLD_NUM: usize = 3;
const THRESHOLD_DEN: usize = 5;

/// Minimum similarity ratio for a fuzzy hit (0.60).
pub const SIMILARITY_THRESHOLD: f64 = THRESHOLD_NUM as f64 / THRESHOLD_DEN as f64;

/// Edit distance where insertions and deletions cost 1 and a substitution costs 2.
///
/// Operates on Unicode scalar values. Weighting substitutions as a delete plus
/// an insert bounds the distance by `len(a) + len(b)`.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + if ca == cb { 0 } else { 2 };
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity ratio in `[0, 1]`: `1 - distance / (len(a) + len(b))`.
///
/// Two empty strings are identical (ratio 1.0).
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / total as f64
}

/// True when `similarity_ratio(a, b) >= SIMILARITY_THRESHOLD`.
///
/// Compared in integer arithmetic so a ratio of exactly 0.60 is a hit.
pub fn is_similar(a: &str, b: &str) -> bool {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return true;
    }
    let matched = total - edit_distance(a, b);
    matched * THRESHOLD_DEN >= total * THRESHOLD_NUM
}
