// src/mapper/similarity.rs

/// Ratcliff-Obershelp similarity between two strings, normalized to 0.0-1.0.
/// Matches Python's `difflib.SequenceMatcher.ratio()` on the short,
/// junk-free inputs column headers produce: 2 * M / T where M is the total
/// length of the recursively matched blocks and T the combined length.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_len(&a, &b) as f64 / total as f64
}

fn matched_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (ai, bi, len) = longest_common_run(a, b);
    if len == 0 {
        return 0;
    }
    len + matched_len(&a[..ai], &b[..bi]) + matched_len(&a[ai + len..], &b[bi + len..])
}

/// Longest common contiguous run; earliest start in `a` wins ties.
fn longest_common_run(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            if cur[j + 1] > best.2 {
                best = (i + 1 - cur[j + 1], j + 1 - cur[j + 1], cur[j + 1]);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(ratio("amount", "amount"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(ratio("foo", "date"), 0.0);
    }

    #[test]
    fn close_variants_score_high() {
        // "amout" vs "amount": blocks "amou" + "t" = 5 matched, 2*5/11
        let r = ratio("amout", "amount");
        assert!((r - 10.0 / 11.0).abs() < 1e-9);
        assert!(ratio("transaction dat", "transaction date") > 0.9);
    }

    #[test]
    fn one_empty_side_scores_zero() {
        assert_eq!(ratio("", "amount"), 0.0);
    }
}
