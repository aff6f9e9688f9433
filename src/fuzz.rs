//! Approximate string similarity.
//!
//! All scores are on a 0–100 scale, higher meaning more similar. The base
//! measure is the normalized Indel similarity (`200 * LCS / (len_a + len_b)`)
//! from the `rapidfuzz` crate;
//! the other scorers build on it to tolerate word order, extra words, and
//! one string being embedded in a longer one. [`wratio`] combines them into
//! the single weighted score the matcher uses.
//!
//! Lengths are counted in `char`s, not bytes.

use std::collections::{BTreeSet, HashSet};

use rapidfuzz::distance::indel;

/// Weight applied to token-based scores in [`wratio`].
const UNBASE_SCALE: f64 = 0.95;

/// Lowercase, replace every non-alphanumeric character with a space, trim.
pub fn default_process(s: &str) -> String {
    let mapped: String = s
        .chars()
        .flat_map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec![' ']
            }
        })
        .collect();
    mapped.trim().to_string()
}

/// Turn an Indel distance into a 0–100 similarity over `lensum` characters.
fn norm_sim(dist: usize, lensum: usize) -> f64 {
    if lensum == 0 {
        100.0
    } else {
        100.0 * (1.0 - dist as f64 / lensum as f64)
    }
}

/// Normalized Indel similarity of the whole strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    100.0 * rapidfuzz::fuzz::ratio(a.chars(), b.chars())
}

/// Best [`ratio`] of the shorter string against any window of the longer one.
///
/// Windows include the partial overlaps at both ends of the longer string.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len() == b.len() {
        return partial_windows(&a, &b).max(partial_windows(&b, &a));
    }
    if a.len() < b.len() {
        partial_windows(&a, &b)
    } else {
        partial_windows(&b, &a)
    }
}

/// Slide `needle` across `hay`. A window can only beat the others if its
/// newly entered character occurs in `needle`, so every other window is skipped.
fn partial_windows(needle: &[char], hay: &[char]) -> f64 {
    if needle.is_empty() {
        return if hay.is_empty() { 100.0 } else { 0.0 };
    }
    let n = needle.len();
    let needle_chars: HashSet<char> = needle.iter().copied().collect();
    let scorer = indel::BatchComparator::new(needle.iter().copied());

    let leading = (1..n.min(hay.len()))
        .filter(|&end| needle_chars.contains(&hay[end - 1]))
        .map(|end| &hay[..end]);
    let full = (0..=(hay.len() - n))
        .filter(|&start| needle_chars.contains(&hay[start + n - 1]))
        .map(|start| &hay[start..start + n]);
    let trailing = (hay.len() - n + 1..hay.len())
        .filter(|&start| needle_chars.contains(&hay[start]))
        .map(|start| &hay[start..]);

    let mut best = 0.0f64;
    for window in leading.chain(full).chain(trailing) {
        let score = 100.0 * scorer.normalized_similarity(window.iter().copied());
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// [`ratio`] after sorting the words of both strings.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Compare the shared words and the leftover words of each string separately.
///
/// Returns 100 when the word set of one string contains the other's.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let intersect: Vec<&str> = ta.intersection(&tb).copied().collect();
    let diff_ab: Vec<&str> = ta.difference(&tb).copied().collect();
    let diff_ba: Vec<&str> = tb.difference(&ta).copied().collect();

    if !intersect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let diff_ab = diff_ab.join(" ");
    let diff_ba = diff_ba.join(" ");
    let ab_len = diff_ab.chars().count();
    let ba_len = diff_ba.chars().count();
    let sect_len = intersect.join(" ").chars().count();

    // Lengths of "<sect> <diff_ab>" and "<sect> <diff_ba>".
    let sep = usize::from(sect_len != 0);
    let sect_ab_len = sect_len + sep + ab_len;
    let sect_ba_len = sect_len + sep + ba_len;

    let dist = indel::distance(diff_ab.chars(), diff_ba.chars());
    let result = norm_sim(dist, sect_ab_len + sect_ba_len);

    if intersect.is_empty() {
        return result;
    }

    let sect_ab_ratio = norm_sim(sep + ab_len, sect_len + sect_ab_len);
    let sect_ba_ratio = norm_sim(sep + ba_len, sect_len + sect_ba_len);

    result.max(sect_ab_ratio).max(sect_ba_ratio)
}

/// Best of [`token_sort_ratio`] and [`token_set_ratio`].
pub fn token_ratio(a: &str, b: &str) -> f64 {
    token_sort_ratio(a, b).max(token_set_ratio(a, b))
}

/// [`partial_ratio`] over sorted words; 100 as soon as any word is shared.
pub fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let split_a: Vec<&str> = a.split_whitespace().collect();
    let split_b: Vec<&str> = b.split_whitespace().collect();
    let ta: BTreeSet<&str> = split_a.iter().copied().collect();
    let tb: BTreeSet<&str> = split_b.iter().copied().collect();

    if ta.intersection(&tb).next().is_some() {
        return 100.0;
    }

    let diff_ab: Vec<&str> = ta.difference(&tb).copied().collect();
    let diff_ba: Vec<&str> = tb.difference(&ta).copied().collect();

    let result = partial_ratio(&sorted_tokens(a), &sorted_tokens(b));

    if split_a.len() == diff_ab.len() && split_b.len() == diff_ba.len() {
        return result;
    }

    result.max(partial_ratio(&diff_ab.join(" "), &diff_ba.join(" ")))
}

/// Weighted ratio: picks the most suitable of the scorers above based on
/// how different the two lengths are, and scales the token and partial
/// scores down so an exact full-string match always ranks highest.
///
/// Both inputs go through [`default_process`] first, so case, punctuation
/// and surrounding whitespace do not affect the score. Returns 0 if either
/// string is empty after processing.
pub fn wratio(query: &str, choice: &str) -> f64 {
    let a = default_process(query);
    let b = default_process(choice);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let len_a = a.chars().count() as f64;
    let len_b = b.chars().count() as f64;
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    let end_ratio = ratio(&a, &b);

    if len_ratio < 1.5 {
        return end_ratio.max(token_ratio(&a, &b) * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };

    end_ratio
        .max(partial_ratio(&a, &b) * partial_scale)
        .max(partial_token_ratio(&a, &b) * UNBASE_SCALE * partial_scale)
}
