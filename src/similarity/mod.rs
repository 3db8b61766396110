//! Text normalization and similarity primitives.
//!
//! - [`normalize_text`] canonicalizes answers before any comparison.
//! - [`string_similarity`] is the edit-distance score used by the short-text and fallback tiers.
//! - [`cosine_similarity`] scores embedding vectors for the semantic tier.


/// Lower-cases, strips non-word characters, and collapses whitespace.
///
/// Word characters are ASCII `[A-Za-z0-9_]`; other letters (accented, CJK) are
/// dropped like punctuation. Any Unicode whitespace run becomes a single ASCII
/// space and the result is trimmed, so the function is idempotent.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for c in lowered.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else if is_word_char(c) {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }

    out
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Unit-cost insert/delete/substitute distance, computed over `char`s.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single rolling row over the shorter string.
    let (outer, inner) = if a.len() >= b.len() { (&a, &b) } else { (&b, &a) };
    let mut row: Vec<usize> = (0..=inner.len()).collect();

    for (i, oc) in outer.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, ic) in inner.iter().enumerate() {
            let above = row[j + 1];
            let cost = if oc == ic { 0 } else { 1 };
            row[j + 1] = (diagonal + cost).min(above + 1).min(row[j] + 1);
            diagonal = above;
        }
    }

    row[inner.len()]
}

/// Edit-distance similarity in `[0, 1]`.
///
/// `(max_len - distance) / max_len`; two empty strings are identical (`1.0`).
pub fn string_similarity(a: &str, b: &str) -> f32 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    let similarity = (longest - distance.min(longest)) as f32 / longest as f32;
    similarity.clamp(0.0, 1.0)
}

/// Cosine similarity with explicit magnitude division.
///
/// Returns `0.0` for empty inputs, mismatched lengths, or a zero-magnitude vector.
/// Callers that must distinguish a length mismatch should check lengths first.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) =
        a.iter()
            .zip(b.iter())
            .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (&av, &bv)| {
                (dot + av * bv, na + av * av, nb + bv * bv)
            });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Scales `vector` to unit length in place (zero vectors are left untouched).
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
