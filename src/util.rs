//! Small helpers shared across the scoring kernel.

/// Length of the common prefix shared by `a` and `b`.
pub(crate) fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Join token slices with single spaces into one flat char buffer, used to
/// build the "fused" (whole-field / whole-query) text for C3 scoring.
pub(crate) fn join_tokens(tokens: &[Vec<char>]) -> Vec<char> {
    let mut out = Vec::new();
    for (i, tok) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.extend(tok.iter().copied());
    }
    out
}

/// Round `value` to the nearest multiple of `quantum`. A non-positive
/// quantum disables rounding (the value passes through unchanged).
pub(crate) fn round_to(value: f64, quantum: f64) -> f64 {
    if quantum <= 0.0 {
        return value;
    }
    (value / quantum).round() * quantum
}

/// Like [`join_tokens`], but also returns each token's starting offset in
/// the joined buffer. Used by the highlighter to translate a per-token
/// alignment range back into the displayed, space-joined field text.
pub(crate) fn join_tokens_with_offsets(tokens: &[Vec<char>]) -> (Vec<char>, Vec<usize>) {
    let mut out = Vec::new();
    let mut offsets = Vec::with_capacity(tokens.len());
    for (i, tok) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        offsets.push(out.len());
        out.extend(tok.iter().copied());
    }
    (out, offsets)
}
