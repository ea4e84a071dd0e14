/// Normalise a raw answer field: trimmed, lowercased, cut to `answer_len`
/// characters.
pub fn normalize_input(raw: &str, answer_len: usize) -> String {
    raw.trim().to_lowercase().chars().take(answer_len).collect()
}

/// An answer is submitted automatically once it reaches full length.
pub fn is_ready(normalized: &str, answer_len: usize) -> bool {
    answer_len > 0 && normalized.chars().count() >= answer_len
}
