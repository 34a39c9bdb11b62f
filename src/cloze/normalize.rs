/// Marks stripped from word edges besides ASCII punctuation. Covers what a
/// Chinese IME or a word processor tends to produce.
const EXTRA_PUNCTUATION: &[char] = &[
    '，', '。', '！', '？', '；', '：', '“', '”', '‘', '’', '…', '、', '«', '»',
];

fn is_edge_mark(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation() || EXTRA_PUNCTUATION.contains(&c)
}

/// Comparison form of a word: edge whitespace and punctuation removed, then
/// lowercased. Must be applied to both the expected word and the guess.
pub fn normalize(word: &str) -> String {
    word.trim_matches(is_edge_mark).to_lowercase()
}

/// Minimum normalized length (exclusive) for a word to be worth blanking
pub const MIN_CANDIDATE_CHARS: usize = 2;

/// Whether a word may be hidden: longer than [`MIN_CANDIDATE_CHARS`] once
/// normalized, and made only of letters and digits.
pub fn is_candidate(word: &str) -> bool {
    let normalized = normalize(word);
    normalized.chars().count() > MIN_CANDIDATE_CHARS && normalized.chars().all(char::is_alphanumeric)
}
