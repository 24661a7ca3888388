//! Small text utilities shared by the extractors.

/// Split free-form text into trimmed, non-empty sentences.
///
/// Sentence boundaries are `.`, `!`, `?` followed by whitespace or
/// end-of-text, and hard newlines. Dots inside file names survive because a
/// boundary needs trailing whitespace.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                push_sentence(&mut sentences, &mut current);
            }
            '.' | '!' | '?' => {
                current.push(c);
                let boundary = chars.peek().map(|n| n.is_whitespace()).unwrap_or(true);
                if boundary {
                    push_sentence(&mut sentences, &mut current);
                }
            }
            c => current.push(c),
        }
    }
    push_sentence(&mut sentences, &mut current);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

/// Case-insensitive whole-word containment check.
pub fn contains_word(haystack: &str, word: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let word = word.to_lowercase();

    let mut start = 0;
    while let Some(pos) = haystack[start..].find(&word) {
        let begin = start + pos;
        let end = begin + word.len();
        let before_ok = begin == 0
            || !haystack[..begin]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let after_ok = end == haystack.len()
            || !haystack[end..].chars().next().is_some_and(|c| c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = end;
    }
    false
}

/// First non-empty line of a text block.
pub fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}
