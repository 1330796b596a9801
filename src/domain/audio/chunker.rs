/// Default characters per chunk; safe for most TTS providers
pub const DEFAULT_CHUNK_SIZE: usize = 4000;

/// A bounded slice of source text submitted as one synthesis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based position in the source
    pub index: usize,
    pub text: String,
    pub char_len: usize,
}

/// Split text into chunks of at most `max_len` characters, breaking at sentence
/// boundaries.
///
/// A sentence ends at `.`, `!` or `?` followed by a space. Sentences are packed
/// greedily, joined by a single space. A sentence longer than `max_len` is
/// emitted on its own rather than cut. Lengths count characters, not bytes.
/// Blank input yields no chunks.
pub fn split_text_into_chunks(text: &str, max_len: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if char_len(text) <= max_len {
        return vec![trimmed.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences(text) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        let sentence_len = char_len(sentence);

        // Close the chunk if this sentence (plus its joining space) would overflow it
        if !current.is_empty() && current_len + 1 + sentence_len > max_len {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(sentence);
        current_len += sentence_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Same as [`split_text_into_chunks`], with 1-based indices attached
pub fn chunk_text(text: &str, max_len: usize) -> Vec<Chunk> {
    split_text_into_chunks(text, max_len)
        .into_iter()
        .enumerate()
        .map(|(i, text)| Chunk {
            index: i + 1,
            char_len: char_len(&text),
            text,
        })
        .collect()
}

/// Pieces of `text` ending in a sentence terminator. The space after each
/// terminator is consumed; the terminator is kept.
fn sentences(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(space_at, ' ')) = chars.peek() {
            pieces.push(&text[start..space_at]);
            start = space_at + 1;
            chars.next();
        }
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
