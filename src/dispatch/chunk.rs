/// Discord's hard limit on message length, in characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// Split `text` into consecutive slices of at most `limit` characters.
///
/// A slice that has to be cut short ends right before the last newline inside
/// the window, so the newline opens the next slice. A newline is only usable
/// when the text before it is not blank; otherwise the cut falls exactly on
/// the limit. Joining the slices gives back `text`.
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<&str> {
    if limit == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let cut = match remaining.char_indices().nth(limit) {
            None => remaining.len(),
            Some((boundary, _)) => match remaining[..boundary].rfind('\n') {
                Some(newline) if !remaining[..newline].trim().is_empty() => newline,
                _ => boundary,
            },
        };

        let (chunk, rest) = remaining.split_at(cut);
        chunks.push(chunk);
        remaining = rest;
    }

    chunks
}
