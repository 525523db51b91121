use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?]+\s+)").expect("sentence pattern is valid"));

/// Split text into batches that respect sentence boundaries.
/// Each batch is at most `max_len` bytes; sentences longer than that are cut
/// on character boundaries.
pub fn split_into_batches(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut batches = Vec::new();
    let mut current = String::new();
    let mut last_end = 0;

    for mat in SENTENCE_END.find_iter(text) {
        push_piece(&mut batches, &mut current, &text[last_end..mat.end()], max_len);
        last_end = mat.end();
    }

    if last_end < text.len() {
        push_piece(&mut batches, &mut current, &text[last_end..], max_len);
    }

    if !current.trim().is_empty() {
        batches.push(current.trim().to_string());
    }

    batches
}

fn push_piece(batches: &mut Vec<String>, current: &mut String, piece: &str, max_len: usize) {
    if !current.is_empty() && current.len() + piece.len() > max_len {
        batches.push(current.trim().to_string());
        current.clear();
    }

    if piece.len() <= max_len {
        current.push_str(piece);
        return;
    }

    let mut chunk = String::new();
    for ch in piece.chars() {
        if chunk.len() + ch.len_utf8() > max_len {
            batches.push(std::mem::take(&mut chunk));
        }
        chunk.push(ch);
    }
    current.push_str(&chunk);
}
