//! Overlapping recursive text chunker.
//!
//! Splits extracted document text into [`Chunk`]s that respect a target
//! character budget. Splitting is recursive: paragraph boundaries
//! (`\n\n`) first, then line breaks, sentence ends, and word breaks,
//! with a hard character split as the last resort. Adjacent pieces are
//! then merged greedily up to the budget, and each chunk after the
//! first carries a fixed-size overlap from the end of its predecessor.
//!
//! # Guarantees
//!
//! - Non-empty input always produces at least one chunk.
//! - Concatenating chunk texts with each chunk's overlap prefix removed
//!   reproduces the input byte-for-byte, in order.
//! - Every chunk's length is at most `chunk_size` bytes (overlap
//!   included).
//! - Page/source metadata is copied onto every chunk.
//!
//! Empty or whitespace-only input is a [`RagError::Validation`]: the
//! caller must reject the document rather than index nothing.

use crate::error::{RagError, Result};
use crate::models::Chunk;

/// Split boundaries, coarsest first. A hard character split applies
/// when none of these occur within an oversized region.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Split `text` into overlapping chunks tagged with `source` and `page`.
///
/// `chunk_size` is the maximum chunk length in bytes (default 1000 at
/// the call sites); `overlap` is the number of trailing bytes of one
/// chunk repeated at the start of the next (default 150).
pub fn chunk_text(
    text: &str,
    source: &str,
    page: Option<u32>,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Chunk>> {
    if text.trim().is_empty() {
        return Err(RagError::validation(format!(
            "no extractable text for '{}'",
            source
        )));
    }

    let chunk_size = chunk_size.max(2);
    let overlap = overlap.min(chunk_size / 2);
    // Pieces must fit a continuation chunk alongside its overlap prefix.
    let max_piece = (chunk_size - overlap).max(1);

    let mut ranges = Vec::new();
    split_range(text, 0, text.len(), max_piece, 0, &mut ranges);

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut buf_start = 0usize;
    let mut buf_end = 0usize;
    let mut buffered = false;

    for (start, end) in ranges {
        if !buffered {
            buf_start = start;
            buf_end = end;
            buffered = true;
            continue;
        }
        let budget = if chunks.is_empty() {
            chunk_size
        } else {
            max_piece
        };
        if end - buf_start > budget {
            push_chunk(&mut chunks, text, buf_start, buf_end, source, page, overlap);
            buf_start = start;
        }
        buf_end = end;
    }
    if buffered {
        push_chunk(&mut chunks, text, buf_start, buf_end, source, page, overlap);
    }

    Ok(chunks)
}

/// Flush `text[start..end]` as a chunk, prefixed with the overlap tail
/// of the previous chunk when one exists.
fn push_chunk(
    chunks: &mut Vec<Chunk>,
    text: &str,
    start: usize,
    end: usize,
    source: &str,
    page: Option<u32>,
    overlap: usize,
) {
    let mut body = String::new();
    if overlap > 0 {
        if let Some(prev) = chunks.last() {
            let tail_start = snap_forward(&prev.text, prev.text.len().saturating_sub(overlap));
            body.push_str(&prev.text[tail_start..]);
        }
    }
    body.push_str(&text[start..end]);
    chunks.push(Chunk {
        text: body,
        source: source.to_string(),
        page,
    });
}

/// Partition `text[start..end)` into contiguous pieces of at most `max`
/// bytes, preferring coarse separators. Separators stay attached to the
/// piece they terminate, so the pieces cover the region exactly.
fn split_range(
    text: &str,
    start: usize,
    end: usize,
    max: usize,
    depth: usize,
    out: &mut Vec<(usize, usize)>,
) {
    if start >= end {
        return;
    }
    if end - start <= max {
        out.push((start, end));
        return;
    }

    if depth >= SEPARATORS.len() {
        // Hard split at the char boundary closest to `max`.
        let mut at = snap_back(text, start + max);
        if at <= start {
            at = next_char_boundary(text, start + 1).min(end);
        }
        out.push((start, at));
        split_range(text, at, end, max, depth, out);
        return;
    }

    let sep = SEPARATORS[depth];
    let region = &text[start..end];
    let mut piece_start = start;
    let mut cursor = 0usize;
    let mut matched = false;

    while let Some(pos) = region[cursor..].find(sep) {
        matched = true;
        let piece_end = start + cursor + pos + sep.len();
        split_range(text, piece_start, piece_end, max, depth + 1, out);
        piece_start = piece_end;
        cursor = cursor + pos + sep.len();
        if cursor >= region.len() {
            break;
        }
    }

    if !matched {
        split_range(text, start, end, max, depth + 1, out);
    } else if piece_start < end {
        split_range(text, piece_start, end, max, depth + 1, out);
    }
}

/// Snap a byte index back to the nearest valid UTF-8 char boundary.
fn snap_back(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Snap a byte index forward to the nearest valid UTF-8 char boundary.
fn snap_forward(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

fn next_char_boundary(s: &str, index: usize) -> usize {
    snap_forward(s, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_text_single_chunk() {
        let chunks = chunk_text("Hello, world!", "a.txt", None, 1000, 150).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello, world!");
        assert_eq!(chunks[0].source, "a.txt");
        assert_eq!(chunks[0].page, None);
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(chunk_text("", "a.txt", None, 1000, 150).is_err());
        assert!(chunk_text("   \n\t ", "a.txt", None, 1000, 150).is_err());
    }

    #[test]
    fn page_metadata_propagates() {
        let chunks = chunk_text("Refunds within 30 days.", "policy.pdf", Some(2), 1000, 150)
            .unwrap();
        assert!(chunks.iter().all(|c| c.page == Some(2)));
        assert_eq!(chunks[0].citation(), "policy.pdf (Page 2)");
    }

    #[test]
    fn splits_on_paragraphs_before_hard_limits() {
        let text = format!("{}\n\n{}", "alpha ".repeat(20).trim(), "beta ".repeat(20).trim());
        let chunks = chunk_text(&text, "a.txt", None, 140, 20).unwrap();
        assert!(chunks.len() >= 2);
        assert!(chunks[0].text.contains("alpha"));
        assert!(chunks.last().unwrap().text.contains("beta"));
    }

    #[test]
    fn chunks_respect_budget() {
        let text = "word ".repeat(400);
        let chunks = chunk_text(&text, "a.txt", None, 200, 40).unwrap();
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.text.len() <= 200, "chunk too long: {}", c.text.len());
        }
    }

    #[test]
    fn overlap_carried_between_chunks() {
        let text = "word ".repeat(400);
        let overlap = 40;
        let chunks = chunk_text(&text, "a.txt", None, 200, overlap).unwrap();
        for pair in chunks.windows(2) {
            let prev = &pair[0].text;
            let tail_start = prev.len().saturating_sub(overlap);
            let tail = &prev[tail_start..];
            assert!(
                pair[1].text.starts_with(tail),
                "continuation chunk missing overlap prefix"
            );
        }
    }

    #[test]
    fn content_preserved_in_order() {
        let text = "The refund window is 30 days.\n\nFor electronics it is 14 days. \
                    Claims go through the service desk.\nAll refunds require a receipt. "
            .repeat(12);
        let overlap = 30;
        let chunks = chunk_text(&text, "a.txt", None, 180, overlap).unwrap();
        let mut rebuilt = String::new();
        for (i, c) in chunks.iter().enumerate() {
            if i == 0 {
                rebuilt.push_str(&c.text);
            } else {
                let prev = &chunks[i - 1].text;
                let tail_start = snap_forward(prev, prev.len().saturating_sub(overlap));
                let prefix_len = prev.len() - tail_start;
                rebuilt.push_str(&c.text[prefix_len..]);
            }
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn multibyte_input_never_panics() {
        let text = "продукт ".repeat(100) + "┌───┐ naïve café ";
        let chunks = chunk_text(&text, "a.txt", None, 120, 25).unwrap();
        assert!(!chunks.is_empty());
    }

    #[test]
    fn deterministic() {
        let text = "Alpha.\n\nBeta gamma delta. Epsilon zeta.\nEta theta.".repeat(10);
        let a = chunk_text(&text, "a.txt", None, 90, 15).unwrap();
        let b = chunk_text(&text, "a.txt", None, 90, 15).unwrap();
        assert_eq!(a, b);
    }
}
