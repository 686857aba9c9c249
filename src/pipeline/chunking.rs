//! Overlapping character chunker for map-step fan-out.
//!
//! Splitting is exact: chunk `i + 1` begins precisely `overlap` characters
//! before the end of chunk `i`, so concatenating the chunks with each later chunk's
//! leading overlap removed reproduces the input byte for byte. Cuts prefer semantic
//! boundaries (paragraph break, newline, sentence end, space) inside the size budget
//! and fall back to a hard character cut when none exists past the overlap region.
//! All sizes are measured in characters, never bytes, so multi-byte input is safe.

use super::types::ChunkingError;

/// Split text into ordered, overlapping chunks of at most `max_size` characters.
///
/// Returns an empty vector only for empty input; any non-empty input yields at least
/// one chunk. Deterministic and total for valid parameters: `max_size` must be
/// non-zero and `overlap` must be strictly smaller than `max_size` (the strict bound
/// guarantees forward progress on every cut).
pub fn split(text: &str, max_size: usize, overlap: usize) -> Result<Vec<String>, ChunkingError> {
    if max_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if overlap >= max_size {
        return Err(ChunkingError::OverlapTooLarge {
            overlap,
            chunk_size: max_size,
        });
    }
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let window_end = advance_chars(text, start, max_size);
        if window_end == text.len() {
            chunks.push(text[start..].to_string());
            break;
        }

        let window = &text[start..window_end];
        // A cut before this point would not advance past the previous chunk's tail.
        let min_cut = advance_chars(window, 0, overlap + 1);
        let cut = find_cut(window, min_cut);
        let chunk = &window[..cut];
        chunks.push(chunk.to_string());
        start += tail_start(chunk, overlap);
    }

    Ok(chunks)
}

/// Byte offset of the latest preferred boundary in `window` at or past `min_cut`,
/// cutting just after the boundary; falls back to the full window (hard cut).
fn find_cut(window: &str, min_cut: usize) -> usize {
    let region = &window[min_cut..];
    for boundary in ["\n\n", "\n", ". ", " "] {
        if let Some(position) = region.rfind(boundary) {
            return min_cut + position + boundary.len();
        }
    }
    window.len()
}

/// Byte offset after `count` characters from `start`, capped at the end of `text`.
fn advance_chars(text: &str, start: usize, count: usize) -> usize {
    text[start..]
        .char_indices()
        .nth(count)
        .map(|(offset, _)| start + offset)
        .unwrap_or(text.len())
}

/// Byte offset within `chunk` where its final `overlap` characters begin.
fn tail_start(chunk: &str, overlap: usize) -> usize {
    if overlap == 0 {
        return chunk.len();
    }
    chunk
        .char_indices()
        .rev()
        .nth(overlap - 1)
        .map(|(offset, _)| offset)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_count(text: &str) -> usize {
        text.chars().count()
    }

    /// Concatenate chunks with each later chunk's leading overlap removed.
    fn reconstruct(chunks: &[String], overlap: usize) -> String {
        let mut output = String::new();
        for (index, chunk) in chunks.iter().enumerate() {
            if index == 0 {
                output.push_str(chunk);
            } else {
                let skip = advance_chars(chunk, 0, overlap);
                output.push_str(&chunk[skip..]);
            }
        }
        output
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split("", 100, 10).expect("split").is_empty());
    }

    #[test]
    fn short_input_yields_single_identical_chunk() {
        let chunks = split("a short note", 100, 10).expect("split");
        assert_eq!(chunks, vec!["a short note".to_string()]);
    }

    #[test]
    fn whitespace_only_input_still_yields_a_chunk() {
        let chunks = split("   ", 100, 10).expect("split");
        assert_eq!(chunks, vec!["   ".to_string()]);
    }

    #[test]
    fn every_chunk_respects_the_size_bound() {
        let text = "the quick brown fox jumps over the lazy dog. ".repeat(40);
        let chunks = split(&text, 120, 20).expect("split");
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_count(chunk) <= 120);
        }
    }

    #[test]
    fn chunks_reconstruct_the_original_text() {
        let text = "Paragraph one.\n\nParagraph two continues here.\nAnd a third line with several more words to force splitting. ".repeat(12);
        let overlap = 15;
        let chunks = split(&text, 90, overlap).expect("split");
        assert!(chunks.len() > 1);
        assert_eq!(reconstruct(&chunks, overlap), text);
    }

    #[test]
    fn neighbors_share_exactly_the_overlap_region() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu";
        let overlap = 6;
        let chunks = split(text, 20, overlap).expect("split");
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0]
                .chars()
                .skip(char_count(&pair[0]) - overlap)
                .collect();
            assert!(pair[1].starts_with(&tail));
        }
    }

    #[test]
    fn unbroken_input_falls_back_to_hard_cuts() {
        let text = "x".repeat(250);
        let chunks = split(&text, 100, 10).expect("split");
        for chunk in &chunks {
            assert!(char_count(chunk) <= 100);
        }
        assert_eq!(reconstruct(&chunks, 10), text);
    }

    #[test]
    fn prefers_cutting_at_a_newline() {
        let text = format!("{}\n{}", "a".repeat(50), "b".repeat(50));
        let chunks = split(&text, 80, 5).expect("split");
        assert!(chunks[0].ends_with('\n'));
    }

    #[test]
    fn multibyte_input_splits_on_character_boundaries() {
        let text = "héllo wörld ☂ ".repeat(30);
        let overlap = 4;
        let chunks = split(&text, 25, overlap).expect("split");
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_count(chunk) <= 25);
        }
        assert_eq!(reconstruct(&chunks, overlap), text);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let error = split("hello", 0, 0).expect_err("invalid size");
        assert!(matches!(error, ChunkingError::InvalidChunkSize));
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let error = split("hello", 10, 10).expect_err("invalid overlap");
        assert!(matches!(
            error,
            ChunkingError::OverlapTooLarge {
                overlap: 10,
                chunk_size: 10
            }
        ));
    }

    #[test]
    fn zero_overlap_produces_disjoint_chunks() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = split(text, 12, 0).expect("split");
        assert_eq!(chunks.concat(), text);
    }
}
