use crate::document::SourceDocument;
use serde_json::Value;

/// Split `text` into overlapping windows of at most `max_chunk_size`
/// characters.
///
/// Windows are measured in characters, not bytes, so multi-byte text never
/// splits inside a code point. Each window is trimmed of surrounding
/// whitespace before being emitted; windows that trim to nothing are
/// dropped. The final window is truncated to the remaining text, never
/// padded.
///
/// Degenerate cases:
/// - empty (or whitespace-only) text yields no chunks;
/// - `max_chunk_size == 0` yields the whole trimmed text as a single chunk;
/// - `overlap >= max_chunk_size` still advances the window start by at least
///   one character per iteration, so chunking always terminates with a
///   strictly increasing sequence of start offsets.
#[must_use]
pub fn chunk_text(text: &str, max_chunk_size: usize, overlap: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if max_chunk_size == 0 {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    let text_len = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text_len {
        let end = usize::min(start + max_chunk_size, text_len);
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        if end >= text_len {
            break;
        }
        let next = end.saturating_sub(overlap);
        // Clamp so the start never moves backward and never stalls.
        start = if next > start { next } else { start + 1 };
    }

    chunks
}

/// Chunk every document's content, attaching `chunk_index` (0-based) and
/// `chunk_count` to a copy of the parent metadata.
///
/// Documents that yield zero chunks (empty or whitespace-only content) are
/// silently skipped; an empty corpus at this stage is an expected
/// steady-state condition, not an error.
#[must_use]
pub fn chunk_documents(
    docs: &[SourceDocument],
    max_chunk_size: usize,
    overlap: usize,
) -> Vec<SourceDocument> {
    let mut chunked = Vec::new();

    for doc in docs {
        let pieces = chunk_text(&doc.content, max_chunk_size, overlap);
        if pieces.is_empty() {
            continue;
        }

        let chunk_count = pieces.len();
        for (idx, piece) in pieces.into_iter().enumerate() {
            let mut metadata = doc.metadata.clone();
            metadata.insert("chunk_index".to_string(), Value::from(idx));
            metadata.insert("chunk_count".to_string(), Value::from(chunk_count));
            chunked.push(SourceDocument {
                source: doc.source.clone(),
                doc_type: doc.doc_type.clone(),
                content: piece,
                metadata,
            });
        }
    }

    chunked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Metadata;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn doc(source: &str, content: &str) -> SourceDocument {
        SourceDocument::new(
            source.to_string(),
            "website_text".to_string(),
            content.to_string(),
            Metadata::new(),
        )
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert_eq!(chunk_text("", 100, 10), Vec::<String>::new());
        assert_eq!(chunk_text("   \n\t ", 100, 10), Vec::<String>::new());
    }

    #[test]
    fn zero_max_size_returns_whole_text() {
        assert_eq!(chunk_text("ab", 0, 0), vec!["ab".to_string()]);
        assert_eq!(chunk_text("  ab  ", 0, 5), vec!["ab".to_string()]);
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(chunk_text("hello world", 100, 10), vec!["hello world"]);
    }

    #[test]
    fn windows_overlap_by_the_configured_amount() {
        // 10 chars, window 4, overlap 2 -> starts 0, 2, 4, 6, 8
        let chunks = chunk_text("abcdefghij", 4, 2);
        assert_eq!(chunks, vec!["abcd", "cdef", "efgh", "ghij"]);
    }

    #[test]
    fn final_window_is_truncated_not_padded() {
        let chunks = chunk_text("abcdefg", 3, 0);
        assert_eq!(chunks, vec!["abc", "def", "g"]);
    }

    #[test]
    fn whitespace_only_windows_are_dropped() {
        // Middle window lands entirely inside the run of spaces.
        let chunks = chunk_text("ab  cd", 2, 0);
        assert_eq!(chunks, vec!["ab", "cd"]);
    }

    #[test]
    fn overlap_equal_to_window_still_terminates() {
        // Would stall forever without the strict-advance clamp.
        let chunks = chunk_text("abcdef", 2, 2);
        assert_eq!(chunks, vec!["ab", "bc", "cd", "de", "ef"]);
    }

    #[test]
    fn multibyte_text_splits_on_character_boundaries() {
        let chunks = chunk_text("héllo wörld", 6, 0);
        assert_eq!(chunks, vec!["héllo", "wörld"]);
    }

    #[test]
    fn documents_get_chunk_index_and_count() {
        let mut base = doc("https://example.com", "abcdefghij");
        base.metadata.insert("lang".to_string(), json!("en"));

        let chunks = chunk_documents(&[base], 4, 0);
        assert_eq!(chunks.len(), 3);

        for (idx, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.source, "https://example.com");
            assert_eq!(chunk.doc_type, "website_text");
            assert_eq!(chunk.metadata.get("lang"), Some(&json!("en")));
            assert_eq!(chunk.metadata.get("chunk_index"), Some(&json!(idx)));
            assert_eq!(chunk.metadata.get("chunk_count"), Some(&json!(3)));
        }
    }

    #[test]
    fn empty_documents_are_silently_skipped() {
        let docs = vec![doc("a", "   "), doc("b", "content"), doc("c", "")];
        let chunks = chunk_documents(&docs, 100, 0);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].source, "b");
    }

    #[test]
    fn parent_metadata_is_copied_not_shared() {
        let base = doc("a", "abcdef");
        let chunks = chunk_documents(&[base.clone()], 3, 0);

        assert_eq!(chunks.len(), 2);
        assert!(base.metadata.is_empty());
        assert_eq!(chunks[0].metadata.get("chunk_index"), Some(&json!(0)));
        assert_eq!(chunks[1].metadata.get("chunk_index"), Some(&json!(1)));
    }

    proptest! {
        /// Rejoining chunks with the overlap removed reconstructs the
        /// original text, for whitespace-free input where trimming is the
        /// identity.
        #[test]
        fn round_trip_reconstruction(
            text in "[a-z0-9]{1,300}",
            max in 1usize..50,
            overlap_frac in 0usize..50,
        ) {
            prop_assume!(overlap_frac < max);
            let overlap = overlap_frac;

            let chunks = chunk_text(&text, max, overlap);
            let mut rebuilt = String::new();
            for (i, chunk) in chunks.iter().enumerate() {
                if i == 0 {
                    rebuilt.push_str(chunk);
                } else {
                    rebuilt.push_str(&chunk[overlap.min(chunk.len())..]);
                }
            }
            prop_assert_eq!(rebuilt, text);
        }

        /// Chunking terminates and the window genuinely advances even when
        /// the overlap swallows the whole window.
        #[test]
        fn pathological_overlap_terminates(
            text in "[a-z]{1,200}",
            max in 1usize..20,
            extra in 0usize..20,
        ) {
            let overlap = max + extra;
            let chunks = chunk_text(&text, max, overlap);

            // Strict start advance bounds the number of windows by the
            // text length.
            prop_assert!(chunks.len() <= text.chars().count());
            prop_assert!(!chunks.is_empty());
            for chunk in &chunks {
                prop_assert!(chunk.chars().count() <= max);
                prop_assert!(!chunk.is_empty());
            }
        }
    }
}
