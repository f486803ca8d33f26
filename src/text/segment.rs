//! Sentence-aware text segmentation.
//!
//! The synthesis API enforces a hard per-request character ceiling, so long
//! input is split into bounded [`TextSegment`]s before rewrite/synthesis.
//! Splitting prefers sentence boundaries (`.`, `!`, `?`, newline), falls back
//! to word boundaries, and only as a last resort cuts a single oversized word
//! into fixed-width chunks.
//!
//! # Example
//!
//! ```rust
//! use voz_gala::text::split;
//!
//! let segments = split("Hello there. How are you today?", 15);
//! let texts: Vec<&str> = segments.iter().map(|s| s.as_str()).collect();
//! assert_eq!(texts, vec!["Hello there.", "How are you", "today?"]);
//! ```

// ---------------------------------------------------------------------------
// TextSegment
// ---------------------------------------------------------------------------

/// An ordered, non-empty chunk of the original input text.
///
/// Immutable once created. Segment order is significant: the final script and
/// the assembled audio both follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment(String);

impl TextSegment {
    /// The segment text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the segment and return the owned text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Segment length in characters (not bytes) — the unit the synthesis
    /// ceiling is expressed in.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl std::fmt::Display for TextSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// split
// ---------------------------------------------------------------------------

/// Split `text` into ordered segments of at most `max_len` characters each.
///
/// Algorithm:
///
/// 1. Scan the text into *runs* terminated by `.`, `!`, `?` or a newline,
///    with the punctuation terminator kept as part of its run.
/// 2. Greedily pack consecutive runs into a segment while the packed length
///    (including one joining space) stays within `max_len`.
/// 3. A run that alone exceeds `max_len` is re-packed at word boundaries;
///    a single word longer than `max_len` is cut into fixed-width
///    `max_len`-character chunks.
///
/// Empty input (or whitespace-only input) yields an empty `Vec`; callers are
/// expected to validate input before reaching this point.
pub fn split(text: &str, max_len: usize) -> Vec<TextSegment> {
    assert!(max_len > 0, "max_len must be > 0");

    let mut segments: Vec<TextSegment> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    let mut flush = |current: &mut String, current_len: &mut usize, out: &mut Vec<TextSegment>| {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            out.push(TextSegment(trimmed.to_string()));
        }
        current.clear();
        *current_len = 0;
    };

    for run in sentence_runs(text) {
        let run_len = run.chars().count();

        // Length after appending this run, counting the joining space.
        let packed_len = if current_len == 0 {
            run_len
        } else {
            current_len + 1 + run_len
        };

        if packed_len <= max_len {
            if current_len > 0 {
                current.push(' ');
            }
            current.push_str(run);
            current_len = packed_len;
            continue;
        }

        flush(&mut current, &mut current_len, &mut segments);

        if run_len <= max_len {
            current.push_str(run);
            current_len = run_len;
        } else {
            // Single run longer than the ceiling: sacrifice the sentence
            // boundary and split the run itself.
            split_oversized_run(run, max_len, &mut segments);
        }
    }

    flush(&mut current, &mut current_len, &mut segments);
    segments
}

/// Split `text` into runs terminated by sentence-ending punctuation or a
/// newline. Terminating punctuation stays with its run; whitespace around
/// each run is trimmed and runs that end up empty are dropped.
fn sentence_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        let end = match ch {
            '.' | '!' | '?' => idx + ch.len_utf8(),
            '\n' => idx,
            _ => continue,
        };
        let run = text[start..end].trim();
        if !run.is_empty() {
            runs.push(run);
        }
        start = idx + ch.len_utf8();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        runs.push(tail);
    }
    runs
}

/// Fallback for a run longer than `max_len`: greedily pack whole words, and
/// hard-split any single word that still exceeds the ceiling.
fn split_oversized_run(run: &str, max_len: usize, out: &mut Vec<TextSegment>) {
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in run.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_len {
            if current_len > 0 {
                out.push(TextSegment(std::mem::take(&mut current)));
                current_len = 0;
            }
            for chunk in fixed_width_chunks(word, max_len) {
                out.push(TextSegment(chunk.to_string()));
            }
            continue;
        }

        let packed_len = if current_len == 0 {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if packed_len <= max_len {
            if current_len > 0 {
                current.push(' ');
            }
            current.push_str(word);
            current_len = packed_len;
        } else {
            out.push(TextSegment(std::mem::take(&mut current)));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if current_len > 0 {
        out.push(TextSegment(current));
    }
}

/// Cut `word` into consecutive chunks of exactly `max_len` characters
/// (the final chunk may be shorter). Splits on character boundaries, never
/// inside a UTF-8 sequence.
fn fixed_width_chunks(word: &str, max_len: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in word.char_indices() {
        if count == max_len {
            chunks.push(&word[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < word.len() {
        chunks.push(&word[start..]);
    }
    chunks
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
