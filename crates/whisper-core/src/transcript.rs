//! Per-chunk transcripts and their ordered assembly.

use serde::{Deserialize, Serialize};

/// A timestamped span of recognized speech.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedSegment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Recognized text.
    pub text: String,
}

/// Transcript of one chunk of a (possibly split) source file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkTranscript {
    /// Position of the chunk in its plan.
    pub index: usize,
    /// Offset of the chunk on the source timeline, in seconds.
    pub start_secs: f64,
    /// Text recognized in this chunk.
    pub text: String,
    /// Segments relative to the chunk start (empty for text responses).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<TimedSegment>,
}

/// A complete transcript assembled from every chunk of a request.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResult {
    chunks: Vec<ChunkTranscript>,
    text: String,
}

impl TranscriptResult {
    /// Assemble chunk transcripts in chunk order.
    ///
    /// Input order is irrelevant: chunks are sorted by index before the full
    /// text is joined, so concurrent completion order cannot leak through.
    pub fn assemble(mut chunks: Vec<ChunkTranscript>) -> Self {
        chunks.sort_by_key(|c| c.index);
        let text = chunks
            .iter()
            .map(|c| c.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self { chunks, text }
    }

    /// Per-chunk transcripts, in chunk order.
    pub fn chunks(&self) -> &[ChunkTranscript] {
        &self.chunks
    }

    /// Concatenated full transcript.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All segments shifted onto the source timeline.
    pub fn segments(&self) -> Vec<TimedSegment> {
        self.chunks
            .iter()
            .flat_map(|c| {
                c.segments.iter().map(move |s| TimedSegment {
                    start: s.start + c.start_secs,
                    end: s.end + c.start_secs,
                    text: s.text.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chunk(index: usize, text: &str) -> ChunkTranscript {
        ChunkTranscript {
            index,
            start_secs: index as f64 * 10.0,
            text: text.into(),
            segments: vec![],
        }
    }

    #[test]
    fn single_chunk_text_is_verbatim_trimmed() {
        let result = TranscriptResult::assemble(vec![chunk(0, " hello world ")]);
        assert_eq!(result.text(), "hello world");
        assert_eq!(result.chunks().len(), 1);
    }

    #[test]
    fn empty_chunks_are_skipped_in_text() {
        let result = TranscriptResult::assemble(vec![chunk(0, "a"), chunk(1, ""), chunk(2, "c")]);
        assert_eq!(result.text(), "a c");
        assert_eq!(result.chunks().len(), 3);
    }

    #[test]
    fn segments_are_offset_by_chunk_start() {
        let mut second = chunk(1, "two");
        second.segments = vec![TimedSegment {
            start: 1.0,
            end: 2.5,
            text: "two".into(),
        }];
        let mut first = chunk(0, "one");
        first.segments = vec![TimedSegment {
            start: 0.0,
            end: 1.0,
            text: "one".into(),
        }];

        let result = TranscriptResult::assemble(vec![second, first]);
        let segments = result.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "one");
        assert!((segments[1].start - 11.0).abs() < f64::EPSILON);
        assert!((segments[1].end - 12.5).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn assembly_is_independent_of_completion_order(
            order in Just((0..12usize).collect::<Vec<_>>()).prop_shuffle()
        ) {
            let expected = (0..12).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
            let shuffled = order.iter().map(|&i| chunk(i, &format!("w{i}"))).collect();
            let result = TranscriptResult::assemble(shuffled);
            prop_assert_eq!(result.text(), expected.as_str());
            let indices: Vec<usize> = result.chunks().iter().map(|c| c.index).collect();
            prop_assert_eq!(indices, (0..12).collect::<Vec<_>>());
        }
    }
}
