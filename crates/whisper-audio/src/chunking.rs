//! Size-driven chunk planning and materialization.
//!
//! A file at or under the size ceiling is submitted whole. Larger files are
//! divided evenly in time into `ceil(size / ceiling)` chunks whose interior
//! boundaries are rounded to the boundary granularity; the last boundary is
//! always exactly the source duration, so the chunks tile `[0, duration]`.

use std::sync::Arc;

use tracing::{debug, info, warn};
use whisper_core::AudioFile;
use whisper_settings::ChunkingSettings;

use crate::codec::AudioCodec;
use crate::errors::AudioError;
use crate::scratch::ScratchDir;

/// A time range of the source file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chunk {
    /// Position in the plan.
    pub index: usize,
    /// Inclusive start, seconds.
    pub start_secs: f64,
    /// Exclusive end, seconds.
    pub end_secs: f64,
}

impl Chunk {
    /// Length of the range in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Ordered, contiguous chunks covering the whole source.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkPlan {
    chunks: Vec<Chunk>,
}

impl ChunkPlan {
    /// Chunks in order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Always false; a plan has at least one chunk.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Whether the source is submitted unsplit.
    pub fn is_single(&self) -> bool {
        self.chunks.len() == 1
    }
}

/// A chunk ready for upload: its time range and the file holding it.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedChunk {
    /// Time range on the source timeline.
    pub chunk: Chunk,
    /// The source itself for single-chunk plans, otherwise a scratch file.
    pub file: AudioFile,
}

/// Decides whether and how to split a file before upload.
#[derive(Clone)]
pub struct ChunkPlanner {
    settings: ChunkingSettings,
    codec: Arc<dyn AudioCodec>,
}

impl ChunkPlanner {
    /// Create a planner.
    pub fn new(settings: ChunkingSettings, codec: Arc<dyn AudioCodec>) -> Self {
        Self { settings, codec }
    }

    /// The size ceiling from settings.
    pub fn size_ceiling_bytes(&self) -> u64 {
        self.settings.size_ceiling_bytes
    }

    /// Plan `file` against `ceiling_bytes`.
    ///
    /// Under the ceiling the plan is one chunk `[0, duration]` (an unknown
    /// duration yields `[0, 0]`). Above it the duration must be known.
    ///
    /// The chunk count is `ceil(size / ceiling)` capped so that no chunk is
    /// shorter than `min_chunk_secs`. A short, dense file can therefore get
    /// fewer chunks than its size calls for; [`split`](Self::split) then
    /// finds a chunk still above the ceiling and reports
    /// [`AudioError::ChunkTooLarge`].
    pub fn plan(&self, file: &AudioFile, ceiling_bytes: u64) -> Result<ChunkPlan, AudioError> {
        if file.size_bytes() <= ceiling_bytes {
            return Ok(ChunkPlan {
                chunks: vec![Chunk {
                    index: 0,
                    start_secs: 0.0,
                    end_secs: file.duration_secs().unwrap_or(0.0),
                }],
            });
        }

        let duration = file
            .duration_secs()
            .ok_or_else(|| AudioError::DurationUnknown {
                path: file.path().to_path_buf(),
            })?;

        let wanted = file.size_bytes().div_ceil(ceiling_bytes.max(1));
        let count = usize::try_from(wanted)
            .unwrap_or(usize::MAX)
            .min(self.max_chunks(duration));
        Ok(ChunkPlan {
            chunks: even_split(duration, count, self.settings.boundary_granularity_ms),
        })
    }

    /// Materialize a plan into scratch files, re-planning when a produced
    /// segment is still above the ceiling.
    ///
    /// Each retry halves the effective ceiling. Gives up after
    /// `max_split_attempts` plans, or earlier when chunks would fall below
    /// `min_chunk_secs`.
    pub async fn split(
        &self,
        file: &mut AudioFile,
        ceiling_bytes: u64,
        scratch: &ScratchDir,
    ) -> Result<Vec<PreparedChunk>, AudioError> {
        if file.size_bytes() <= ceiling_bytes {
            let plan = self.plan(file, ceiling_bytes)?;
            return Ok(plan
                .chunks()
                .iter()
                .map(|&chunk| PreparedChunk {
                    chunk,
                    file: file.clone(),
                })
                .collect());
        }

        if file.duration_secs().is_none() {
            let secs = self.codec.probe_duration(file.path()).await?;
            file.set_duration(secs);
        }

        let mut attempts = 0;
        let mut last_count = 0;
        let mut oversized = (0, 0);
        for attempt in 0..self.settings.max_split_attempts {
            let effective = (ceiling_bytes >> attempt).max(1);
            let plan = self.plan(file, effective)?;
            if plan.len() <= last_count {
                debug!(chunks = plan.len(), "cannot split further without going below the minimum chunk length");
                break;
            }
            last_count = plan.len();
            attempts = attempt + 1;

            info!(
                path = %file.path().display(),
                size_bytes = file.size_bytes(),
                chunks = plan.len(),
                attempt = attempts,
                "splitting oversized input"
            );

            let prepared = self.materialize(file, &plan, scratch, attempt).await?;
            match prepared.iter().find(|p| p.file.size_bytes() > ceiling_bytes) {
                None => return Ok(prepared),
                Some(big) => {
                    warn!(
                        index = big.chunk.index,
                        size_bytes = big.file.size_bytes(),
                        ceiling_bytes,
                        "chunk above ceiling, re-planning"
                    );
                    oversized = (big.chunk.index, big.file.size_bytes());
                    for p in &prepared {
                        let _ = tokio::fs::remove_file(p.file.path()).await;
                    }
                }
            }
        }

        Err(AudioError::ChunkTooLarge {
            index: oversized.0,
            size_bytes: oversized.1,
            ceiling_bytes,
            attempts,
        })
    }

    async fn materialize(
        &self,
        source: &AudioFile,
        plan: &ChunkPlan,
        scratch: &ScratchDir,
        attempt: u32,
    ) -> Result<Vec<PreparedChunk>, AudioError> {
        let mut prepared = Vec::with_capacity(plan.len());
        for &chunk in plan.chunks() {
            let out = scratch.file(
                &format!("split{attempt}-chunk-{:03}", chunk.index),
                source.format(),
            );
            self.codec
                .extract_segment(source.path(), &out, chunk.start_secs, chunk.end_secs)
                .await?;
            let meta = tokio::fs::metadata(&out)
                .await
                .map_err(|e| AudioError::io(&out, e))?;
            let file = AudioFile::new(out, meta.len())?.with_duration(chunk.duration_secs());
            prepared.push(PreparedChunk { chunk, file });
        }
        Ok(prepared)
    }

    /// Most chunks `duration` allows without any falling under the minimum.
    fn max_chunks(&self, duration: f64) -> usize {
        let min = self.settings.min_chunk_secs.max(f64::EPSILON);
        ((duration / min).floor() as usize).max(1)
    }
}

/// Split `[0, duration]` into `count` even ranges.
fn even_split(duration: f64, count: usize, granularity_ms: u64) -> Vec<Chunk> {
    let count = count.max(1);
    let mut bounds = Vec::with_capacity(count + 1);
    bounds.push(0.0);
    for i in 1..count {
        let raw = duration * i as f64 / count as f64;
        let prev = bounds.last().copied().unwrap_or(0.0);
        bounds.push(round_to(raw, granularity_ms).clamp(prev, duration));
    }
    bounds.push(duration);

    bounds
        .windows(2)
        .enumerate()
        .map(|(index, w)| Chunk {
            index,
            start_secs: w[0],
            end_secs: w[1],
        })
        .collect()
}

fn round_to(secs: f64, granularity_ms: u64) -> f64 {
    if granularity_ms == 0 {
        return secs;
    }
    let step = granularity_ms as f64 / 1000.0;
    (secs / step).round() * step
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::codec::EncodeOptions;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use proptest::prelude::*;

    struct NoCodec;

    #[async_trait]
    impl AudioCodec for NoCodec {
        async fn probe_duration(&self, path: &Path) -> Result<f64, AudioError> {
            Err(AudioError::DurationUnknown {
                path: path.to_path_buf(),
            })
        }
        async fn transcode(&self, _: &Path, _: &Path, _: &EncodeOptions) -> Result<(), AudioError> {
            unreachable!()
        }
        async fn extract_segment(&self, _: &Path, _: &Path, _: f64, _: f64) -> Result<(), AudioError> {
            unreachable!()
        }
    }

    fn planner() -> ChunkPlanner {
        ChunkPlanner::new(ChunkingSettings::default(), Arc::new(NoCodec))
    }

    fn file(size: u64, duration: Option<f64>) -> AudioFile {
        let f = AudioFile::new("/srv/audio/talk.mp3", size).unwrap();
        match duration {
            Some(d) => f.with_duration(d),
            None => f,
        }
    }

    #[test]
    fn under_ceiling_is_single_chunk() {
        let plan = planner().plan(&file(1_000, Some(180.0)), 2_000).unwrap();
        assert!(plan.is_single());
        assert_eq!(plan.chunks()[0].start_secs, 0.0);
        assert_eq!(plan.chunks()[0].end_secs, 180.0);
    }

    #[test]
    fn exactly_at_ceiling_is_single_chunk() {
        assert!(planner().plan(&file(2_000, Some(10.0)), 2_000).unwrap().is_single());
    }

    #[test]
    fn under_ceiling_without_duration_is_zero_range() {
        let plan = planner().plan(&file(10, None), 2_000).unwrap();
        assert_eq!(plan.chunks()[0].end_secs, 0.0);
    }

    #[test]
    fn over_ceiling_without_duration_fails() {
        let err = planner().plan(&file(5_000, None), 2_000).unwrap_err();
        assert_matches!(err, AudioError::DurationUnknown { .. });
    }

    #[test]
    fn boundaries_round_to_granularity() {
        let plan = planner().plan(&file(3_000, Some(100.0)), 1_000).unwrap();
        assert_eq!(plan.len(), 3);
        assert!((plan.chunks()[0].end_secs - 33.33).abs() < 1e-9);
        assert!((plan.chunks()[1].end_secs - 66.67).abs() < 1e-9);
        assert_eq!(plan.chunks()[2].end_secs, 100.0);
    }

    #[test]
    fn chunk_count_respects_minimum_length() {
        let plan = planner().plan(&file(1_000_000, Some(3.5)), 1_000).unwrap();
        assert_eq!(plan.len(), 3);
        assert!(plan.chunks().iter().all(|c| c.duration_secs() >= 1.0));
    }

    #[test]
    fn short_dense_file_is_capped_below_the_size_estimate() {
        // 100 chunks by size, but 2.5 s only fits two of at least 1 s
        let plan = planner().plan(&file(100_000, Some(2.5)), 1_000).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.chunks()[1].end_secs, 2.5);
    }

    proptest! {
        #[test]
        fn oversized_plans_tile_the_duration(
            ceiling in 1_000u64..50_000_000,
            factor in 1.01f64..40.0,
            duration in 60.0f64..20_000.0,
        ) {
            let size = (ceiling as f64 * factor) as u64;
            let plan = planner().plan(&file(size, Some(duration)), ceiling).unwrap();
            let chunks = plan.chunks();

            prop_assert_eq!(chunks.len() as u64, size.div_ceil(ceiling));
            prop_assert_eq!(chunks[0].start_secs, 0.0);
            prop_assert_eq!(chunks[chunks.len() - 1].end_secs, duration);
            for (i, c) in chunks.iter().enumerate() {
                prop_assert_eq!(c.index, i);
                prop_assert!(c.end_secs > c.start_secs);
            }
            for w in chunks.windows(2) {
                prop_assert_eq!(w[0].end_secs, w[1].start_secs);
            }
        }

        #[test]
        fn under_ceiling_always_one_chunk(
            size in 0u64..10_000,
            extra in 0u64..10_000,
            duration in 0.0f64..10_000.0,
        ) {
            let plan = planner().plan(&file(size, Some(duration)), size + extra).unwrap();
            prop_assert!(plan.is_single());
            prop_assert_eq!(plan.chunks()[0].end_secs, duration);
        }
    }
}
