// FrameBank - host-owned pool of frequency-domain frames
//
// Stands in for the host's buffer pool. Frames are preallocated at a fixed
// size; analyzers borrow them by index for one call at a time. Selector
// handling follows the host contract:
// - a negative control value means "no new frame this block" (Hold)
// - an index past the end of the bank falls back to slot 0

use crate::error::AnalysisError;
use crate::frame::{warm_tables, FramePair, FrequencyFrame};

/// Buffer selector decoded from a host control value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSelector {
    /// No new frame: re-emit the cached outputs
    Hold,
    /// Read the frame in this bank slot
    Index(usize),
}

impl FrameSelector {
    /// Decode a control-rate value: negative is Hold, anything else truncates
    /// to a slot index
    pub fn from_control(value: f32) -> Self {
        if value < 0.0 {
            FrameSelector::Hold
        } else {
            FrameSelector::Index(value as usize)
        }
    }

    /// Encode back to a control value (-1 for Hold)
    pub fn to_control(self) -> f32 {
        match self {
            FrameSelector::Hold => -1.0,
            FrameSelector::Index(index) => index as f32,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameBank {
    frames: Vec<FrequencyFrame>,
}

impl FrameBank {
    /// Preallocate `count` silent frames of `samples` points each
    ///
    /// Also builds the conversion lookup tables so that the first analyzer
    /// call does not.
    pub fn new(count: usize, samples: usize) -> Self {
        warm_tables();
        Self {
            frames: (0..count).map(|_| FrequencyFrame::new(samples)).collect(),
        }
    }

    pub fn from_frames(frames: Vec<FrequencyFrame>) -> Self {
        warm_tables();
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Exact slot access without the out-of-range fallback
    pub fn frame(&self, index: usize) -> Option<&FrequencyFrame> {
        self.frames.get(index)
    }

    pub fn frame_mut(&mut self, index: usize) -> Option<&mut FrequencyFrame> {
        self.frames.get_mut(index)
    }

    fn slot(&self, index: usize) -> Result<usize, AnalysisError> {
        if self.frames.is_empty() {
            Err(AnalysisError::EmptyBank)
        } else if index < self.frames.len() {
            Ok(index)
        } else {
            Ok(0)
        }
    }

    /// Resolve a selector index to a frame, out-of-range indices reading slot 0
    pub fn resolve(&mut self, index: usize) -> Result<&mut FrequencyFrame, AnalysisError> {
        let slot = self.slot(index)?;
        Ok(&mut self.frames[slot])
    }

    /// Resolve two indices for a two-buffer analyzer
    ///
    /// The first frame of the pair is always the one named by `first`. Two
    /// indices that land on the same slot yield [`FramePair::Aliased`].
    pub fn resolve_pair(
        &mut self,
        first: usize,
        second: usize,
    ) -> Result<FramePair<'_>, AnalysisError> {
        let first = self.slot(first)?;
        let second = self.slot(second)?;

        if first == second {
            return Ok(FramePair::Aliased(&mut self.frames[first]));
        }

        let (low, high) = (first.min(second), first.max(second));
        let (head, tail) = self.frames.split_at_mut(high);
        let (low_frame, high_frame) = (&mut head[low], &mut tail[0]);
        if first < second {
            Ok(FramePair::Distinct(low_frame, high_frame))
        } else {
            Ok(FramePair::Distinct(high_frame, low_frame))
        }
    }

    /// Exchange two slots, e.g. to turn "current" into "previous"
    pub fn swap(&mut self, a: usize, b: usize) {
        if a < self.frames.len() && b < self.frames.len() {
            self.frames.swap(a, b);
        }
    }
}
