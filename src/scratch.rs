// ScratchBuffer - analyzer-owned per-bin storage reused across frames
//
// Allocated lazily on the first frame an analyzer sees and never resized
// afterwards. A frame with a different bin count is reported as
// `AnalysisError::UnsupportedResize`; reallocating would silently discard the
// history that stateful analyzers keep in the same buffer.

use crate::error::AnalysisError;

/// Lazily materialised scratch area sized in bins
#[derive(Debug, Clone, Default)]
pub struct ScratchBuffer<T> {
    storage: Option<Vec<T>>,
}

impl<T: Copy + Default> ScratchBuffer<T> {
    /// Create an empty (unmaterialised) buffer
    pub fn new() -> Self {
        Self { storage: None }
    }

    /// Number of bins the buffer was materialised for, if any
    pub fn capacity_bins(&self) -> Option<usize> {
        self.storage.as_ref().map(Vec::len)
    }

    pub fn is_materialized(&self) -> bool {
        self.storage.is_some()
    }

    /// Borrow the buffer for a frame of `bin_count` bins
    ///
    /// The first call allocates `bin_count` default values (zeroes for the
    /// float types used here). Later calls with a different size fail with
    /// `UnsupportedResize` and leave the stored values untouched.
    pub fn acquire(&mut self, bin_count: usize) -> Result<&mut [T], AnalysisError> {
        match self.capacity_bins() {
            Some(allocated) if allocated != bin_count => {
                return Err(AnalysisError::UnsupportedResize {
                    allocated,
                    requested: bin_count,
                });
            }
            Some(_) => {}
            None => {
                log::debug!("[Scratch] Materialising scratch buffer for {} bins", bin_count);
                self.storage = Some(vec![T::default(); bin_count]);
            }
        }

        Ok(self
            .storage
            .as_mut()
            .map(Vec::as_mut_slice)
            .unwrap_or_default())
    }

    /// Drop the storage; the next `acquire` allocates again
    pub fn release(&mut self) {
        self.storage = None;
    }
}
