//! Frequency-domain sample produced by the analyzer once per frame.

use std::ops::Range;

/// Number of lowest bins averaged into the bass energy
pub const BASS_BINS: usize = 8;

/// First bin of the high-frequency band
pub const HIGH_BAND_START: usize = 40;

/// Byte magnitudes (0-255), one per frequency bin, lowest frequency first
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrequencySample {
    bins: Vec<u8>,
}

impl FrequencySample {
    pub fn new(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    pub fn silent(len: usize) -> Self {
        Self { bins: vec![0; len] }
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    pub(crate) fn bins_mut(&mut self) -> &mut [u8] {
        &mut self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Magnitude of a bin, 0 when out of range
    pub fn get(&self, idx: usize) -> u8 {
        self.bins.get(idx).copied().unwrap_or(0)
    }

    /// Arithmetic mean over a bin range, clipped to the sample length
    pub fn band_average(&self, range: Range<usize>) -> f32 {
        let end = range.end.min(self.bins.len());
        let start = range.start.min(end);
        if start == end {
            return 0.0;
        }
        let sum: u32 = self.bins[start..end].iter().map(|&b| b as u32).sum();
        sum as f32 / (end - start) as f32
    }

    /// Beat detection signal: mean of the lowest [`BASS_BINS`] bins
    pub fn bass_energy(&self) -> f32 {
        self.band_average(0..BASS_BINS)
    }

    pub fn high_energy(&self) -> f32 {
        self.band_average(HIGH_BAND_START..self.bins.len())
    }
}
