//! Fixed-size frame windows over a PCM block

/// Audio is processed by frames of 1152 samples per channel (MPEG-1 Layer III)
pub const MP3_FRAME_SIZE: usize = 1152;

/// Lazy iterator over consecutive frame windows of a sample slice.
///
/// Yields `[0, F)`, `[F, 2F)`, ... with the final window holding the
/// remainder. An empty input yields nothing and an input whose length is an
/// exact multiple of `F` has no empty trailing window.
#[derive(Debug, Clone)]
pub struct FrameChunker<'a, T> {
    samples: &'a [T],
    frame_size: usize,
    start: usize,
}

impl<'a, T> FrameChunker<'a, T> {
    /// Create a chunker over `samples`.
    ///
    /// # Panics
    /// Panics if `frame_size` is zero.
    pub fn new(samples: &'a [T], frame_size: usize) -> Self {
        assert!(frame_size > 0, "frame size must be non-zero");
        Self {
            samples,
            frame_size,
            start: 0,
        }
    }

    /// Chunker using the MP3 frame size
    pub fn mp3(samples: &'a [T]) -> Self {
        Self::new(samples, MP3_FRAME_SIZE)
    }
}

impl<'a, T> Iterator for FrameChunker<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.start >= self.samples.len() {
            return None;
        }
        let end = (self.start + self.frame_size).min(self.samples.len());
        let window = &self.samples[self.start..end];
        self.start = end;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = frame_count(self.samples.len() - self.start, self.frame_size);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for FrameChunker<'_, T> {}

impl<T> std::iter::FusedIterator for FrameChunker<'_, T> {}

/// Number of windows a block of `len` samples splits into
pub fn frame_count(len: usize, frame_size: usize) -> usize {
    len.div_ceil(frame_size)
}
