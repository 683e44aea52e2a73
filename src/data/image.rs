//! Detector image record.

use ndarray::Array2;

/// A raw 2D detector image.
///
/// Decoding pixel arrays and headers from files is the responsibility of an
/// external collaborator; the core only consumes the decoded array.
#[derive(Clone, Debug)]
pub struct DetectorImage {
    /// Unique identifier for this image (typically the file stem).
    pub id: String,

    /// Pixel intensities, row-major.
    pub data: Array2<f64>,
}

impl DetectorImage {
    /// Create a new image record.
    pub fn new(id: impl Into<String>, data: Array2<f64>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Image shape as (rows, cols).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        let s = self.data.shape();
        (s[0], s[1])
    }

    /// Check if the image has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
