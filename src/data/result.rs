//! Reduction result record.

/// A 1D reduction profile: intensity versus coordinate.
///
/// The coordinate vector is in the unit requested by the integration job.
/// Results are produced once per (image, request) pair and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegrationResult {
    /// Coordinate values, in the requested output unit.
    pub x: Vec<f64>,

    /// Intensity values.
    pub y: Vec<f64>,
}

impl IntegrationResult {
    /// Create a new result.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    /// Number of points in the profile.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check if the profile is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_accessors() {
        let result = IntegrationResult::new(vec![0.1, 0.2], vec![10.0, 20.0]);
        assert_eq!(result.len(), 2);
        assert!(!result.is_empty());
    }
}
