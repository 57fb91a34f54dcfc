pub struct MaeLoss;

impl MaeLoss {
    /// Scalar MAE: mean(|expected - predicted|)
    ///
    /// # Panics
    /// If the slices differ in length.
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        assert_eq!(predicted.len(), expected.len(), "MAE over slices of different widths");
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| (y - p).abs())
            .sum::<f64>() / n
    }
}
