//! Utilities for working with probabilities.

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn normalise(&mut self, target: f64) -> f64;
    fn scale(&mut self, factor: f64);
    fn invert(&self) -> impl Iterator<Item = f64> + '_;
    fn dot(&self, other: &[f64]) -> f64;
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// Scales the slice so that its elements sum to `target`, returning the sum prior to scaling.
    fn normalise(&mut self, target: f64) -> f64 {
        let sum = self.sum();
        self.scale(target / sum);
        sum
    }

    fn scale(&mut self, factor: f64) {
        for element in self {
            *element *= factor;
        }
    }

    fn invert(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|value| 1.0 / value)
    }

    /// Inner product. Only the overlapping prefix of the two slices is considered.
    fn dot(&self, other: &[f64]) -> f64 {
        self.iter().zip(other).map(|(a, b)| a * b).sum()
    }
}
