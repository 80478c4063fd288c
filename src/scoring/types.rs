#[derive(Debug, Clone, PartialEq)]
/// A candidate that survived thresholding, with its cosine similarity.
pub struct RankedMatch<I> {
    /// Caller-supplied candidate identifier.
    pub id: I,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
}

impl<I> RankedMatch<I> {
    pub fn new(id: I, score: f32) -> Self {
        Self { id, score }
    }

    /// Returns `true` if `score` strictly exceeds `threshold`.
    pub fn exceeds_threshold(&self, threshold: f32) -> bool {
        self.score > threshold
    }
}

impl<I: std::fmt::Display> std::fmt::Display for RankedMatch<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (score: {:.4})", self.id, self.score)
    }
}
