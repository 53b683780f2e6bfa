/// A fixed-shape numeric observation.
///
/// Mirrors a dense tensor: `data` is stored row-major and its length always
/// equals the product of `shape`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl Observation {
    /// Builds an observation with an explicit shape.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` differs from the product of `shape`.
    #[must_use]
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Self {
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "observation data does not fill its shape"
        );
        Self { data, shape }
    }

    /// Builds a one-dimensional observation of shape `[data.len()]`.
    #[must_use]
    pub fn vector(data: Vec<f32>) -> Self {
        let shape = vec![data.len()];
        Self { data, shape }
    }

    /// An all-zero observation of the given shape.
    #[must_use]
    pub fn zeros(shape: &[usize]) -> Self {
        let len = shape.iter().product();
        Self { data: vec![0.0; len], shape: shape.to_vec() }
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when every element is exactly zero.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }
}
