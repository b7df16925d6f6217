use crate::error::TreeError;

/// Weight-balance factor of a scapegoat tree.
///
/// Always strictly between 0.5 and 1.0. Smaller values rebuild more often and
/// keep the tree shallower; larger values rebuild rarely and tolerate skew.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Alpha(f64);

impl Alpha {
    /// 2/3: rebuild a subtree once one side holds more than two thirds of it.
    pub const DEFAULT: Alpha = Alpha(2.0 / 3.0);

    pub fn new(alpha: f64) -> Result<Self, TreeError> {
        // NaN fails both comparisons.
        if alpha > 0.5 && alpha < 1.0 {
            Ok(Self(alpha))
        } else {
            Err(TreeError::InvalidAlpha(alpha))
        }
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Base of the logarithm in the depth bound, `1 / alpha`. Lies in (1, 2).
    #[inline]
    pub(crate) fn inverse(self) -> f64 {
        1.0 / self.0
    }
}

impl Default for Alpha {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for Alpha {
    type Error = TreeError;

    fn try_from(alpha: f64) -> Result<Self, Self::Error> {
        Self::new(alpha)
    }
}
