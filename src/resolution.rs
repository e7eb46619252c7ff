//! Image and window resolutions.

use std::fmt;

/// Resolution of an image or view, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    /// The fixed size of the hand-region preview window.
    pub const PREVIEW: Self = Self::new(200, 200);

    /// Creates a new resolution.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is 0.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        assert!(width != 0 && height != 0, "resolution cannot be zero");
        Self { width, height }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the total number of pixels of an image of this resolution.
    #[inline]
    pub fn num_pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
