//! Unit types: Dp, Px, and conversions

/// Density-independent (logical) units
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Dp(pub f32);

impl Dp {
    pub fn to_px(&self, density: f32) -> Px {
        Px(self.0 * density)
    }

    pub fn from_px(px: Px, density: f32) -> Self {
        Self(px.0 / density)
    }
}

/// Raw device pixels
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Px(pub f32);

impl Px {
    /// Rounds to the nearest whole device pixel, ties to even.
    pub fn round(self) -> Self {
        Self(self.0.round_ties_even())
    }

    pub fn to_dp(&self, density: f32) -> Dp {
        Dp::from_px(*self, density)
    }
}
