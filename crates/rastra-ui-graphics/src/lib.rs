//! Pure math/data for units and measurements in Rastra
//!
//! This crate contains the point and size primitives, the logical/physical unit types and
//! [`ScaledSize`], the dual unit/pixel measurement that the surface cache
//! keys on.

mod geometry;
mod scaled_size;
mod unit;

pub use geometry::*;
pub use scaled_size::*;
pub use unit::*;

pub mod prelude {
    pub use crate::geometry::{Point, Size};
    pub use crate::scaled_size::ScaledSize;
    pub use crate::unit::{Dp, Px};
}
