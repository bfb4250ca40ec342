//! Built-in decorators

mod basic_filter;
mod blur;
mod drop_shadow;
mod gradient;
mod linear_gradient;

pub use basic_filter::{BasicFilterDecorator, BasicFilterInstancer, BasicFilterValue};
pub use blur::{BlurDecorator, BlurInstancer};
pub use drop_shadow::{DropShadowDecorator, DropShadowInstancer};
pub use gradient::{GradientDecorator, GradientDirection, GradientInstancer};
pub use linear_gradient::{
    gradient_points, resolve_stops, ColorStop, GradientAngle, GradientPoints, LinearGradientDecorator,
    LinearGradientInstancer, StopPosition,
};
