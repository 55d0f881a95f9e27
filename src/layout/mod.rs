pub mod engine;
pub mod fit;
pub mod markers;

pub use engine::{LayoutConfig, LayoutEngine, LayoutMode, Materialization, ResolvedLayout, automatic_position};
pub use fit::{FitError, SurfaceSize, derive_automatic_from_overrides};
pub use markers::{Anchor, HOST_ID, MarkerKey, MarkerKind, OverrideMap, Point};
