mod easing;
mod focus;
mod geometry;
mod navigator;
mod palette;
mod radius;
mod render;
mod scale;
mod search;
mod window;

pub use easing::Easing;
pub use focus::FocusOrigin;
pub use geometry::polar;
pub use navigator::{NavEvent, NavSource, Navigator, RenderPass, SceneStyle};
pub use palette::ColourStrategy;
pub use render::{Scene, SegmentElement};
pub use scale::RADIAL_EXTENT;
pub use search::{label_for_node, search, suggestion_label};
