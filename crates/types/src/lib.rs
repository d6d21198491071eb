pub mod geometry;
pub mod heading;
pub mod ids;
pub mod settings;

pub use geometry::{ElementRect, Viewport};
pub use heading::{FlatHeading, NestedHeading, PageInfo};
pub use ids::{HeadingId, TabId, WindowId};
pub use settings::{Settings, MAX_DEPTH_RANGE};
