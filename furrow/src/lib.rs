//! # furrow
//!
//! Geometry derived from a selected map feature: points spaced along a line,
//! or parallel rows laid across a polygon and clipped to it.
//!
//! All generation happens in geographic lon/lat. The map's display frame is
//! reached through a [`Projection`].
//!
//! ## Rust Lesson #7: Modules
//!
//! Rust modules are like ES6 modules but more explicit:
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level
//!
//! Unlike Node.js, you must explicitly declare every module.

pub mod clip;
pub mod error;
pub mod extract;
pub mod geodesy;
pub mod geometry;
pub mod gesture;
pub mod grid;
pub mod projection;
pub mod ring;
pub mod rows;
pub mod sample;
pub mod session;
pub mod transform;

// Re-export common types at crate root for convenience.
pub use clip::{clip_rows, ScanDirection, Segment};
pub use error::{FurrowError, Result};
pub use extract::extract_geographic_rings;
pub use geometry::{BoundingBox, Line, MultiPolygon, Point, Polygon, Shape};
pub use gesture::{GestureEnd, GestureMode};
pub use grid::{build_grid, Grid};
pub use projection::{Identity, Projection, WebMercator};
pub use ring::{close_and_validate, Ring};
pub use rows::{RowGridState, RowPreview, RowsForm};
pub use sample::{generate_points_on_line, sample_along_line, PointsForm, SampleOptions, StartFrom};
pub use session::RowsSession;
