/// objview core library - wireframe mesh loading and transforms
///
/// This library turns OBJ text into a flat, renderer-ready mesh (vertex
/// positions plus line-segment index pairs) and edits that mesh in place with
/// translate, scale and rotate.

pub mod geometry;
pub mod obj;
pub mod projection;
pub mod transform;

// Re-export commonly used types
pub use geometry::{Bounds, GeometryError, Mesh};
pub use obj::{load, load_with, LoadError, LoadOptions, ParseMode};
pub use projection::{Camera, ProjectionMode};
pub use transform::Transform;
