// Progress-tracker layout and rendering.
// The engine is pure; rendering builds a visual tree that serializes to HTML.

pub mod engine;
pub mod handlers;
pub mod render;
pub mod sheet;

// Re-export the types the domain model is built on.
pub use engine::{LabelStyle, LayoutError};
