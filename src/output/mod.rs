//! Serialization of traced shapes.

pub mod svg;

pub use svg::write_svg;
