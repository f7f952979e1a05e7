//! Domain models handed to screens and front-ends.
//!
//! - `Hero`: a catalogue entry
//! - `Location`, `Coordinate`: places a hero has been sighted
//! - `Transformation`: a hero's alternate forms

pub mod hero;
pub mod location;
pub mod transformation;

pub use hero::Hero;
pub use location::{Coordinate, Location};
pub use transformation::Transformation;
