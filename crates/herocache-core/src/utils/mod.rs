//! Small text helpers shared by the store and the domain models.

pub mod text;

pub use text::fold_key;
