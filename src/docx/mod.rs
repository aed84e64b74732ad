pub mod document;
pub mod package;
pub mod xml;

pub use document::{DocumentOptions, DocxDocument};
pub use package::DocxPackage;
