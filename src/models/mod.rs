pub mod content;
pub mod image;
pub mod result;

pub use content::*;
pub use image::*;
pub use result::*;
