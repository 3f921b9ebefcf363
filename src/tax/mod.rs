//! Tax categories, regime datasets and rate resolution.

mod category;
mod combo;
mod regime;
mod resolver;

pub use category::*;
pub use combo::*;
pub use regime::*;
pub use resolver::*;
