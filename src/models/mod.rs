pub mod archive;
pub mod price;

pub use archive::*;
pub use price::*;
