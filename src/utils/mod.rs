pub mod conference;
pub mod normalize;
pub mod selection;

pub use conference::*;
pub use normalize::*;
pub use selection::*;
