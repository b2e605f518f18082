pub mod api;
pub mod conference;
pub mod paper;
pub mod user;

pub use api::*;
pub use conference::*;
pub use paper::*;
pub use user::*;
