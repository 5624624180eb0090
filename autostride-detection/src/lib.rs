pub mod detection;
pub mod error;

pub use detection::{Detection, DetectionSet, Keypoint};
pub use error::DetectionError;
