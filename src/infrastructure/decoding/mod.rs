//! Decoding infrastructure module
//!
//! Symphonia decodes every supported container; rubato moves the result
//! onto the render rate.

mod resample;
mod symphonia_decoder;

pub use resample::resample;
pub use symphonia_decoder::{SymphoniaDecoder, SymphoniaMetadataReader};
