//! Dataset conditioning: characterization, zero handling, and synthesis.

pub mod characterize;
pub mod synth;
pub mod zeros;

pub use characterize::*;
pub use synth::*;
pub use zeros::*;
