mod bit;
pub use bit::*;

pub mod floating_label;
pub mod input;
pub mod restart;
pub mod viewport;

mod ribbit_communication;
pub use ribbit_communication::*;
