pub mod booking;
pub mod setting;
pub mod specialist;
pub mod stats;
pub mod time_slot;

pub use booking::*;
pub use setting::*;
pub use specialist::*;
pub use stats::*;
pub use time_slot::*;
