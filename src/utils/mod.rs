pub mod channels;
pub mod greeting;
pub mod imaging;

pub use channels::AppChannels;
pub use greeting::{greeting_for_hour, hausa_date};
