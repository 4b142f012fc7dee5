pub mod resize;
pub mod scroll;
pub mod toggle;

pub use resize::wire_resize;
pub use scroll::{wire_scroll, ScrollSync};
pub use toggle::wire_audio_toggle;
