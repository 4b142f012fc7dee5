pub mod constants;
pub mod debounce;
pub mod detector;
pub mod drone;
pub mod particles;
pub mod ramp;
pub mod sections;

pub use debounce::*;
pub use detector::*;
pub use drone::*;
pub use particles::*;
pub use ramp::*;
pub use sections::*;
