// Behaviour tuning shared by the particle field and the drone engine.
// Units: particle values are CSS pixels per frame; audio values are seconds of
// audio-context time.

// Particle pool
pub const PARTICLE_COUNT: usize = 80;
pub const PARTICLE_MARGIN: f32 = 10.0; // off-surface band used for recycling and wraparound
pub const PARTICLE_RGB: [u8; 3] = [200, 190, 175];

// Fresh particle distributions: value = MIN + U(0,1) * SPAN
pub const PARTICLE_SIZE_MIN: f32 = 0.5;
pub const PARTICLE_SIZE_SPAN: f32 = 2.0;
pub const RISE_SPEED_MIN: f32 = 0.1;
pub const RISE_SPEED_SPAN: f32 = 0.3;
pub const LATERAL_SPEED_SPAN: f32 = 0.2; // centred on zero
pub const OPACITY_MIN: f32 = 0.1;
pub const OPACITY_SPAN: f32 = 0.3;
pub const DRIFT_SPEED_MIN: f32 = 0.002;
pub const DRIFT_SPEED_SPAN: f32 = 0.005;
pub const DRIFT_AMPLITUDE: f32 = 0.3; // horizontal wander per frame at sin(drift) = 1

// Drone layers
pub const HARMONIC_RATIO: f32 = 1.5;
pub const SUB_RATIO: f32 = 0.5;
pub const BASE_LEVEL: f32 = 0.5;
pub const HARMONIC_LEVEL: f32 = 0.2;
pub const SUB_LEVEL: f32 = 0.3;

// Drone timing
pub const START_RAMP_SEC: f64 = 2.0;
pub const STOP_RAMP_SEC: f64 = 1.0;
pub const TEARDOWN_DELAY_SEC: f64 = 1.1; // layers outlive the stop fade by a hair
pub const TIMBRE_RAMP_SEC: f64 = 2.0;
pub const VOLUME_RAMP_SEC: f64 = 1.5;
