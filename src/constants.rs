/// Page contract and host-timing constants for the web front-end.
///
/// Element names here must match the markup; behaviour numbers for the particle
/// field and the drone live in `core::constants`.
// Elements
pub const PARTICLE_CANVAS_ID: &str = "particles";
pub const AUDIO_TOGGLE_ID: &str = "audioToggle";
pub const SCROLL_HINT_ID: &str = "scrollHint";
pub const SCENE_SELECTOR: &str = ".scene";
pub const PANEL_SELECTOR: &str = ".section-panel";

// Classes and properties
pub const ACTIVE_CLASS: &str = "is-active";
pub const HIDDEN_CLASS: &str = "is-hidden";
pub const PLAYING_CLASS: &str = "is-playing";
pub const PROGRESS_PROPERTY: &str = "--scene-progress";

// Trigger line as a fraction of viewport height ("top center" / "bottom center")
pub const TRIGGER_LINE_FRACTION: f64 = 0.5;

// Quiet window before layout-dependent geometry is recomputed after resizes
pub const RESIZE_DEBOUNCE_MS: u64 = 250;
