use crate::constants::PLAYING_CLASS;
use crate::core::PlaybackState;
use web_sys as web;

/// Reflect the drone state on the toggle button.
pub fn set_audio_button(button: &web::Element, state: PlaybackState) {
    let playing = state == PlaybackState::Active;
    _ = button.class_list().toggle_with_force(PLAYING_CLASS, playing);
    _ = button.set_attribute("aria-pressed", if playing { "true" } else { "false" });
}

pub fn mark_audio_unavailable(button: &web::Element) {
    _ = button.class_list().remove_1(PLAYING_CLASS);
    _ = button.set_attribute("aria-disabled", "true");
}
