use crate::audio::{WebDrone, WebSynth};
use crate::constants::AUDIO_TOGGLE_ID;
use crate::core::{AudioError, PlaybackState};
use crate::dom;
use crate::events::ScrollSync;
use crate::ui;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// The toggle button is the only way audio ever starts.
pub fn wire_audio_toggle(
    document: &web::Document,
    drone: Rc<RefCell<WebDrone>>,
    sync: Rc<RefCell<ScrollSync>>,
) {
    let Some(button) = document.get_element_by_id(AUDIO_TOGGLE_ID) else {
        log::warn!("missing #{}; audio stays off", AUDIO_TOGGLE_ID);
        return;
    };
    dom::add_click_listener(document, AUDIO_TOGGLE_ID, move || {
        on_toggle(&drone, &sync, &button);
    });
}

fn on_toggle(drone: &Rc<RefCell<WebDrone>>, sync: &Rc<RefCell<ScrollSync>>, button: &web::Element) {
    if !drone.borrow().is_available() {
        return;
    }
    let outcome = drone.borrow_mut().toggle();
    match outcome {
        Ok(PlaybackState::Active) => {
            // Catch up with wherever the reader scrolled while audio was off.
            let section = sync.borrow().current_section();
            if let Some(index) = section {
                drone.borrow_mut().transition_to(index);
            }
            ui::set_audio_button(button, PlaybackState::Active);
            let pending = drone
                .borrow_mut()
                .context_mut()
                .and_then(WebSynth::take_pending_resume);
            if let Some(promise) = pending {
                await_resume(promise, drone.clone(), button.clone());
            }
        }
        Ok(PlaybackState::Idle) => ui::set_audio_button(button, PlaybackState::Idle),
        Err(AudioError::Unavailable) => ui::mark_audio_unavailable(button),
        Err(e) => log::warn!("[drone] start skipped: {}", e),
    }
}

fn await_resume(promise: js_sys::Promise, drone: Rc<RefCell<WebDrone>>, button: web::Element) {
    spawn_local(async move {
        if let Err(e) = JsFuture::from(promise).await {
            log::warn!("[drone] resume rejected: {:?}", e);
            drone.borrow_mut().stop();
            ui::set_audio_button(&button, PlaybackState::Idle);
        }
    });
}
