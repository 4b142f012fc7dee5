#![cfg(target_arch = "wasm32")]
use crate::audio::{WebDrone, WebSynth};
use crate::constants::{RESIZE_DEBOUNCE_MS, SCENE_SELECTOR};
use crate::core::{usable_section_count, Debouncer, SectionTable};
use crate::events::ScrollSync;
use crate::panels::PageSections;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use web_sys as web;

mod audio;
mod constants;
mod core;
mod dom;
mod events;
mod frame;
mod panels;
mod render;
mod ui;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("elegy-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    // Particles run on their own; a missing canvas only disables them.
    let particles = frame::ParticleView::attach(&document);

    // No AudioContext is created until the toggle is pressed.
    let sections = SectionTable::default();
    let drone: Rc<RefCell<WebDrone>> = Rc::new(RefCell::new(WebDrone::new(
        sections.clone(),
        WebSynth::connect,
    )));

    let page = PageSections::collect(&document, drone.clone());
    let scenes = dom::query_all(&document, SCENE_SELECTOR);
    check_section_counts(scenes.len(), page.panel_count(), sections.len());

    let scroll = Rc::new(RefCell::new(ScrollSync::new(scenes, page)));
    scroll.borrow_mut().on_scroll();
    events::wire_scroll(scroll.clone());

    let layout = Rc::new(RefCell::new(Debouncer::new(Duration::from_millis(
        RESIZE_DEBOUNCE_MS,
    ))));
    events::wire_resize(
        particles.as_ref().map(|p| p.canvas().clone()),
        layout.clone(),
    );
    events::wire_audio_toggle(&document, drone.clone(), scroll.clone());

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        particles,
        layout,
        scroll,
        drone,
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}

fn check_section_counts(scenes: usize, panels: usize, configs: usize) {
    let usable = usable_section_count(scenes, panels, configs);
    if scenes != usable || panels != usable || configs != usable {
        log::warn!(
            "[sections] scenes={} panels={} audio configs={}; indices past {} are partly ignored",
            scenes,
            panels,
            configs,
            usable
        );
    }
}
