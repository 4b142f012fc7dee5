use crate::constants::{PROGRESS_PROPERTY, TRIGGER_LINE_FRACTION};
use crate::core::{SectionDetector, TriggerRegion};
use crate::dom;
use crate::panels::PageSections;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Scene elements plus the detector that tracks them.
pub struct ScrollSync {
    scenes: Vec<web::HtmlElement>,
    detector: SectionDetector<PageSections>,
}

impl ScrollSync {
    pub fn new(scenes: Vec<web::HtmlElement>, sink: PageSections) -> Self {
        let mut detector = SectionDetector::new(sink);
        detector.register(measure_regions(&scenes));
        Self { scenes, detector }
    }

    pub fn current_section(&self) -> Option<usize> {
        self.detector.current()
    }

    pub fn on_scroll(&mut self) {
        let Some(line) = trigger_line() else {
            return;
        };
        self.detector.observe(line);
        self.publish_progress();
    }

    /// Re-measure scene boundaries after layout changed.
    pub fn refresh(&mut self) {
        let changed = self.detector.refresh(measure_regions(&self.scenes));
        log::info!("[resize] regions refreshed, section changes={}", changed);
        self.on_scroll();
    }

    fn publish_progress(&mut self) {
        for (index, progress) in self.detector.progress_updates() {
            if let Some(scene) = self.scenes.get(index) {
                _ = scene
                    .style()
                    .set_property(PROGRESS_PROPERTY, &format!("{:.4}", progress));
            }
        }
    }
}

fn trigger_line() -> Option<f32> {
    let window = web::window()?;
    let scroll_y = window.scroll_y().ok()?;
    let (_, height) = dom::viewport_size(&window)?;
    Some((scroll_y + height * TRIGGER_LINE_FRACTION) as f32)
}

// Scene top/bottom in document coordinates.
fn measure_regions(scenes: &[web::HtmlElement]) -> Vec<TriggerRegion> {
    let scroll_y = web::window()
        .and_then(|w| w.scroll_y().ok())
        .unwrap_or(0.0);
    scenes
        .iter()
        .enumerate()
        .map(|(index, el)| {
            let rect = el.get_bounding_client_rect();
            TriggerRegion {
                index,
                start: (rect.top() + scroll_y) as f32,
                end: (rect.bottom() + scroll_y) as f32,
            }
        })
        .collect()
}

pub fn wire_scroll(sync: Rc<RefCell<ScrollSync>>) {
    if let Some(window) = web::window() {
        let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move || {
            sync.borrow_mut().on_scroll();
        }) as Box<dyn FnMut()>);
        _ = window.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}
