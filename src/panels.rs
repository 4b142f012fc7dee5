use crate::audio::WebDrone;
use crate::constants::{ACTIVE_CLASS, HIDDEN_CLASS, PANEL_SELECTOR, SCROLL_HINT_ID};
use crate::core::SectionSink;
use crate::dom;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

/// The page's reaction to a section change: panel, scroll hint and drone.
pub struct PageSections {
    panels: Vec<web::HtmlElement>,
    hint: Option<web::Element>,
    drone: Rc<RefCell<WebDrone>>,
}

impl PageSections {
    pub fn collect(document: &web::Document, drone: Rc<RefCell<WebDrone>>) -> Self {
        let panels = dom::query_all(document, PANEL_SELECTOR);
        let hint = document.get_element_by_id(SCROLL_HINT_ID);
        if hint.is_none() {
            log::debug!("[sections] no #{} element", SCROLL_HINT_ID);
        }
        Self {
            panels,
            hint,
            drone,
        }
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }
}

impl SectionSink for PageSections {
    fn switch_panel(&mut self, index: usize) {
        if index >= self.panels.len() {
            log::debug!("[sections] no panel for section {}", index);
            return;
        }
        for (i, panel) in self.panels.iter().enumerate() {
            _ = panel.class_list().toggle_with_force(ACTIVE_CLASS, i == index);
        }
    }

    fn set_scroll_hint_visible(&mut self, visible: bool) {
        if let Some(el) = &self.hint {
            _ = el.class_list().toggle_with_force(HIDDEN_CLASS, !visible);
        }
    }

    fn transition_audio(&mut self, index: usize) {
        self.drone.borrow_mut().transition_to(index);
    }
}
