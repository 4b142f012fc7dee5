use crate::core::Debouncer;
use crate::dom;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Resize keeps the canvas backing store in step immediately; region re-measurement
/// waits for the debouncer, which the frame loop polls.
pub fn wire_resize(canvas: Option<web::HtmlCanvasElement>, layout: Rc<RefCell<Debouncer<()>>>) {
    if let Some(canvas) = &canvas {
        dom::sync_canvas_backing_size(canvas);
    }
    let resize_closure = Closure::wrap(Box::new(move || {
        if let Some(canvas) = &canvas {
            dom::sync_canvas_backing_size(canvas);
        }
        layout.borrow_mut().schedule(Instant::now(), ());
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}
