use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure =
            wasm_bindgen::closure::Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// All elements matching `selector` that are HTML elements, in document order.
pub fn query_all(document: &web::Document, selector: &str) -> Vec<web::HtmlElement> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<web::HtmlElement>().ok())
        .collect()
}

/// Window inner size in CSS pixels.
pub fn viewport_size(window: &web::Window) -> Option<(f64, f64)> {
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    Some((w, h))
}

/// Size the canvas backing store to the viewport times devicePixelRatio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        if let Some((css_w, css_h)) = viewport_size(&w) {
            let w_px = (css_w * dpr) as u32;
            let h_px = (css_h * dpr) as u32;
            if canvas.width() != w_px.max(1) || canvas.height() != h_px.max(1) {
                canvas.set_width(w_px.max(1));
                canvas.set_height(h_px.max(1));
            }
        }
    }
}
