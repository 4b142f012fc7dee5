use crate::audio::WebDrone;
use crate::constants::PARTICLE_CANVAS_ID;
use crate::core::constants::PARTICLE_COUNT;
use crate::core::{Debouncer, ParticleField};
use crate::dom;
use crate::events::ScrollSync;
use crate::render::CanvasSurface;
use instant::Instant;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Particle canvas with its field. Absent when the page has no usable 2D canvas.
pub struct ParticleView {
    canvas: web::HtmlCanvasElement,
    surface: CanvasSurface,
    field: ParticleField<StdRng>,
}

impl ParticleView {
    pub fn attach(document: &web::Document) -> Option<Self> {
        let Some(el) = document.get_element_by_id(PARTICLE_CANVAS_ID) else {
            log::warn!("[particles] missing #{}; field disabled", PARTICLE_CANVAS_ID);
            return None;
        };
        let canvas = match el.dyn_into::<web::HtmlCanvasElement>() {
            Ok(c) => c,
            Err(_) => {
                log::warn!("[particles] #{} is not a canvas", PARTICLE_CANVAS_ID);
                return None;
            }
        };
        let Some(surface) = CanvasSurface::attach(&canvas) else {
            log::warn!("[particles] no 2d context; field disabled");
            return None;
        };
        dom::sync_canvas_backing_size(&canvas);
        let (w, h) = css_size(&canvas);
        let field = ParticleField::new(w, h, PARTICLE_COUNT, StdRng::from_entropy());
        log::info!("[particles] {} particles on {:.0}x{:.0}", field.len(), w, h);
        Some(Self {
            canvas,
            surface,
            field,
        })
    }

    pub fn canvas(&self) -> &web::HtmlCanvasElement {
        &self.canvas
    }

    fn frame(&mut self) {
        let ratio = pixel_ratio();
        self.surface.set_pixel_ratio(ratio);
        let size = css_size(&self.canvas);
        if size != self.field.bounds() {
            self.field.on_resize(size.0, size.1);
        }
        self.field.step();
        self.field.render(&mut self.surface);
    }
}

fn pixel_ratio() -> f64 {
    web::window().map_or(1.0, |w| w.device_pixel_ratio())
}

fn css_size(canvas: &web::HtmlCanvasElement) -> (f32, f32) {
    let ratio = pixel_ratio();
    (
        (canvas.width() as f64 / ratio) as f32,
        (canvas.height() as f64 / ratio) as f32,
    )
}

pub struct FrameContext {
    pub particles: Option<ParticleView>,
    pub layout: Rc<RefCell<Debouncer<()>>>,
    pub scroll: Rc<RefCell<ScrollSync>>,
    pub drone: Rc<RefCell<WebDrone>>,
}

impl FrameContext {
    pub fn frame(&mut self) {
        if let Some(view) = &mut self.particles {
            view.frame();
        }

        let due = self.layout.borrow_mut().poll(Instant::now());
        if due.is_some() {
            self.scroll.borrow_mut().refresh();
        }

        let released = self.drone.borrow_mut().collect_retired();
        if released > 0 {
            log::debug!("[drone] released {} layers", released);
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
