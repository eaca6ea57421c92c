//! Browser host: canvas surface, animation frames, DOM listeners, LocalStorage
//!
//! Everything here owns its JS callbacks. `GameHandle::unmount` (or dropping
//! the handle) cancels the pending animation frame and removes every
//! listener it added.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, DeviceOrientationEvent, Document, Event,
    EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, Storage, VisibilityState, Window,
};

use super::Host;
use crate::engine::{
    Color, Engine, FrameHandle, FrameScheduler, Game, InputSource, Key, RawInput, Surface,
    TextAlign,
};
use crate::settings::Settings;
use crate::store::{KeyValueStore, StoreError};

#[derive(thiserror::Error, Debug)]
pub enum PlatformError {
    #[error("no window object")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    #[error("canvas #{0} not found")]
    CanvasNotFound(String),

    #[error("element #{0} is not a canvas")]
    NotACanvas(String),

    #[error("canvas has no 2d context")]
    NoContext,

    #[error("unknown game {0}")]
    UnknownGame(String),

    #[error("DOM call failed: {0}")]
    Js(String),
}

impl From<JsValue> for PlatformError {
    fn from(value: JsValue) -> Self {
        PlatformError::Js(format!("{:?}", value))
    }
}

/// `window.localStorage`; missing in some private modes, where reads come
/// back empty and writes fail
pub struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    pub fn open(window: &Window) -> Self {
        let storage = window.local_storage().ok().flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable, scores will not persist");
        }
        Self { storage }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self.storage.as_ref().ok_or(StoreError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StoreError::WriteRejected {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }
}

/// 2D canvas sized to the playfield, scaled for the device pixel ratio
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    size: Vec2,
    scale: f64,
}

impl CanvasSurface {
    pub fn new(
        canvas: &HtmlCanvasElement,
        width: f32,
        height: f32,
        pixel_ratio: f64,
    ) -> Result<Self, PlatformError> {
        canvas.set_width((width as f64 * pixel_ratio).round() as u32);
        canvas.set_height((height as f64 * pixel_ratio).round() as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or(PlatformError::NoContext)?
            .dyn_into()
            .map_err(|_| PlatformError::NoContext)?;
        ctx.scale(pixel_ratio, pixel_ratio)?;
        Ok(Self {
            ctx,
            size: Vec2::new(width, height),
            scale: pixel_ratio,
        })
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self, color: Color) {
        // Fill the whole canvas even while shaken
        self.ctx.save();
        let _ = self
            .ctx
            .set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(0.0, 0.0, self.size.x as f64, self.size.y as f64);
        self.ctx.restore();
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius.max(0.0) as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.fill();
    }

    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color, align: TextAlign) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .set_font(&format!("bold {}px system-ui, sans-serif", size.round()));
        self.ctx.set_text_align(match align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        let _ = self.ctx.translate(offset.x as f64, offset.y as f64);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }
}

/// `requestAnimationFrame` with one shared callback
pub struct RafScheduler {
    window: Window,
    callback: Option<Closure<dyn FnMut(f64)>>,
    last: Option<FrameHandle>,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: None,
            last: None,
        }
    }

    fn set_callback(&mut self, callback: Closure<dyn FnMut(f64)>) {
        self.callback = Some(callback);
    }

    /// Handle of the most recent request (the one about to fire)
    fn last(&self) -> FrameHandle {
        self.last.unwrap_or(FrameHandle(-1))
    }
}

impl FrameScheduler for RafScheduler {
    fn request(&mut self) -> FrameHandle {
        let id = match self.callback.as_ref() {
            Some(cb) => self
                .window
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .unwrap_or_else(|e| {
                    log::error!("requestAnimationFrame failed: {:?}", e);
                    -1
                }),
            None => -1,
        };
        let handle = FrameHandle(id);
        self.last = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if handle.0 >= 0 {
            let _ = self.window.cancel_animation_frame(handle.0);
        }
    }
}

type WebHost<G> = Host<G, LocalStore, RafScheduler, CanvasSurface>;

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// DOM event wiring for one mounted game
pub struct DomInput<G: Game + 'static> {
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    host: Weak<RefCell<WebHost<G>>>,
    listeners: Vec<Listener>,
}

impl<G: Game + 'static> DomInput<G> {
    fn new(
        window: Window,
        document: Document,
        canvas: HtmlCanvasElement,
        host: Weak<RefCell<WebHost<G>>>,
    ) -> Self {
        Self {
            window,
            document,
            canvas,
            host,
            listeners: Vec::new(),
        }
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(&RefCell<WebHost<G>>, Event) + 'static,
    ) -> Result<(), PlatformError> {
        let host = self.host.clone();
        let mut handler = handler;
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(host) = host.upgrade() {
                handler(&*host, event);
            }
        });
        let options = AddEventListenerOptions::new();
        // Handlers call preventDefault, so they must not be passive
        options.set_passive(false);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            callback,
        });
        Ok(())
    }

    fn add_all(&mut self) -> Result<(), PlatformError> {
        let window: EventTarget = self.window.clone().into();
        let document: EventTarget = self.document.clone().into();
        let canvas: EventTarget = self.canvas.clone().into();

        self.listen(&window, "keydown", |host, event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if let Some(key) = Key::from_dom(&event.key()) {
                if key.blocks_default() {
                    event.prevent_default();
                }
                send(host, RawInput::KeyDown {
                    key,
                    repeat: event.repeat(),
                });
            }
        })?;
        self.listen(&window, "keyup", |host, event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if let Some(key) = Key::from_dom(&event.key()) {
                send(host, RawInput::KeyUp(key));
            }
        })?;

        let element = self.canvas.clone();
        let to_playfield = move |host: &RefCell<WebHost<G>>, event: &MouseEvent| -> Option<Vec2> {
            let host = host.try_borrow().ok()?;
            let field = host.engine.rules().bounds();
            let client_w = element.client_width().max(1) as f32;
            let client_h = element.client_height().max(1) as f32;
            Some(Vec2::new(
                event.offset_x() as f32 * field.width / client_w,
                event.offset_y() as f32 * field.height / client_h,
            ))
        };
        for (kind, make) in [
            ("pointerdown", RawInput::PointerDown as fn(Vec2) -> RawInput),
            ("pointermove", RawInput::PointerMove),
            ("pointerup", RawInput::PointerUp),
        ] {
            let to_playfield = to_playfield.clone();
            self.listen(&canvas, kind, move |host, event| {
                let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                if kind == "pointerdown" {
                    event.prevent_default();
                }
                if let Some(p) = to_playfield(host, mouse) {
                    send(host, make(p));
                }
            })?;
        }
        // Keep touches from scrolling or zooming the page; pointer events
        // already carry the positions
        for kind in ["touchstart", "touchmove"] {
            self.listen(&canvas, kind, |_, event| event.prevent_default())?;
        }

        self.listen(&window, "deviceorientation", |host, event| {
            if let Some(gamma) = event
                .dyn_ref::<DeviceOrientationEvent>()
                .and_then(|e| e.gamma())
            {
                send(host, RawInput::Tilt(gamma as f32));
            }
        })?;
        self.listen(&window, "blur", |host, _| send(host, RawInput::Blur))?;

        let doc = self.document.clone();
        self.listen(&document, "visibilitychange", move |host, _| {
            if let Ok(mut host) = host.try_borrow_mut() {
                if doc.visibility_state() == VisibilityState::Hidden {
                    host.on_hidden();
                } else {
                    host.on_visible();
                }
            }
        })?;
        Ok(())
    }
}

fn send<G: Game>(host: &RefCell<WebHost<G>>, event: RawInput) {
    if let Ok(mut host) = host.try_borrow_mut() {
        host.on_input(event);
    }
}

impl<G: Game + 'static> InputSource for DomInput<G> {
    type Error = PlatformError;

    fn attach(&mut self) -> Result<(), PlatformError> {
        if self.is_attached() {
            return Ok(());
        }
        if let Err(e) = self.add_all() {
            self.detach();
            return Err(e);
        }
        Ok(())
    }

    fn detach(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
    }

    fn is_attached(&self) -> bool {
        !self.listeners.is_empty()
    }
}

trait Mounted {
    fn unmount(&mut self);
}

struct Mount<G: Game + 'static> {
    host: Rc<RefCell<WebHost<G>>>,
    input: DomInput<G>,
    closing: Rc<Cell<bool>>,
}

impl<G: Game + 'static> Mounted for Mount<G> {
    fn unmount(&mut self) {
        self.input.detach();
        match self.host.try_borrow_mut() {
            Ok(mut host) => {
                host.shutdown();
                log::info!("{} unmounted", host.engine.game().id());
            }
            Err(_) => {
                // Called from inside a frame; the host stops itself when it returns
                self.closing.set(true);
                log::info!("Unmount requested mid-frame, deferring teardown");
            }
        }
    }
}

/// A running game; unmounting (or dropping) tears it down
pub struct GameHandle {
    mounted: Option<Box<dyn Mounted>>,
}

impl GameHandle {
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(mut mounted) = self.mounted.take() {
            mounted.unmount();
        }
    }
}

impl Drop for GameHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Mount `game` on the canvas with id `canvas_id`
///
/// Fails without starting any loop when the canvas or its 2d context is
/// missing.
pub fn mount_game<G: Game + 'static>(
    canvas_id: &str,
    game: G,
    on_game_over: impl FnMut(u64) + 'static,
) -> Result<GameHandle, PlatformError> {
    let window = web_sys::window().ok_or(PlatformError::NoWindow)?;
    let document = window.document().ok_or(PlatformError::NoDocument)?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| PlatformError::CanvasNotFound(canvas_id.to_string()))?
        .dyn_into()
        .map_err(|_| PlatformError::NotACanvas(canvas_id.to_string()))?;

    let rules = game.rules();
    let surface = CanvasSurface::new(
        &canvas,
        rules.width,
        rules.height,
        window.device_pixel_ratio(),
    )?;
    let store = LocalStore::open(&window);
    let settings = Settings::load(&store);

    let mut engine = Engine::new(game, store, settings);
    engine.set_next_seed(js_sys::Date::now() as u64);
    engine.on_game_over(on_game_over);

    let host = Rc::new(RefCell::new(Host::new(
        engine,
        RafScheduler::new(window.clone()),
        surface,
    )));

    let weak = Rc::downgrade(&host);
    let on_paint = Closure::<dyn FnMut(f64)>::new(move |now_ms: f64| {
        let Some(host) = weak.upgrade() else {
            return;
        };
        if let Ok(mut host) = host.try_borrow_mut() {
            let handle = host.driver.scheduler_mut().last();
            host.on_frame(handle, now_ms);
        }
    });
    host.borrow_mut()
        .driver
        .scheduler_mut()
        .set_callback(on_paint);

    let mut input = DomInput::new(window, document, canvas, Rc::downgrade(&host));
    input.attach()?;

    let closing = {
        let mut host = host.borrow_mut();
        host.paint();
        log::info!("{} mounted on #{}", host.engine.game().id(), canvas_id);
        host.close_signal()
    };

    Ok(GameHandle {
        mounted: Some(Box::new(Mount {
            host,
            input,
            closing,
        })),
    })
}
