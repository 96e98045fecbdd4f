//! Billiards entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlSelectElement, MouseEvent, Window};

    use billiards::platform::{ADD_BALL_ID, CANVAS_ID, COLOR_SELECT_ID, SetupError};
    use billiards::renderer::RenderState;
    use billiards::sim::{PaletteColor, PointerEvent};
    use billiards::{LoopControl, Settings, Simulation};

    /// Everything the browser callbacks share
    struct App {
        sim: Simulation,
        render_state: RenderState,
        /// Pending requestAnimationFrame handle (for teardown)
        frame_handle: Option<i32>,
        color_select: Option<HtmlSelectElement>,
    }

    impl App {
        /// Draw, step and present one frame
        fn render_frame(&mut self) -> LoopControl {
            let control = self.sim.frame(&mut self.render_state);
            if control == LoopControl::Stop {
                return control;
            }

            match self.render_state.present() {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let (w, h) = self.render_state.size;
                    self.render_state.resize(w, h);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                    self.sim.stop();
                    return LoopControl::Stop;
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
            control
        }

        /// Show the color picker at the pointer (or the held ball before the
        /// first move), hide it otherwise
        ///
        /// Releasing the mouse clears the selection and hides the picker, so
        /// with a mouse the picker only shows mid-drag and a change event
        /// arriving while idle is a no-op.
        fn sync_color_picker(&self) {
            let Some(select) = &self.color_select else {
                return;
            };
            let style = select.style();
            let held = self.sim.selected().and_then(|id| self.sim.world.get(id));
            match held.map(|ball| self.sim.input.pointer().unwrap_or(ball.pos)) {
                Some(at) => {
                    let _ = style.set_property("display", "block");
                    let _ = style.set_property("position", "absolute");
                    let _ = style.set_property("left", &format!("{}px", at.x));
                    let _ = style.set_property("top", &format!("{}px", at.y));
                }
                None => {
                    let _ = style.set_property("display", "none");
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Billiards starting...");

        // A missing canvas or GPU leaves the page inert rather than crashing
        match setup().await {
            Ok(()) => log::info!("Billiards running!"),
            Err(e) => log::warn!("Billiards disabled: {}", e),
        }
    }

    async fn setup() -> Result<(), SetupError> {
        let window = web_sys::window().ok_or(SetupError::NoWindow)?;
        let document = window.document().ok_or(SetupError::NoDocument)?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .ok_or(SetupError::MissingElement(CANVAS_ID))?
            .dyn_into()
            .map_err(|_| SetupError::NotACanvas(CANVAS_ID))?;

        // Write back so the stored copy is always a valid, complete set
        let settings = Settings::load();
        settings.save();

        // Fixed CSS size; backing store scaled for the display
        let dpr = window.device_pixel_ratio();
        let width = (settings.canvas_width as f64 * dpr) as u32;
        let height = (settings.canvas_height as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        let style = canvas.style();
        let _ = style.set_property("width", &format!("{}px", settings.canvas_width));
        let _ = style.set_property("height", &format!("{}px", settings.canvas_height));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| SetupError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| SetupError::NoAdapter)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let canvas_size = Vec2::new(settings.canvas_width, settings.canvas_height);
        let render_state = RenderState::new(surface, &adapter, width, height, canvas_size).await?;

        let color_select = document
            .get_element_by_id(COLOR_SELECT_ID)
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok());
        if color_select.is_none() {
            log::warn!("No #{} select, recoloring disabled", COLOR_SELECT_ID);
        }

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App {
            sim: Simulation::new(settings, seed),
            render_state,
            frame_handle: None,
            color_select,
        }));
        app.borrow().sync_color_picker();

        setup_pointer_handlers(&canvas, app.clone());
        setup_add_ball_button(&document, app.clone());
        setup_color_select(app.clone());
        setup_teardown(&window, app.clone());

        request_animation_frame(app);
        Ok(())
    }

    fn pointer_pos(event: &MouseEvent) -> Vec2 {
        Vec2::new(event.offset_x() as f32, event.offset_y() as f32)
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse down - pick a ball
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.sim.pointer(PointerEvent::Down(pointer_pos(&event)));
                a.sync_color_picker();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - aim (and launch) the held ball
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                if a.sim.selected().is_some() {
                    a.sim.pointer(PointerEvent::Move(pointer_pos(&event)));
                    a.sync_color_picker();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up - release
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.sim.pointer(PointerEvent::Up);
                a.sync_color_picker();
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_add_ball_button(document: &Document, app: Rc<RefCell<App>>) {
        let Some(btn) = document.get_element_by_id(ADD_BALL_ID) else {
            log::warn!("No #{} button", ADD_BALL_ID);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            app.borrow_mut().sim.add_ball();
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_color_select(app: Rc<RefCell<App>>) {
        let Some(select) = app.borrow().color_select.clone() else {
            return;
        };
        let select_clone = select.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let value = select_clone.value();
            match PaletteColor::from_str(&value) {
                Some(color) => {
                    app.borrow_mut().sim.set_selected_color(color);
                }
                None => log::warn!("Unknown palette color '{}'", value),
            }
        });
        let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Stop the loop and cancel the pending frame when the page goes away
    fn setup_teardown(window: &Window, app: Rc<RefCell<App>>) {
        let window_clone = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            a.sim.stop();
            if let Some(handle) = a.frame_handle.take() {
                let _ = window_clone.cancel_animation_frame(handle);
            }
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let app_for_frame = app.clone();
        let closure = Closure::once(move |_time: f64| {
            frame_loop(app_for_frame);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => app.borrow_mut().frame_handle = Some(handle),
            Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>) {
        let control = {
            let mut a = app.borrow_mut();
            a.frame_handle = None;
            a.render_frame()
        };

        if control == LoopControl::Continue {
            request_animation_frame(app);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Billiards (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    let frames = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(600);
    run_headless(frames);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Run the simulation without a window, shooting the first ball once
#[cfg(not(target_arch = "wasm32"))]
fn run_headless(frames: u64) {
    use billiards::renderer::SceneRecorder;
    use billiards::sim::PointerEvent;
    use billiards::{LoopControl, Settings, Simulation};
    use glam::Vec2;

    let mut settings = Settings::load();
    if let Err(e) = settings.validate() {
        log::warn!("Invalid settings ({}), using defaults", e);
        settings = Settings::default();
    }
    if settings.initial_balls == 0 {
        settings.initial_balls = 8;
    }

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let mut sim = Simulation::new(settings, seed);

    // Grab the first ball and fling it to the right
    if let Some(first) = sim.world.balls().first().map(|b| b.pos) {
        sim.pointer(PointerEvent::Down(first));
        sim.pointer(PointerEvent::Move(first + Vec2::new(100.0, 0.0)));
        sim.pointer(PointerEvent::Up);
    }

    let mut recorder = SceneRecorder::new();
    for _ in 0..frames {
        recorder.reset();
        if sim.frame(&mut recorder) == LoopControl::Stop {
            break;
        }
        if sim.world.frame % 120 == 0 {
            let total_speed: f32 = sim.world.balls().iter().map(|b| b.vel.length()).sum();
            log::info!(
                "frame {}: {} balls drawn, total speed {:.3}",
                sim.world.frame,
                recorder.last_frame().len().saturating_sub(1),
                total_speed
            );
        }
    }
    sim.stop();

    println!("\nSimulated {} frames (seed {})", sim.world.frame, sim.world.seed);
    for (i, ball) in sim.world.balls().iter().enumerate() {
        println!(
            "  ball {:>2}: pos ({:>7.1}, {:>7.1})  vel ({:>6.3}, {:>6.3})  r {:>4.1}  {}",
            i,
            ball.pos.x,
            ball.pos.y,
            ball.vel.x,
            ball.vel.y,
            ball.radius(),
            ball.color
        );
    }
}
