use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Receiver;
use renderer::{
    BackendOptions, FrameInput, FrameOutcome, FrameScheduler, GpuPowerPreference, GpuSurface,
    RenderSurface, SteppedTimeSource, SystemTimeSource, TimeSource, Viewport, WgpuBackend,
};
use sketch::{Completion, RouteResolver, Router, SketchEvent, SketchLifecycleManager, SurfaceError};
use tracing::{debug, error, info, trace, warn};
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::catalog::Catalog;
use crate::picker::SketchPicker;

const TITLE: &str = "Sketchbook";

#[derive(Debug, Clone)]
pub struct WindowOptions {
    /// Logical pixels.
    pub size: (u32, u32),
    pub max_pixel_ratio: f32,
    pub target_fps: Option<f32>,
    pub frame_step: Option<f32>,
    pub clear_color: [f32; 3],
    pub power: GpuPowerPreference,
    pub initial_route: String,
}

/// Work forwarded from the router into the event loop.
#[derive(Debug)]
enum WindowCommand {
    Route(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Next,
    Prev,
    Select(usize),
    Random,
    Reload,
    Quit,
}

/// Opens the window and runs until it is closed.
pub fn run(catalog: Catalog, resolver: RouteResolver, options: WindowOptions) -> Result<()> {
    let event_loop = EventLoopBuilder::<WindowCommand>::with_user_event()
        .build()
        .context("failed to create event loop")?;
    let window = WindowBuilder::new()
        .with_title(TITLE)
        .with_inner_size(LogicalSize::new(options.size.0, options.size.1))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut surface: GpuSurface = RenderSurface::new(Viewport::with_max_pixel_ratio(
        options.size.0,
        options.size.1,
        options.max_pixel_ratio,
    ));
    apply_window_metrics(&mut surface, &window);
    surface
        .initialize(WgpuBackend::factory(
            window.clone(),
            BackendOptions {
                clear_color: options.clear_color,
                power: options.power,
            },
        ))
        .context("failed to initialise GPU surface")?;

    let compiler = surface
        .backend()
        .map(WgpuBackend::compiler)
        .ok_or_else(|| anyhow!("GPU backend missing after initialisation"))?;
    let registry = catalog
        .registry(move |label: &str, source: String| compiler.compile(label, source))
        .context("failed to register sketches")?;

    let mut picker = SketchPicker::new(
        catalog
            .entries()
            .iter()
            .map(|entry| (entry.id.clone(), entry.label.clone()))
            .collect(),
        resolver.clone(),
    );
    let mut manager = SketchLifecycleManager::new(registry, resolver);
    let events = manager.events();

    let proxy = event_loop.create_proxy();
    let mut router = Router::new(&options.initial_route);
    router.on_change(move |path| {
        if proxy
            .send_event(WindowCommand::Route(path.to_string()))
            .is_err()
        {
            debug!(route = path, "event loop closed; dropping navigation");
        }
    });

    let redraw_window = window.clone();
    let resize_subscription = surface.on_resize(move |viewport| {
        trace!(
            width = viewport.width(),
            height = viewport.height(),
            pixel_ratio = viewport.pixel_ratio(),
            "viewport changed"
        );
        redraw_window.request_redraw();
    });

    let mut scheduler = FrameScheduler::new(options.target_fps);
    let mut clock: Box<dyn TimeSource> = match options.frame_step {
        Some(step) => {
            info!(step, "using fixed time step");
            Box::new(SteppedTimeSource::new(step))
        }
        None => Box::new(SystemTimeSource::new()),
    };
    let mut mouse = MouseState::default();
    let mut rng = rand::thread_rng();

    info!(
        sketches = picker.len(),
        "keys: Right/Left cycle, 1-9 select, Space random, R reload, Esc quit"
    );
    router.start();

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::UserEvent(WindowCommand::Route(path)) => {
            match manager.navigate_blocking(&path, &mut surface) {
                Ok(Some(Completion::Installed { id })) => {
                    debug!(sketch = %id, route = %path, "route activated");
                    clock.reset();
                    scheduler.reset();
                }
                Ok(_) => {}
                Err(err) => {
                    error!(route = %path, error = %err, "render surface rejected sketch");
                    elwt.exit();
                }
            }
            log_events(&events, &picker);
            picker.follow(&path, &manager);
            if let Some(id) = picker.current_id() {
                info!(sketch = %id, route = %picker.route_for(id), "showing sketch");
            }
            window.set_title(&match picker.current_label() {
                Some(label) => format!("{TITLE}: {label}"),
                None => TITLE.to_string(),
            });
            window.request_redraw();
        }
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                elwt.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let Some(action) = pressed_action(&event) else {
                    return;
                };
                let target = match action {
                    KeyAction::Quit => {
                        elwt.exit();
                        return;
                    }
                    KeyAction::Reload => {
                        router.reload();
                        return;
                    }
                    KeyAction::Next => picker.next(),
                    KeyAction::Prev => picker.prev(),
                    KeyAction::Select(index) => picker.select(index),
                    KeyAction::Random => picker.random(&mut rng),
                };
                if let Some(route) = target {
                    // Unchanged location: re-run it so a failed load gets retried.
                    if !router.navigate(&route) {
                        router.reload();
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                mouse.handle_cursor_moved(position);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                mouse.handle_button(state);
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                apply_window_metrics(&mut surface, &window);
            }
            WindowEvent::RedrawRequested => {
                let scale = surface.viewport().pixel_ratio() / window.scale_factor() as f32;
                let height = surface.viewport().physical_size().1 as f32;
                let input =
                    FrameInput::new(clock.sample()).with_mouse(mouse.as_uniform(height, scale));
                match surface.render_frame(&input) {
                    Ok(FrameOutcome::Skipped) => {}
                    Ok(_) => scheduler.mark_rendered(Instant::now()),
                    Err(SurfaceError::UseAfterDispose) => elwt.exit(),
                    Err(err) => warn!(error = %err, "frame failed; retrying next frame"),
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            if scheduler.ready_for_frame(now) {
                trace!("scheduler: issuing redraw now");
                window.request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = scheduler.next_deadline() {
                let ms = deadline.saturating_duration_since(now).as_millis();
                trace!(deadline_ms = ms, "scheduler: waiting until next frame");
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        Event::LoopExiting => {
            surface.remove_resize_observer(resize_subscription);
            manager.dispose(&mut surface);
            surface.dispose();
            info!("sketchbook closed");
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}

/// Pushes the window's logical size and scale factor into the surface.
fn apply_window_metrics(surface: &mut GpuSurface, window: &Window) {
    let scale = window.scale_factor();
    let logical: LogicalSize<f64> = window.inner_size().to_logical(scale);
    surface.resize(
        logical.width.round() as u32,
        logical.height.round() as u32,
        scale as f32,
    );
}

fn log_events(events: &Receiver<SketchEvent>, picker: &SketchPicker) {
    for event in events.try_iter() {
        match event {
            SketchEvent::NotFound { .. } => {
                warn!("{event}; available sketches:");
                for line in picker.listing() {
                    info!("{line}");
                }
            }
            SketchEvent::LoadFailed { .. } | SketchEvent::StaleDiscarded { .. } => {
                warn!("{event}")
            }
            SketchEvent::Loading { .. } | SketchEvent::Activated { .. } => debug!("{event}"),
        }
    }
}

fn pressed_action(event: &KeyEvent) -> Option<KeyAction> {
    if event.state != ElementState::Pressed || event.repeat {
        return None;
    }
    key_action(&event.logical_key)
}

fn key_action(key: &Key) -> Option<KeyAction> {
    match key {
        Key::Named(NamedKey::ArrowRight) => Some(KeyAction::Next),
        Key::Named(NamedKey::ArrowLeft) => Some(KeyAction::Prev),
        Key::Named(NamedKey::Space) => Some(KeyAction::Random),
        Key::Named(NamedKey::Escape) => Some(KeyAction::Quit),
        Key::Character(value) => match value.as_str() {
            "r" | "R" => Some(KeyAction::Reload),
            " " => Some(KeyAction::Random),
            other => other
                .parse::<usize>()
                .ok()
                .filter(|digit| (1..=9).contains(digit))
                .map(|digit| KeyAction::Select(digit - 1)),
        },
        _ => None,
    }
}

/// Cursor state in window pixels.
#[derive(Debug, Default)]
struct MouseState {
    position: Option<PhysicalPosition<f64>>,
    pressed_anchor: Option<PhysicalPosition<f64>>,
    is_pressed: bool,
}

impl MouseState {
    fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.position = Some(position);
        if self.is_pressed {
            self.pressed_anchor.get_or_insert(position);
        }
    }

    fn handle_button(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.is_pressed = true;
                if let Some(pos) = self.position {
                    self.pressed_anchor = Some(pos);
                }
            }
            ElementState::Released => {
                self.is_pressed = false;
                self.pressed_anchor = None;
            }
        }
    }

    /// `[x, y, anchor_x, anchor_y]` in render pixels with the origin at the
    /// bottom-left. `scale` converts window pixels to render pixels.
    fn as_uniform(&self, height: f32, scale: f32) -> [f32; 4] {
        let mut data = [0.0; 4];

        if let Some(pos) = self.position {
            data[0] = pos.x as f32 * scale;
            data[1] = height - pos.y as f32 * scale;
        }

        if let Some(anchor) = self.pressed_anchor {
            data[2] = anchor.x as f32 * scale;
            data[3] = height - anchor.y as f32 * scale;
        }

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::SmolStr;

    #[test]
    fn maps_picker_keys() {
        assert_eq!(
            key_action(&Key::Named(NamedKey::ArrowRight)),
            Some(KeyAction::Next)
        );
        assert_eq!(
            key_action(&Key::Named(NamedKey::ArrowLeft)),
            Some(KeyAction::Prev)
        );
        assert_eq!(
            key_action(&Key::Named(NamedKey::Escape)),
            Some(KeyAction::Quit)
        );
        assert_eq!(
            key_action(&Key::Named(NamedKey::Space)),
            Some(KeyAction::Random)
        );
        assert_eq!(
            key_action(&Key::Character(SmolStr::new("R"))),
            Some(KeyAction::Reload)
        );
        assert_eq!(
            key_action(&Key::Character(SmolStr::new("1"))),
            Some(KeyAction::Select(0))
        );
        assert_eq!(
            key_action(&Key::Character(SmolStr::new("9"))),
            Some(KeyAction::Select(8))
        );
        assert_eq!(key_action(&Key::Character(SmolStr::new("0"))), None);
        assert_eq!(key_action(&Key::Character(SmolStr::new("x"))), None);
        assert_eq!(key_action(&Key::Named(NamedKey::Enter)), None);
    }

    #[test]
    fn mouse_uniform_flips_y_and_tracks_anchor() {
        let mut mouse = MouseState::default();
        assert_eq!(mouse.as_uniform(100.0, 1.0), [0.0; 4]);

        mouse.handle_cursor_moved(PhysicalPosition::new(10.0, 20.0));
        mouse.handle_button(ElementState::Pressed);
        mouse.handle_cursor_moved(PhysicalPosition::new(30.0, 40.0));
        assert_eq!(mouse.as_uniform(100.0, 1.0), [30.0, 60.0, 10.0, 80.0]);
        assert_eq!(mouse.as_uniform(100.0, 0.5), [15.0, 80.0, 5.0, 90.0]);

        mouse.handle_button(ElementState::Released);
        assert_eq!(mouse.as_uniform(100.0, 1.0), [30.0, 60.0, 0.0, 0.0]);
    }
}
