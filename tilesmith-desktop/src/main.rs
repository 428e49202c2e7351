//! Tilesmith Desktop: shows a tile grid rendered from the source atlas.
//!
//! Uses `winit` 0.30 for windowing, `tilesmith-raster` to calibrate and
//! rasterize tiles, and `tilesmith-render` to draw them with wgpu.
//!
//! Usage: `tilesmith-desktop [config.json]` (default `tilesmith.json`).

mod assets;
mod config;
mod state;

use log::{error, info};
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

use config::DesktopConfig;
use state::AppState;
use tilesmith_raster::{CalibrationProgress, FileShiftStore, OptimizerConfig, TileEngine};
use tilesmith_render::GpuContext;

const TITLE: &str = "Tilesmith";

/// Log the failing step and exit with status 1.
fn fatal(step: &str, err: impl Display) -> ! {
    error!("{step} failed: {err}");
    std::process::exit(1);
}

/// Winit 0.30 application handler.
struct App {
    config: DesktopConfig,
    window: Option<Arc<Window>>,
    state: Option<AppState>,
}

impl App {
    fn new(config: DesktopConfig) -> Self {
        Self {
            config,
            window: None,
            state: None,
        }
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Arc<Window> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .map(|m| {
                let size = m.size();
                (size.width, size.height)
            });
        let plan = self.config.window_plan(monitor);
        info!(
            "Opening {}×{} window{}",
            plan.width,
            plan.height,
            if plan.fullscreen { " (fullscreen)" } else { "" }
        );

        let mut attrs = WindowAttributes::default()
            .with_title(TITLE)
            .with_inner_size(PhysicalSize::new(plan.width, plan.height));
        if plan.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => fatal("Window creation", e),
        }
    }

    /// Load the atlas and its shift table, calibrating on a cache miss.
    fn prepare_engine(&self, window: &Window) -> TileEngine {
        let atlas_path = self.config.atlas_path();
        let atlas = assets::load_atlas(&atlas_path).unwrap_or_else(|e| fatal("Atlas load", e));

        let mut engine = TileEngine::new(atlas);
        let mut store = FileShiftStore::new(self.config.shift_cache_path());
        let optimizer = OptimizerConfig::default();
        let progress = |p: CalibrationProgress| {
            window.set_title(&format!(
                "{TITLE} - Optimizing tile {} / {} ...",
                p.index, p.total
            ));
        };

        if self.config.recalibrate {
            info!("Recalibration forced by config");
            engine.recalibrate(&mut store, &optimizer, progress);
        } else {
            let outcome = engine.load_or_calibrate(&mut store, &optimizer, progress);
            info!("Shift table {outcome:?}");
        }
        window.set_title(TITLE);
        engine
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized.
        }

        let window = self.create_window(event_loop);
        let engine = self.prepare_engine(&window);

        let size = window.inner_size();
        let gpu = pollster::block_on(GpuContext::new_with_surface(
            window.clone(),
            size.width.max(1),
            size.height.max(1),
        ))
        .unwrap_or_else(|e| fatal("GPU initialization", e));

        let adapter = gpu.adapter.get_info().name;
        let app_state = AppState::new(engine, gpu, self.config.grid_size())
            .unwrap_or_else(|e| fatal("Texture creation", e));

        info!(
            "Tilesmith Desktop initialized: {}×{}, GPU: {adapter}, {} tile texture(s)",
            size.width,
            size.height,
            app_state.presenter().textures().len()
        );

        window.request_redraw();
        self.state = Some(app_state);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(window), Some(state)) = (self.window.as_ref(), self.state.as_mut()) else {
            return;
        };

        match event {
            // ── Close / Escape ──────────────────────────────────
            WindowEvent::CloseRequested => {
                info!("Window closed after {} frames", state.frame_count());
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                info!("Escape pressed after {} frames", state.frame_count());
                event_loop.exit();
            }

            // ── Resize ──────────────────────────────────────────
            WindowEvent::Resized(new_size) => {
                if let Err(e) = state.resize(new_size.width, new_size.height) {
                    fatal("Texture rebuild", e);
                }
                window.request_redraw();
            }

            // ── Redraw ──────────────────────────────────────────
            WindowEvent::RedrawRequested => {
                if let Err(e) = state.render_frame() {
                    fatal("Frame render", e);
                }
            }

            _ => {}
        }
    }
}

fn main() {
    env_logger::init();

    info!("Starting Tilesmith Desktop...");

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tilesmith.json"));
    let config = DesktopConfig::load(&config_path).unwrap_or_else(|e| fatal("Config load", e));

    let event_loop = EventLoop::new().unwrap_or_else(|e| fatal("Event loop creation", e));
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        fatal("Event loop", e);
    }
}
