use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalSize, Size};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, InitCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: Size,
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "texel".to_string(),
            initial_size: PhysicalSize::new(800, 600).into(),
            resizable: true,
        }
    }
}

/// Frame loop state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closing,
}

impl LoopState {
    /// Transition driven by a window event. Closing is terminal.
    pub fn on_window_event(self, event: &WindowEvent) -> Self {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => LoopState::Closing,
            _ => self,
        }
    }

    /// Transition driven by an application directive.
    pub fn on_control(self, control: AppControl) -> Self {
        match control {
            AppControl::Exit => LoopState::Closing,
            AppControl::Continue => self,
        }
    }

    pub fn is_running(self) -> bool {
        self == LoopState::Running
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, initializes the app and drives frames until the
    /// window is closed.
    ///
    /// Returns the startup error if the window, GPU context or
    /// `App::on_init` failed.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    state: LoopState,
    startup_error: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            state: LoopState::Running,
            startup_error: None,
        }
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init)).context("GPU initialization failed")
            },
        }
        .try_build()
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let entry = self.create_window_entry(event_loop)?;

        let app = &mut self.app;
        entry.with(|fields| {
            let mut ctx = InitCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
            };
            app.on_init(&mut ctx)
        })?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    /// Running → Closing: app releases its resources, then the GPU context
    /// and window are dropped (in that order).
    fn close(&mut self, event_loop: &ActiveEventLoop) {
        self.state = LoopState::Closing;

        if let Some(entry) = self.entry.take() {
            let frames = entry.with_clock(|c| c.frames());
            self.app.on_exit();
            drop(entry);
            log::info!("window closed after {frames} frame(s)");
        }

        event_loop.exit();
    }

    fn redraw(&mut self) -> AppControl {
        let (app, Some(entry)) = (&mut self.app, self.entry.as_mut()) else {
            return AppControl::Continue;
        };

        entry.with_mut(|fields| {
            let time = fields.clock.tick();
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
                time,
            };
            app.on_frame(&mut ctx)
        })
    }

    fn resize(&mut self, size: Option<PhysicalSize<u32>>) {
        let Some(entry) = self.entry.as_mut() else { return };

        let size = size.unwrap_or_else(|| entry.with_window(|w| w.inner_size()));
        let viewport = entry.with_gpu_mut(|gpu| gpu.resize(size));
        log::debug!(
            "resized to {}x{}; viewport ({}, {}, {}, {})",
            size.width,
            size.height,
            viewport.x,
            viewport.y,
            viewport.width,
            viewport.height
        );

        self.app.on_resize(viewport);
        entry.with_window(|w| w.request_redraw());
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || !self.state.is_running() {
            return;
        }

        if let Err(err) = self.start(event_loop) {
            log::error!("startup failed: {err:#}");
            self.startup_error = Some(err);
            self.close(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.state.is_running() {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: one frame per loop iteration.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if !self.state.is_running() {
            event_loop.exit();
            return;
        }

        let control = self.app.on_window_event(window_id, &event);
        let next = self.state.on_control(control).on_window_event(&event);
        if !next.is_running() {
            self.close(event_loop);
            return;
        }

        match event {
            WindowEvent::Resized(size) => self.resize(Some(size)),
            WindowEvent::ScaleFactorChanged { .. } => self.resize(None),
            WindowEvent::RedrawRequested => {
                if !self.state.on_control(self.redraw()).is_running() {
                    self.close(event_loop);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_request_moves_to_closing() {
        let s = LoopState::Running.on_window_event(&WindowEvent::CloseRequested);
        assert_eq!(s, LoopState::Closing);
        assert!(!s.is_running());
    }

    #[test]
    fn other_events_keep_running() {
        let s = LoopState::Running
            .on_window_event(&WindowEvent::RedrawRequested)
            .on_window_event(&WindowEvent::Focused(true))
            .on_window_event(&WindowEvent::Resized(PhysicalSize::new(10, 10)));
        assert_eq!(s, LoopState::Running);
    }

    #[test]
    fn closing_is_terminal() {
        let s = LoopState::Closing
            .on_window_event(&WindowEvent::RedrawRequested)
            .on_control(AppControl::Continue);
        assert_eq!(s, LoopState::Closing);
    }

    #[test]
    fn app_exit_moves_to_closing() {
        assert_eq!(LoopState::Running.on_control(AppControl::Exit), LoopState::Closing);
        assert_eq!(LoopState::Running.on_control(AppControl::Continue), LoopState::Running);
    }

    #[test]
    fn default_window_is_800_by_600() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.initial_size, Size::Physical(PhysicalSize::new(800, 600)));
    }
}
