mod app;
mod config;
mod scene;

use anyhow::Result;
use winit::dpi::PhysicalSize;

use texel_engine::device::GpuInit;
use texel_engine::logging::{init_logging, LoggingConfig};
use texel_engine::window::{Runtime, RuntimeConfig};

use crate::app::TexturedQuadApp;
use crate::config::DemoConfig;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let runtime = RuntimeConfig {
        title: DemoConfig::TITLE.to_string(),
        initial_size: PhysicalSize::new(DemoConfig::WIDTH, DemoConfig::HEIGHT).into(),
        resizable: true,
    };

    // Texels are uploaded as linear Rgba8Unorm; keep the swapchain linear too.
    let gpu = GpuInit {
        prefer_srgb: false,
        ..GpuInit::default()
    };

    Runtime::run(runtime, gpu, TexturedQuadApp::new(DemoConfig::locate()))
}
