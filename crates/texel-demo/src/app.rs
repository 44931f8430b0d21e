use texel_engine::coords::Viewport;
use texel_engine::core::{App, AppControl, FrameCtx, InitCtx};

use crate::config::DemoConfig;
use crate::scene::Scene;

/// Rotating textured quad.
pub struct TexturedQuadApp {
    config: DemoConfig,
    scene: Option<Scene>,
}

impl TexturedQuadApp {
    pub fn new(config: DemoConfig) -> Self {
        Self {
            config,
            scene: None,
        }
    }
}

impl App for TexturedQuadApp {
    fn on_init(&mut self, ctx: &mut InitCtx<'_, '_>) -> anyhow::Result<()> {
        let scene = Scene::load(&ctx.render_ctx(), &self.config)?;

        let (w, h) = scene.texture_size();
        let (vw, vh) = ctx.window.physical_size();
        log::info!("scene ready: {w}x{h} texture, {vw}x{vh} drawable");

        self.scene = Some(scene);
        Ok(())
    }

    fn on_resize(&mut self, viewport: Viewport) {
        log::debug!("viewport now {}x{}", viewport.width, viewport.height);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Continue;
        };

        scene.update(&ctx.time);
        if ctx.time.frame_index % 10_000 == 0 {
            log::trace!(
                "frame {}: rotation {:.4} rad",
                ctx.time.frame_index,
                scene.transform().rotation()
            );
        }

        ctx.render(|rctx, target| scene.draw(rctx, target))
    }

    fn on_exit(&mut self) {
        // GPU context is still alive here.
        self.scene = None;
    }
}
