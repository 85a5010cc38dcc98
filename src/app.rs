// src/app.rs

use std::time::Instant;

use glam::Vec2;
use thiserror::Error;
use winit::window::Window;

use poly_outline::config::Config;
use poly_outline::scene::{tick_rotations, Scene};
use poly_outline::timer::FrameTimer;

use crate::renderer::{Globals, Renderer};

#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to acquire GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

pub struct PolygonApp {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    renderer: Renderer,
    scene: Scene,
    config: Config,
    // Tracks the live framebuffer size; geometry offsets stay in the
    // configured space, only the uniform follows resizes.
    winres: Vec2,
    frame_timer: FrameTimer,
    tick: u64,
}

impl PolygonApp {
    pub async fn new(
        window: std::sync::Arc<Window>,
        config: Config,
        scene: Scene,
    ) -> Result<Self, InitError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(InitError::NoAdapter)?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let winres = Vec2::new(size.width as f32, size.height as f32);
        let renderer = Renderer::new(&device, surface_format, &scene.streams);
        renderer.update_globals(&queue, globals_for(&config, winres));
        renderer.upload_all(&queue, &scene.streams);

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            size,
            renderer,
            scene,
            config,
            winres,
            frame_timer: FrameTimer::new("frame"),
            tick: 0,
        })
    }

    pub fn get_size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.device, &self.surface_config);

            self.winres = Vec2::new(new_size.width as f32, new_size.height as f32);
            self.renderer
                .update_globals(&self.queue, globals_for(&self.config, self.winres));
        }
    }

    /// One animation tick: rotate every instance in place and re-upload just
    /// the rotation stream.
    pub fn update(&mut self) {
        if !self.config.tick_updates {
            return;
        }
        tick_rotations(&mut self.scene, 0.01);
        self.renderer.upload_rotations(&self.queue, &self.scene.streams);
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.frame_timer.start();

        let output_texture = self.surface.get_current_texture()?;
        let view = output_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Command Encoder"),
            });

        let [r, g, b, a] = self.config.bg_color.normalized();
        self.renderer.render(
            &mut encoder,
            &view,
            wgpu::Color {
                r: f64::from(r),
                g: f64::from(g),
                b: f64::from(b),
                a: f64::from(a),
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output_texture.present();

        self.frame_timer.end(true);
        self.tick += 1;
        if self.config.print_every > 0 && self.tick % self.config.print_every == 0 {
            self.frame_timer.print_report();
            self.frame_timer.reset_durations();
        }
        Ok(())
    }

    /// Best-effort frame pacing: sleep off whatever remains of the target
    /// interval. A slow frame is never compensated.
    pub fn pace(&self, frame_start: Instant) {
        if let Some(interval) = self.config.frame_interval() {
            let elapsed = frame_start.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
    }
}

fn globals_for(config: &Config, winres: Vec2) -> Globals {
    Globals {
        outline_color: config.outline_color.normalized(),
        winres: winres.to_array(),
        outline_size: config.outline_size,
        transition_smoothness: config.transition_smoothness,
    }
}
