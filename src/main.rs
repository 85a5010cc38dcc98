// src/main.rs

pub mod app;
pub mod renderer;
pub mod shader;

use std::time::Instant;

use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

use app::PolygonApp;
use poly_outline::config::Config;
use poly_outline::scene::build_scene;

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    let event_loop = EventLoop::new()?;
    let window = std::sync::Arc::new(
        WindowBuilder::new()
            .with_title(&config.window_title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                f64::from(config.winres.x),
                f64::from(config.winres.y),
            ))
            .build(&event_loop)?,
    );

    let scene = build_scene(&config);
    let mut app_state = PolygonApp::new(window.clone(), config, scene).await?;

    event_loop.run(move |event, target| {
        target.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    target.exit();
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(KeyCode::Escape),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => {
                    target.exit();
                }
                WindowEvent::Resized(physical_size) => {
                    app_state.resize(*physical_size);
                }
                WindowEvent::RedrawRequested => { /* In AboutToWait */ }
                _ => {}
            },
            Event::AboutToWait => {
                let frame_start = Instant::now();

                app_state.update();
                match app_state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        app_state.resize(app_state.get_size());
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("wgpu out of memory, exiting");
                        target.exit();
                    }
                    Err(e) => log::warn!("surface error: {e:?}"),
                }

                if !target.exiting() {
                    app_state.pace(frame_start);
                    window.request_redraw();
                }
            }
            _ => {}
        }
    })?;

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("{e}");
        std::process::exit(-1);
    }
}
