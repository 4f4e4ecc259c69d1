//! Aquarium entry point.
//!
//! Wires the CLI, window, and render loop together:
//! 1. Parse arguments, build the tank and the initial descriptor list
//! 2. Initialize GPU and rendering context
//! 3. Run the event loop: pump image decodes, tick the scene, draw
//! 4. Tear everything down exactly once on exit
//!
//! Controls: mouse drag orbits, wheel zooms, Up/Down change the fish count,
//! R resets the tank, Q/Escape quits.

use anyhow::Result;
use aquarium::{
    behavior::{BehaviorGenerator, LocalBehaviorGenerator, MAX_FISH_COUNT, MIN_FISH_COUNT},
    descriptor::{FishDescriptor, ImageSource},
    gpu::GpuContext,
    loader::{self, ImageLoader},
    physics::TankDimensions,
    scene::Aquarium,
    Renderer,
};
use clap::Parser;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

const MOUSE_SENSITIVITY: f32 = 0.01;
const DEFAULT_WINDOW_WIDTH: u32 = 1024;
const DEFAULT_WINDOW_HEIGHT: u32 = 768;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "aquarium")]
#[command(about = "Virtual aquarium with procedurally animated fish")]
struct Args {
    /// Number of generated fish (1-50)
    #[arg(long, default_value = "15")]
    fish_count: u32,

    /// Tank width in tank units
    #[arg(long, default_value = "20.0")]
    width: f32,

    /// Tank height in tank units
    #[arg(long, default_value = "10.0")]
    height: f32,

    /// Tank depth in tank units
    #[arg(long, default_value = "10.0")]
    depth: f32,

    /// Seed for a reproducible simulation (default: entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Image file rendered as a flat image fish; repeatable
    #[arg(long = "image")]
    images: Vec<PathBuf>,

    /// Render one frame offscreen and save it as a PNG (headless mode)
    #[arg(long)]
    save_frame: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let dims = TankDimensions {
        width: args.width,
        height: args.height,
        depth: args.depth,
    };
    let fish_count = args.fish_count.clamp(MIN_FISH_COUNT, MAX_FISH_COUNT);

    if let Some(output_path) = args.save_frame.clone() {
        return run_headless(&args, dims, fish_count, output_path);
    }

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Aquarium")
        .with_inner_size(winit::dpi::PhysicalSize::new(
            DEFAULT_WINDOW_WIDTH,
            DEFAULT_WINDOW_HEIGHT,
        ))
        .build(&event_loop)?;

    let gpu_context = pollster::block_on(GpuContext::new())?;
    let mut renderer = pollster::block_on(Renderer::new(Some(&window), &gpu_context, false))?;

    let mut state = ApplicationState::new(&args, dims, fish_count);
    state.reconcile_all();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::AboutToWait => {
                handle_frame_update(&mut state, &mut renderer, &gpu_context, &window);
            }
            Event::LoopExiting => {
                state.aquarium.teardown();
                renderer.release_image_entries();
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    renderer.resize(&gpu_context, physical_size);
                }
                WindowEvent::MouseInput {
                    state: element_state,
                    button,
                    ..
                } => {
                    handle_mouse_input(&mut state, element_state, button);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    handle_cursor_moved(&mut state, &mut renderer, position);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    handle_mouse_wheel(&mut renderer, delta);
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key,
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => {
                    if let winit::keyboard::PhysicalKey::Code(code) = physical_key {
                        handle_key(&mut state, code, elwt);
                    }
                }
                WindowEvent::RedrawRequested => {
                    handle_redraw(&mut renderer, &gpu_context, &window, elwt);
                }
                _ => {}
            },
            _ => {}
        }
    })?;

    Ok(())
}

struct ApplicationState {
    aquarium: Aquarium,
    generator: LocalBehaviorGenerator,
    image_loader: ImageLoader,
    fish_count: u32,
    dims: TankDimensions,
    image_paths: Vec<PathBuf>,
    descriptors: Vec<FishDescriptor>,
    placement_rng: StdRng,
    last_update: Instant,
    mouse_pressed: bool,
    last_mouse_pos: PhysicalPosition<f64>,
}

impl ApplicationState {
    fn new(args: &Args, dims: TankDimensions, fish_count: u32) -> Self {
        Self {
            aquarium: Aquarium::new(dims, args.seed),
            generator: LocalBehaviorGenerator::new(args.seed),
            image_loader: ImageLoader::new(),
            fish_count,
            dims,
            image_paths: args.images.clone(),
            descriptors: Vec::new(),
            placement_rng: match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
                None => StdRng::from_entropy(),
            },
            last_update: Instant::now(),
            mouse_pressed: false,
            last_mouse_pos: PhysicalPosition::new(0.0, 0.0),
        }
    }

    /// Rebuild the descriptor list and reconcile the scene against it. A
    /// generator failure keeps the previous descriptors so the live set is
    /// never partially applied.
    fn reconcile_all(&mut self) {
        match self.generator.generate(self.fish_count, self.dims) {
            Ok(mut generated) => {
                generated.extend(self.image_descriptors());
                self.descriptors = generated;
            }
            Err(error) => {
                log::error!("behavior generation failed, keeping previous fish: {:#}", error);
            }
        }
        let requests = self.aquarium.apply_descriptors(&self.descriptors);
        for request in requests {
            self.image_loader.request(request);
        }
    }

    fn image_descriptors(&mut self) -> Vec<FishDescriptor> {
        let dims = self.dims;
        let rng = &mut self.placement_rng;
        self.image_paths
            .iter()
            .map(|path| {
                FishDescriptor::image(
                    path.display().to_string(),
                    ImageSource::Path(path.clone()),
                    Vec3::new(
                        (rng.gen::<f32>() - 0.5) * dims.width * 0.5,
                        (rng.gen::<f32>() - 0.5) * dims.height * 0.5,
                        (rng.gen::<f32>() - 0.5) * dims.depth * 0.5,
                    ),
                )
            })
            .collect()
    }

    /// Apply finished image decodes; stale results are dropped by the scene.
    fn pump_image_loads(&mut self) {
        for (id, result) in self.image_loader.poll() {
            self.aquarium.complete_image_load(id, result);
        }
    }
}

fn handle_frame_update(
    state: &mut ApplicationState,
    renderer: &mut Renderer,
    gpu_context: &GpuContext,
    window: &winit::window::Window,
) {
    if state.last_update.elapsed() < FRAME_INTERVAL {
        return;
    }
    let dt = state.last_update.elapsed().as_secs_f32();
    state.last_update = Instant::now();

    state.pump_image_loads();
    let eye = renderer.camera().eye_position();
    state.aquarium.tick(dt, eye);
    renderer.update(gpu_context, &state.aquarium);
    window.request_redraw();
}

fn handle_key(
    state: &mut ApplicationState,
    code: winit::keyboard::KeyCode,
    elwt: &winit::event_loop::EventLoopWindowTarget<()>,
) {
    use winit::keyboard::KeyCode;
    match code {
        KeyCode::KeyQ | KeyCode::Escape => elwt.exit(),
        KeyCode::ArrowUp => {
            if state.fish_count < MAX_FISH_COUNT {
                state.fish_count += 1;
                state.reconcile_all();
            }
        }
        KeyCode::ArrowDown => {
            if state.fish_count > MIN_FISH_COUNT {
                state.fish_count -= 1;
                state.reconcile_all();
            }
        }
        KeyCode::KeyR => {
            // Full reset: clear everything, then repopulate from scratch.
            state.aquarium.apply_descriptors(&[]);
            state.reconcile_all();
        }
        _ => {}
    }
}

fn handle_mouse_input(
    state: &mut ApplicationState,
    element_state: ElementState,
    button: MouseButton,
) {
    if button == MouseButton::Left {
        state.mouse_pressed = element_state == ElementState::Pressed;
    }
}

fn handle_cursor_moved(
    state: &mut ApplicationState,
    renderer: &mut Renderer,
    position: PhysicalPosition<f64>,
) {
    if state.mouse_pressed {
        let delta_x = (position.x - state.last_mouse_pos.x) as f32 * MOUSE_SENSITIVITY;
        let delta_y = (position.y - state.last_mouse_pos.y) as f32 * MOUSE_SENSITIVITY;
        renderer.camera_mut().rotate(-delta_x, -delta_y);
    }
    state.last_mouse_pos = position;
}

fn handle_mouse_wheel(renderer: &mut Renderer, delta: MouseScrollDelta) {
    let scroll_amount = match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
    };
    renderer.camera_mut().zoom(scroll_amount);
}

fn handle_redraw(
    renderer: &mut Renderer,
    gpu_context: &GpuContext,
    window: &winit::window::Window,
    elwt: &winit::event_loop::EventLoopWindowTarget<()>,
) {
    match renderer.render(gpu_context) {
        Ok(()) => {}
        Err(wgpu::SurfaceError::Lost) => renderer.resize(gpu_context, window.inner_size()),
        Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
        Err(e) => log::error!("render error: {:?}", e),
    }
}

/// Render a single settled frame offscreen and save it as a PNG.
fn run_headless(
    args: &Args,
    dims: TankDimensions,
    fish_count: u32,
    output_path: PathBuf,
) -> Result<()> {
    log::info!("headless mode, saving frame to {}", output_path.display());

    let gpu_context = pollster::block_on(GpuContext::new())?;
    let mut renderer = pollster::block_on(Renderer::new(None, &gpu_context, true))?;

    let mut state = ApplicationState::new(args, dims, fish_count);
    state.reconcile_all();

    // No frame loop to pump the worker thread here, so decode synchronously;
    // any duplicate worker results are ignored as stale by the scene.
    let pending: Vec<_> = state
        .descriptors
        .iter()
        .filter_map(|d| match &d.kind {
            aquarium::descriptor::DescriptorKind::Image(source) => {
                Some((d.id.clone(), source.clone()))
            }
            _ => None,
        })
        .collect();
    for (id, source) in pending {
        state.aquarium.complete_image_load(id, loader::decode(&source));
    }

    // Let the tank settle into natural-looking motion.
    let eye = renderer.camera().eye_position();
    for _ in 0..120 {
        state.aquarium.tick(1.0 / 60.0, eye);
    }

    renderer.update(&gpu_context, &state.aquarium);
    renderer.render_to_texture(&gpu_context);

    let frame = renderer
        .capture_frame(&gpu_context)
        .ok_or_else(|| anyhow::anyhow!("frame capture failed"))?;
    let (width, height) = renderer.size();
    let rgba = convert_bgra_to_rgba(&frame);
    image::save_buffer(&output_path, &rgba, width, height, image::ColorType::Rgba8)?;

    state.aquarium.teardown();
    renderer.release_image_entries();
    log::info!("frame saved to {}", output_path.display());
    Ok(())
}

fn convert_bgra_to_rgba(bgra: &[u8]) -> Vec<u8> {
    let mut rgba = bgra.to_vec();
    for pixel in rgba.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
    rgba
}
