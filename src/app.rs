use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use ripple_matrix::config::TICK_PERIOD_MS;
use ripple_matrix::{Event, Frame, SharedToy};

use crate::gpu::{GpuContext, MatrixBuffers, MatrixPipeline};

/// GPU resources, created once the window exists
struct Presenter {
    gpu: GpuContext,
    buffers: MatrixBuffers,
    pipeline: MatrixPipeline,
}

/// Window host: ticks the toy at 25 Hz and maps keys to toy events
pub struct App {
    toy: SharedToy,
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    tick_period: Duration,
    next_tick: Instant,
    /// Timer ticks paused; steps only arrive through `Event::LowPowerTick`
    low_power: bool,
    fps_counter: FpsCounter,
}

impl App {
    pub fn new(toy: SharedToy) -> Self {
        let tick_period = Duration::from_millis(TICK_PERIOD_MS);
        Self {
            toy,
            window: None,
            presenter: None,
            tick_period,
            next_tick: Instant::now() + tick_period,
            low_power: false,
            fps_counter: FpsCounter::new(),
        }
    }

    fn send(&mut self, event: Event) {
        if let Some(frame) = self.toy.dispatch(event, Instant::now()) {
            self.present(&frame);
        }
    }

    fn present(&mut self, frame: &Frame) {
        if let Some(presenter) = &self.presenter {
            presenter.buffers.upload(&presenter.gpu.queue, frame);
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn draw(&mut self) {
        let Some(presenter) = &self.presenter else {
            return;
        };
        let gpu = &presenter.gpu;

        let Some(output) = gpu.acquire() else {
            return;
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        presenter.pipeline.draw(&mut encoder, &view, gpu.viewport());

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = self.fps_counter.tick() {
            self.update_title(fps);
        }
    }

    fn update_title(&self, fps: f64) {
        let Some(window) = &self.window else {
            return;
        };
        let (scene, mode, profile, drops) = self.toy.inspect(|sim| {
            (
                sim.config().name,
                sim.mode(),
                sim.profile().name,
                sim.drops().len(),
            )
        });
        let power = if self.low_power { " [low power]" } else { "" };
        window.set_title(&format!(
            "Ripple Matrix - {} / {} / {} - {} drops - {:.0} FPS{}",
            scene, mode, profile, drops, fps, power
        ));
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        match key_code {
            KeyCode::Space | KeyCode::KeyL => self.send(Event::LongPress),
            KeyCode::KeyS => self.send(Event::Shake),
            KeyCode::KeyR => self.send(Event::Reset),

            // Toggle the low-power driver: no timer, one step per N press
            KeyCode::KeyA => {
                self.low_power = !self.low_power;
                log::info!("Low-power driver: {}", if self.low_power { "ON" } else { "OFF" });
                if self.low_power {
                    self.send(Event::LowPowerTick);
                } else {
                    self.next_tick = Instant::now() + self.tick_period;
                }
            }
            KeyCode::KeyN if self.low_power => self.send(Event::LowPowerTick),

            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if self.low_power || !matches!(cause, StartCause::ResumeTimeReached { .. }) {
            return;
        }
        let now = Instant::now();
        if now < self.next_tick {
            return;
        }

        self.send(Event::Tick);

        self.next_tick += self.tick_period;
        if self.next_tick < now {
            // fell behind (window dragged, machine asleep); don't replay ticks
            self.next_tick = now + self.tick_period;
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.low_power {
            event_loop.set_control_flow(ControlFlow::Wait);
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        log::info!("Initializing ripple matrix window...");

        let window_attrs = Window::default_attributes()
            .with_title("Ripple Matrix - Initializing...")
            .with_inner_size(winit::dpi::LogicalSize::new(600, 600));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        log::info!("Creating GPU context...");
        let gpu = pollster::block_on(GpuContext::new(window.clone()));

        let buffers = MatrixBuffers::new(&gpu.device, &gpu.queue, &self.toy.render());
        let pipeline = MatrixPipeline::new(&gpu.device, gpu.format(), &buffers);

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Space/L: Long press (cycle mode or profile)");
        log::info!("  S: Shake (rain burst in stochastic mode)");
        log::info!("  R: Reset scene");
        log::info!("  A: Toggle low-power driver");
        log::info!("  N: Low-power step");
        log::info!("  Escape: Quit");

        self.presenter = Some(Presenter {
            gpu,
            buffers,
            pipeline,
        });
        self.next_tick = Instant::now() + self.tick_period;
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(presenter) = &mut self.presenter {
                    log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                    presenter.gpu.resize(new_size);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.draw(),
            _ => {}
        }
    }
}

/// Presented frames per second, reported once a second
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}
