mod app;
mod gpu;

use winit::event_loop::EventLoop;

use ripple_matrix::{SceneConfig, SharedToy, Toy};

use crate::app::App;

fn main() -> Result<(), winit::error::EventLoopError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (scene, seed) = SceneConfig::from_env();
    let toy = SharedToy::new(Toy::new(scene, seed));

    let event_loop = EventLoop::new()?;
    let mut app = App::new(toy);
    event_loop.run_app(&mut app)
}
