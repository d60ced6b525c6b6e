mod anim;
mod app;
mod config;
mod debug;
mod draw;
mod input;
mod render;
mod scene;

fn main() {
    env_logger::init();
    log::info!("Capydance starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
