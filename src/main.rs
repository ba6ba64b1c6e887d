//! Iris: asynchronous frame grab with a bounded relay and SDL2 display

use clap::Parser;
use color_eyre::Result;
use tracing::info;

use iris::acquire::sim;
use iris::display::Sdl2Surface;
use iris::error::Error;
use iris::{session, Config};

/// Stream a camera into a window with a frames-per-second overlay.
#[derive(Debug, Parser)]
#[command(name = "iris", version)]
struct Args {
    /// ID of the camera to use (first available camera if not specified)
    camera_id: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iris=info".into()),
        )
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    let args = Args::parse();

    info!("Iris launching...");

    let config = Config::load()?;

    let cameras = sim::discover(&config.camera);
    let mut camera = sim::select_camera(cameras, args.camera_id.as_deref())?;
    camera.negotiate_display_format(config.relay.display_format)?;

    info!("Streaming from '{}'", camera.name());

    let sdl = sdl2::init().map_err(Error::Surface)?;
    let title = config
        .display
        .window_title
        .replace("{camera}", &camera.name());
    let surface = Sdl2Surface::new(&sdl, &title, &config.display)?;

    session::run(&mut camera, surface, &config)?;

    info!("Iris shutting down");
    Ok(())
}
