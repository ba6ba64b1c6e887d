//! End-to-end pipeline tests: simulated backend, relay, bounded queue and a
//! scripted render surface.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use iris::acquire::sim;
use iris::display::surface::{RenderSurface, SurfaceEvent, ENTER_KEY};
use iris::error::Error;
use iris::{session, Config, DisplayImage, PixelFormat};

fn test_config() -> Config {
    let mut config = Config::default();
    config.camera.width = 32;
    config.camera.height = 24;
    config.camera.fps = 200;
    config.camera.buffer_count = 4;
    config.relay.queue_capacity = 4;
    config.relay.log_rate = false;
    config.display.target_fps = 0;
    config.display.poll_timeout_ms = 1;
    config
}

#[derive(Clone, Default)]
struct Probe {
    shows: Arc<AtomicUsize>,
    destroys: Arc<AtomicUsize>,
}

/// Surface that renders into counters and presses Enter after `stop_after`
/// frames have been shown.
struct ScriptedSurface {
    probe: Probe,
    stop_after: usize,
    fail_show_at: Option<usize>,
}

impl RenderSurface for ScriptedSurface {
    fn show(&mut self, _image: &DisplayImage) -> Result<(), Error> {
        let shown = self.probe.shows.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_show_at == Some(shown) {
            return Err(Error::Surface("injected render failure".into()));
        }
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> Result<Option<SurfaceEvent>, Error> {
        if self.probe.shows.load(Ordering::SeqCst) >= self.stop_after {
            Ok(Some(SurfaceEvent::Key(ENTER_KEY)))
        } else {
            Ok(None)
        }
    }

    fn destroy(&mut self) -> Result<(), Error> {
        self.probe.destroys.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn streams_until_the_stop_key_and_stops_the_backend_once() {
    let config = test_config();
    let mut camera = sim::select_camera(sim::discover(&config.camera), None).unwrap();
    camera
        .negotiate_display_format(config.relay.display_format)
        .unwrap();

    let probe = Probe::default();
    let surface = ScriptedSurface {
        probe: probe.clone(),
        stop_after: 10,
        fail_show_at: None,
    };

    session::run(&mut camera, surface, &config).unwrap();

    assert!(probe.shows.load(Ordering::SeqCst) >= 10);
    assert_eq!(probe.destroys.load(Ordering::SeqCst), 1);
    assert_eq!(camera.stop_calls(), 1);

    let stats = camera.pool_stats().unwrap();
    assert!(stats.delivered() > 0);
    assert_eq!(stats.delivered(), stats.returned());
}

#[test]
fn a_surface_failure_still_stops_the_backend_once() {
    let config = test_config();
    let mut camera = sim::select_camera(sim::discover(&config.camera), None).unwrap();

    let probe = Probe::default();
    let surface = ScriptedSurface {
        probe: probe.clone(),
        stop_after: usize::MAX,
        fail_show_at: Some(3),
    };

    let err = session::run(&mut camera, surface, &config).unwrap_err();
    assert!(matches!(err, Error::Surface(_)));

    assert_eq!(camera.stop_calls(), 1);
    assert_eq!(probe.destroys.load(Ordering::SeqCst), 1);

    let stats = camera.pool_stats().unwrap();
    assert_eq!(stats.delivered(), stats.returned());
}

#[test]
fn incomplete_frames_are_skipped_without_ending_the_stream() {
    let mut config = test_config();
    config.camera.incomplete_every = Some(2);

    let mut camera = sim::select_camera(sim::discover(&config.camera), None).unwrap();
    let probe = Probe::default();
    let surface = ScriptedSurface {
        probe: probe.clone(),
        stop_after: 5,
        fail_show_at: None,
    };

    session::run(&mut camera, surface, &config).unwrap();

    assert!(probe.shows.load(Ordering::SeqCst) >= 5);
    let stats = camera.pool_stats().unwrap();
    assert_eq!(stats.delivered(), stats.returned());
}

#[test]
fn a_yuyv_camera_streams_through_conversion() {
    let mut config = test_config();
    config.camera.format = PixelFormat::Yuyv4;

    let mut camera = sim::select_camera(sim::discover(&config.camera), None).unwrap();
    camera
        .negotiate_display_format(config.relay.display_format)
        .unwrap();

    let probe = Probe::default();
    let surface = ScriptedSurface {
        probe: probe.clone(),
        stop_after: 3,
        fail_show_at: None,
    };

    session::run(&mut camera, surface, &config).unwrap();
    assert!(probe.shows.load(Ordering::SeqCst) >= 3);
}

#[test]
fn zero_cameras_fails_before_any_streaming() {
    let mut config = test_config();
    config.camera.count = 0;

    let err = sim::select_camera(sim::discover(&config.camera), None).unwrap_err();
    assert!(matches!(err, Error::NoCameras));
}

#[test]
fn an_unknown_camera_id_is_unavailable() {
    let config = test_config();
    let err = sim::select_camera(sim::discover(&config.camera), Some("SIM-9")).unwrap_err();
    assert!(matches!(err, Error::CameraUnavailable(id) if id == "SIM-9"));
}
