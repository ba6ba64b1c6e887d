//! SDL2 render surface
//!
//! Window creation, texture upload and key polling via the sdl2 crate.

use std::time::{Duration, Instant};

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};
use tracing::info;

use crate::acquire::frame::{DisplayImage, PixelFormat};
use crate::display::surface::{RenderSurface, SurfaceEvent, ENTER_KEY};
use crate::error::Error;
use crate::DisplayConfig;

const ESCAPE_KEY: i32 = 27;

pub struct Sdl2Surface {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    event_pump: sdl2::EventPump,
}

impl Sdl2Surface {
    pub fn new(sdl: &sdl2::Sdl, title: &str, config: &DisplayConfig) -> Result<Self, Error> {
        let video = sdl.video().map_err(Error::Surface)?;

        let window = video
            .window(title, config.width, config.height)
            .position_centered()
            .build()
            .map_err(Error::surface)?;

        let canvas = window
            .into_canvas()
            .present_vsync()
            .build()
            .map_err(Error::surface)?;
        let texture_creator = canvas.texture_creator();
        let event_pump = sdl.event_pump().map_err(Error::Surface)?;

        info!("display window ready");
        Ok(Self {
            canvas,
            texture_creator,
            event_pump,
        })
    }
}

impl RenderSurface for Sdl2Surface {
    fn show(&mut self, image: &DisplayImage) -> Result<(), Error> {
        let render_start = Instant::now();

        let texture_format = match image.format {
            PixelFormat::Bgr24 => PixelFormatEnum::BGR24,
            PixelFormat::Rgb24 => PixelFormatEnum::RGB24,
            from => {
                return Err(Error::UnsupportedFormat {
                    from,
                    to: PixelFormat::Bgr24,
                })
            }
        };

        let mut texture = self
            .texture_creator
            .create_texture_streaming(texture_format, image.width, image.height)
            .map_err(Error::surface)?;
        texture
            .update(None, &image.data, image.pitch())
            .map_err(Error::surface)?;

        self.canvas.clear();
        self.canvas
            .copy(&texture, None, None)
            .map_err(Error::Surface)?;
        self.canvas.present();

        metrics::histogram!("render_time_us").record(render_start.elapsed().as_micros() as f64);
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<SurfaceEvent>, Error> {
        let timeout = timeout.as_millis().min(u128::from(u32::MAX)) as u32;
        match self.event_pump.wait_event_timeout(timeout) {
            Some(Event::Quit { .. }) => Ok(Some(SurfaceEvent::Closed)),
            Some(Event::KeyDown {
                keycode: Some(key), ..
            }) => Ok(Some(SurfaceEvent::Key(key_code(key)))),
            _ => Ok(None),
        }
    }

    fn destroy(&mut self) -> Result<(), Error> {
        self.canvas.window_mut().hide();
        Ok(())
    }
}

fn key_code(key: Keycode) -> i32 {
    if key == Keycode::Return {
        ENTER_KEY
    } else if key == Keycode::Escape {
        ESCAPE_KEY
    } else {
        -1
    }
}
