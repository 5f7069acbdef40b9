//! Headless demo: runs the cube field without a window.
//!
//! A scripted "player" walks forward, spawns a few cubes, removes some,
//! toggles gravity, and the frame loop logs what a renderer would draw.
//!
//! ```text
//! RUST_LOG=info cargo run --example headless [config.json]
//! ```

use cubefield::prelude::*;

const FRAMES: u32 = 600;
const DT: f32 = 1.0 / 60.0;

/// Stands in for a GPU renderer: remembers the last frame and logs a
/// summary once a second.
#[derive(Default)]
struct LogRenderer {
    frames: u32,
    last_instances: usize,
}

impl Renderer for LogRenderer {
    fn draw_cubes(&mut self, camera: &CameraView, instances: &[InstanceData]) {
        self.frames += 1;
        self.last_instances = instances.len();
        if self.frames % 60 == 0 {
            log::info!(
                "frame {:4}: {} cubes, camera at {:.1?}",
                self.frames,
                instances.len(),
                camera.eye
            );
        }
    }
}

/// Which key is down on a given frame.
fn scripted_keys(frame: u32) -> &'static [KeyCode] {
    match frame {
        0..=119 => &[KeyCode::KeyW],
        120..=179 => &[KeyCode::KeyW, KeyCode::KeyQ],
        200 | 230 | 260 => &[KeyCode::Digit1],
        300 | 310 => &[KeyCode::Digit2],
        360 => &[KeyCode::KeyG],
        420 => &[KeyCode::Digit3],
        480 => &[KeyCode::KeyG],
        _ => &[],
    }
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match DemoConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}; using defaults");
                DemoConfig::default()
            }
        },
        None => DemoConfig::default(),
    };

    let mut app = App::new(config);
    let mut renderer = LogRenderer::default();

    for frame in 0..FRAMES {
        let keys = scripted_keys(frame);
        let raw = app.raw_input_mut();
        raw.release_all();
        for &key in keys {
            raw.set_key(key, true);
        }

        app.frame(DT, &mut renderer);
        if app.quit_requested() {
            break;
        }
    }

    let stats = app.stats();
    let player = app
        .world()
        .get::<Transform>(app.player())
        .map(|t| t.position)
        .unwrap_or_default();
    log::info!(
        "done after {} frames: {} entities, {} components, {} drawn, player at {:.2?}",
        stats.frame,
        stats.entity_count,
        stats.component_count,
        renderer.last_instances,
        player
    );

    #[cfg(feature = "diagnostics")]
    for timing in app.world().system_timings() {
        log::info!("  {:<24} {:>8.1} µs", timing.name, timing.duration_us);
    }
}
