mod audio;
mod canvas;
mod clock;
mod tracks;
mod ui;
mod utils;

use ambient_viz_core::{ThemePreset, Visualizer};
use audio::CaptureRouter;
use canvas::NannouCanvas;
use clock::NextFrameClock;
use nannou::prelude::*;
use nannou::winit::event::WindowEvent;
use std::cell::RefCell;
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracks::{Track, TrackCursor};
use ui::bindings::{parse_key, Action};
use ui::hud::TrackHud;
use utils::{Config, Resolution};

const DEFAULT_LOG_FILTER: &str = "ambient_viz=info,ambient_viz_core=info";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    CaptureRouter::list_devices();

    nannou::app(model).update(update).exit(exit).run();
}

struct Model {
    /// Keeps the capture stream alive
    _router: CaptureRouter,
    visualizer: RefCell<Visualizer<NextFrameClock>>,
    config: Config,
    tracks: TrackCursor,
    hud: TrackHud,
}

fn model(app: &App) -> Model {
    let args: Vec<String> = env::args().collect();
    let windowed = args.contains(&"--windowed".to_string()) || args.contains(&"-w".to_string());
    let resolution = Resolution::current(windowed);
    app.set_exit_on_escape(false);

    let mut win = app
        .new_window()
        .title("ambient-viz")
        .view(view)
        .key_pressed(key_pressed)
        .raw_event(raw_event)
        .size(resolution.width, resolution.height)
        .min_size(400, 300);

    if resolution.fullscreen {
        win = win.fullscreen();
    }

    let window_id = match win.build() {
        Ok(id) => id,
        Err(e) => {
            error!("Failed to create window: {:?}", e);
            std::process::exit(1);
        }
    };

    // Hide cursor in fullscreen mode
    if resolution.fullscreen {
        if let Some(window) = app.window(window_id) {
            window.set_cursor_visible(false);
        }
    }

    let mut config = Config::load();
    let mut router = CaptureRouter::new(&config);
    if let Some(device) = router.device() {
        info!("Visualizing audio from {}", device.name);
        config.set_device(device.name, device.is_input);
    }

    let mut visualizer = Visualizer::init(&mut router, NextFrameClock::default(), &config.tuning());
    let tracks = TrackCursor::starting_at(config.last_track.as_deref());
    visualizer.set_category(tracks.current().category);

    Model {
        _router: router,
        visualizer: RefCell::new(visualizer),
        config,
        tracks,
        hud: TrackHud::new(),
    }
}

fn update(_app: &App, model: &mut Model, _update: Update) {
    model.hud.tick();
}

fn view(app: &App, model: &Model, frame: Frame) {
    let bounds = app.window_rect();
    let mut visualizer = model.visualizer.borrow_mut();

    // Later frames only paint translucent layers over what is already there
    if frame.nth() == 0 {
        let bg = ThemePreset::Focus.parameters().background;
        frame.clear(rgb(bg[0] / 255.0, bg[1] / 255.0, bg[2] / 255.0));
    }

    let draw = app.draw();
    if let Some(id) = visualizer.scheduler().clock().due() {
        let mut canvas = NannouCanvas::new(&draw, bounds);
        let size = canvas.size();
        visualizer.frame(id, &mut canvas, size);
    }

    let playing = visualizer.scheduler().is_playing();
    model
        .hud
        .draw(&draw, bounds, model.tracks.current(), playing);

    if let Err(e) = draw.to_frame(app, &frame) {
        warn!("Failed to render frame: {:?}", e);
    }
}

fn raw_event(_app: &App, model: &mut Model, event: &WindowEvent) {
    if let WindowEvent::Occluded(occluded) = event {
        model.visualizer.get_mut().set_visible(!occluded);
    }
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    let visualizer = model.visualizer.get_mut();

    match parse_key(key) {
        Some(Action::Quit) => app.quit(),
        Some(Action::TogglePlay) => {
            if visualizer.scheduler().is_playing() {
                visualizer.stop();
            } else if visualizer.is_audio_ready() {
                visualizer.play();
            } else {
                warn!("No audio capture available, staying idle");
            }
            model.hud.show();
        }
        Some(Action::NextTrack) => {
            let track = model.tracks.next();
            switch_track(visualizer, &mut model.config, &mut model.hud, track);
        }
        Some(Action::PreviousTrack) => {
            let track = model.tracks.previous();
            switch_track(visualizer, &mut model.config, &mut model.hud, track);
        }
        Some(Action::ToggleHud) => model.hud.toggle(),
        None => {} // Unhandled key
    }
}

fn switch_track(
    visualizer: &mut Visualizer<NextFrameClock>,
    config: &mut Config,
    hud: &mut TrackHud,
    track: &Track,
) {
    info!("Track: {} ({} BPM, {})", track.key, track.bpm, track.category);
    visualizer.set_category(track.category);
    config.set_track(track.key);
    hud.show();
}

fn exit(_app: &App, mut model: Model) {
    model.visualizer.get_mut().dispose();
}
