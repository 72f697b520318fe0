//! Arena Evolution headless driver
//!
//! Runs the simulation without a renderer: autofarm plays, the first offered
//! class is taken at every gate, and a summary is logged at the end.
//!
//! Usage: `arena-evolution [settings.json | normal | lite] [seconds] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use arena_evolution::{GameMode, Settings};
    use arena_evolution::sim::{GameState, StatKind, TickInput, tick};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(arg) => match GameMode::from_str(&arg) {
            Some(mode) => Settings::from_mode(mode),
            None => Settings::load_from(&arg).unwrap_or_else(|e| {
                log::warn!("Using default settings, could not load {arg}: {e}");
                Settings::default()
            }),
        },
        None => Settings::default(),
    };
    let seconds: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0xA7E4A);

    log::info!(
        "Arena Evolution (headless) starting: seed {seed}, {seconds}s, {} mode",
        settings.mode.as_str()
    );

    let mut state = GameState::with_settings(seed, settings);
    if state.settings.initial_shapes {
        state.populate();
    }

    let mut input = TickInput::default();
    input.controls.set_autofarm(true);

    let frame_ms = 1000.0 / 60.0;
    let frames = (seconds * 60.0) as u64;
    for i in 0..frames {
        tick(&mut state, &input, i as f64 * frame_ms);

        if let Some(first) = state.upgrade.as_ref().and_then(|o| o.classes.first().copied()) {
            if let Err(e) = state.choose_class(first) {
                log::warn!("Auto-pick failed: {e}");
            }
        }
        while state.player.stat_points > 0 {
            if state.upgrade_stat(StatKind::XpGain).is_err() {
                break;
            }
        }
        if state.game_over {
            break;
        }
    }

    let player = &state.player;
    log::info!(
        "Finished after {} frames: level {} {:?}, score {}, {} shapes alive{}",
        state.frame,
        player.level,
        player.tank_class,
        state.score,
        state.shapes.len(),
        if state.game_over { " (destroyed)" } else { "" }
    );
    println!(
        "level={} class={:?} score={} frames={}",
        player.level, player.tank_class, state.score, state.frame
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}
