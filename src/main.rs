//! Aqua Arcade entry point
//!
//! Native builds run a headless demo: the autopilot plays the configured
//! mode against a simulated 60 Hz display and logs what happens.
//! The browser build is driven from `web.rs`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use aqua_arcade::collaborators::{BestScoreStore, MemoryBestScoreStore, NullSubmitter};
    use aqua_arcade::sim::autopilot;
    use aqua_arcade::sim::GamePhase;
    use aqua_arcade::{Engine, FileBestScoreStore, FrameOutcome, Settings};

    /// Simulated display refresh
    const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn run() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("Aqua Arcade (native) starting...");

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(rand::random);
        let game_type = settings.mode.game_type();

        let store: Box<dyn BestScoreStore> = match &settings.best_score_path {
            Some(path) => Box::new(FileBestScoreStore::new(path, game_type)),
            None => Box::new(MemoryBestScoreStore::default()),
        };

        let mut engine = match Engine::from_settings(&settings, seed, Box::new(NullSubmitter), store) {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("Invalid settings: {}", e);
                std::process::exit(2);
            }
        };

        let total_frames = (settings.demo_seconds as f64 * 1000.0 / FRAME_MS).ceil() as u64;
        let mut now_ms = 0.0;
        let mut runs = 0u32;
        let mut request = engine.start();

        for _ in 0..total_frames {
            now_ms += FRAME_MS;

            if settings.autopilot && engine.phase() == GamePhase::Playing {
                let input = autopilot::decide(engine.state(), engine.policy());
                engine.set_horizontal_input(input.horizontal);
                if input.jump {
                    engine.jump();
                }
            }

            match request {
                Some(req) => match engine.on_frame(req, now_ms) {
                    FrameOutcome::Ran { next, .. } => request = next,
                    FrameOutcome::Cancelled => request = None,
                },
                None => {
                    // Run over: report it and go again
                    runs += 1;
                    report(&engine, runs);
                    engine.reset();
                    request = engine.start();
                }
            }

            for notice in engine.take_notices() {
                log::warn!("Notice: {:?}", notice);
            }
        }

        if engine.phase() == GamePhase::Playing {
            log::info!(
                "Demo ended mid-run: score {} round {}",
                engine.state().score,
                engine.state().round
            );
        }
        engine.teardown();
        log::info!(
            "{} finished after {} runs, best score {}",
            engine.mode().as_str(),
            runs,
            engine.best_score()
        );
    }

    fn report(engine: &Engine, run: u32) {
        let snapshot = engine.snapshot();
        log::info!(
            "Run {}: score {} (best {}) round {} after {} ticks, ended by {:?}",
            run,
            snapshot.score,
            snapshot.best_score,
            snapshot.round,
            snapshot.tick,
            snapshot.end_cause
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::init, this is just to satisfy the compiler
}
