//! Quiz Invaders entry point
//!
//! The web build is driven from JS through `WebGame`. Natively this runs
//! headless autopilot sessions and logs how they went.
//!
//! Usage: `quiz-invaders [seed] [sessions]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use quiz_invaders::autopilot;
    use quiz_invaders::{Session, SessionState};

    /// 60 Hz display frames
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up on a session after ten simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 10;
    /// How often the simulated player knows the answer
    const ANSWER_SKILL: f64 = 0.7;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let sessions: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);

    log::info!("Quiz Invaders (native demo): {} sessions from seed {}", sessions, seed);

    for run in 0..sessions {
        let run_seed = seed.wrapping_add(run);
        let mut session = match Session::with_builtin_bank(run_seed) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Could not load the question bank: {}", e);
                std::process::exit(1);
            }
        };
        let mut player = Pcg32::seed_from_u64(run_seed ^ 0x5eed);

        session.start();
        let mut frames = 0;
        while !session.state().is_finished() && frames < MAX_FRAMES {
            if session.state() == SessionState::Quiz {
                let answer = session.current_question().map(|q| {
                    if player.random_bool(ANSWER_SKILL) {
                        q.correct_answer.clone()
                    } else {
                        String::from("?")
                    }
                });
                let Some(answer) = answer else {
                    break;
                };
                session.submit_answer(&answer);
                continue;
            }
            let intents = autopilot::steer(session.simulation());
            session.frame(FRAME_DT, &intents);
            session.drain_events();
            frames += 1;
        }

        let stats = session.stats();
        log::info!(
            "Run {} (seed {}): {:?} after {:.1}s, level {}, score {}, lives {}, {} kills, accuracy {:.0}%",
            run + 1,
            run_seed,
            session.state(),
            frames as f32 * FRAME_DT,
            stats.level,
            stats.score,
            stats.lives,
            stats.enemies_destroyed,
            stats.accuracy() * 100.0
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `web::wasm_start`, this is just to satisfy the compiler
}
