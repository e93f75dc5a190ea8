//! Session state machine
//!
//! Owns the simulation, the stats and the question source, and decides what a
//! frame means in each mode. The engine is only advanced while `Playing`; a
//! pause or an open quiz simply skips the call.
//!
//! ```text
//! Menu --start--> Playing <--pause/resume--> Paused
//! Playing --enemy hit--> Quiz --answer--> Playing
//! Playing --last life--> GameOver     Playing --final wave--> Victory
//! any --restart--> Playing
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::input::Intents;
use crate::quiz::{Question, QuestionBank, QuestionSource};
use crate::settings::Settings;
use crate::sim::{SimEvent, SimulationState, Snapshot, advance};
use crate::stats::{SessionStats, StatsDelta};
use crate::tuning::Tuning;

/// Top-level mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Menu,
    Playing,
    Paused,
    Quiz,
    GameOver,
    Victory,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Menu => "menu",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::Quiz => "quiz",
            SessionState::GameOver => "gameOver",
            SessionState::Victory => "victory",
        }
    }

    /// Game over or victory
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionState::GameOver | SessionState::Victory)
    }
}

/// Fire-and-forget notifications for audio and effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionEvent {
    Shoot,
    Explosion,
    CorrectAnswer,
    WrongAnswer,
    LevelUp,
    PlayerHit,
    GameOver,
    Victory,
}

/// Result of a submitted answer, for the quiz feedback panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: String,
    pub explanation: String,
    /// Score change actually applied (after the zero floor)
    pub score_delta: i64,
}

/// One play-through, from the menu to game over or victory
pub struct Session {
    state: SessionState,
    sim: SimulationState,
    stats: SessionStats,
    questions: Box<dyn QuestionSource>,
    current_question: Option<Question>,
    /// Enemy hits still waiting for their quiz
    pending_quizzes: u32,
    /// Wave emptied while quizzes were outstanding
    wave_cleared_pending: bool,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(seed: u64, tuning: Tuning, questions: impl QuestionSource + 'static) -> Self {
        let stats = SessionStats::new(tuning.starting_lives);
        Self {
            state: SessionState::Menu,
            sim: SimulationState::new(seed, tuning),
            stats,
            questions: Box::new(questions),
            current_question: None,
            pending_quizzes: 0,
            wave_cleared_pending: false,
            events: Vec::new(),
        }
    }

    /// Default balance with the embedded question bank
    pub fn with_builtin_bank(seed: u64) -> Result<Self> {
        let bank = QuestionBank::builtin(seed)?.banded(true);
        Ok(Self::new(seed, Tuning::default(), bank))
    }

    /// Apply player preferences that affect the simulation
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sim.particle_cap = settings.max_particles();
        let excess = self.sim.particles.len().saturating_sub(self.sim.particle_cap);
        self.sim.particles.drain(..excess);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Question awaiting an answer (only while in `Quiz`)
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    pub fn pending_quizzes(&self) -> u32 {
        self.pending_quizzes
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        self.sim.snapshot()
    }

    pub fn simulation(&self) -> &SimulationState {
        &self.sim
    }

    /// Direct access for scripted scenarios and tooling
    pub fn simulation_mut(&mut self) -> &mut SimulationState {
        &mut self.sim
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Menu -> Playing
    pub fn start(&mut self) {
        if self.state != SessionState::Menu {
            return;
        }
        self.reset();
        self.state = SessionState::Playing;
        log::info!("Session started");
    }

    /// Throw away the current run and play again from level 1
    pub fn restart(&mut self) {
        self.reset();
        self.state = SessionState::Playing;
        log::info!("Session restarted");
    }

    /// Abandon the current run and return to the menu
    pub fn quit_to_menu(&mut self) {
        self.reset();
        self.state = SessionState::Menu;
    }

    pub fn pause(&mut self) {
        if self.state == SessionState::Playing {
            self.state = SessionState::Paused;
            log::debug!("Paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == SessionState::Paused {
            self.state = SessionState::Playing;
            log::debug!("Resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            SessionState::Playing => self.pause(),
            SessionState::Paused => self.resume(),
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.sim.reset(1);
        self.stats = SessionStats::new(self.sim.tuning().starting_lives);
        self.sim.player.lives = self.stats.lives;
        self.current_question = None;
        self.pending_quizzes = 0;
        self.wave_cleared_pending = false;
        self.events.clear();
    }

    /// Run one display frame
    ///
    /// Only advances the engine while `Playing`; in every other mode this is a
    /// no-op.
    pub fn frame(&mut self, dt: f32, intents: &Intents) {
        if self.state != SessionState::Playing {
            return;
        }

        for event in advance(&mut self.sim, intents, dt) {
            match event {
                SimEvent::ShotFired { .. } => self.events.push(SessionEvent::Shoot),
                SimEvent::Explosion { .. } => self.events.push(SessionEvent::Explosion),
                SimEvent::EnemyHit {
                    invader_id, points, ..
                } => {
                    log::debug!("Enemy {} hit ({} points), quiz queued", invader_id, points);
                    self.pending_quizzes += 1;
                }
                SimEvent::PlayerHit { cause } => {
                    log::debug!("Player hit: {:?}", cause);
                    self.player_hit();
                    if self.state == SessionState::GameOver {
                        return;
                    }
                }
                SimEvent::WaveCleared { level } => {
                    log::debug!("Wave {} cleared", level);
                    self.wave_cleared_pending = true;
                }
            }
        }

        self.settle();
    }

    fn player_hit(&mut self) {
        let penalty = self.sim.tuning().player_hit_penalty;
        self.apply(&StatsDelta::player_hit(penalty));
        self.events.push(SessionEvent::PlayerHit);

        if self.stats.lives == 0 {
            self.state = SessionState::GameOver;
            self.pending_quizzes = 0;
            self.wave_cleared_pending = false;
            self.events.push(SessionEvent::GameOver);
            log::info!(
                "Game over on level {} with score {}",
                self.stats.level,
                self.stats.score
            );
        }
    }

    /// Open the next queued quiz, or finish the wave once none remain
    fn settle(&mut self) {
        while self.pending_quizzes > 0 {
            self.pending_quizzes -= 1;
            match self.questions.next_question(self.stats.level) {
                Some(question) => {
                    log::debug!("Quiz: question {}", question.id);
                    self.current_question = Some(question);
                    self.state = SessionState::Quiz;
                    return;
                }
                None => log::warn!("No question available, skipping quiz"),
            }
        }

        if std::mem::take(&mut self.wave_cleared_pending) {
            self.complete_wave();
        }
    }

    fn complete_wave(&mut self) {
        let max_level = self.sim.tuning().max_level;
        if self.stats.level >= max_level {
            self.state = SessionState::Victory;
            self.events.push(SessionEvent::Victory);
            log::info!("Victory with score {}", self.stats.score);
            return;
        }

        self.apply(&StatsDelta::level_up());
        self.sim.load_level(self.stats.level);
        self.events.push(SessionEvent::LevelUp);
        log::info!("Level up: now on level {}", self.stats.level);
    }

    /// Answer the open quiz
    ///
    /// Returns `None` (and changes nothing) when no quiz is open.
    pub fn submit_answer(&mut self, answer: &str) -> Option<AnswerOutcome> {
        if self.state != SessionState::Quiz {
            return None;
        }
        let question = self.current_question.take()?;

        let correct = question.is_correct(answer);
        let tuning = self.sim.tuning();
        let delta = if correct {
            StatsDelta::correct_answer(tuning.correct_answer_score)
        } else {
            StatsDelta::wrong_answer(tuning.wrong_answer_penalty)
        };
        let before = self.stats.score;
        self.apply(&delta);
        let score_delta = self.stats.score as i64 - before as i64;

        self.events.push(if correct {
            SessionEvent::CorrectAnswer
        } else {
            SessionEvent::WrongAnswer
        });
        log::debug!(
            "Question {} answered {:?}: {} ({:+})",
            question.id,
            answer,
            if correct { "correct" } else { "wrong" },
            score_delta
        );

        self.state = SessionState::Playing;
        self.settle();

        Some(AnswerOutcome {
            correct,
            correct_answer: question.correct_answer,
            explanation: question.explanation,
            score_delta,
        })
    }

    fn apply(&mut self, delta: &StatsDelta) {
        self.stats.apply_mut(delta, self.sim.tuning().max_level);
        self.sim.player.lives = self.stats.lives;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Bullet, BulletOwner, Size};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn calm_tuning() -> Tuning {
        Tuning {
            invader_reverse_chance: 0.0,
            invader_nudge_chance_per_level: 0.0,
            enemy_fire_chance_per_level: 0.0,
            ..Tuning::default()
        }
    }

    fn always(question: Question) -> impl QuestionSource {
        move |_level: u32| Some(question.clone())
    }

    fn mcq() -> Question {
        Question::multiple_choice(1, "Pick B", &["A", "B", "C", "D"], "B").with_explanation("B")
    }

    fn playing(questions: impl QuestionSource + 'static) -> Session {
        let mut session = Session::new(3, calm_tuning(), questions);
        session.start();
        session
    }

    fn shoot_invader(session: &mut Session, index: usize) {
        let sim = session.simulation_mut();
        let center = sim.invaders[index].center();
        let id = sim.next_entity_id();
        sim.bullets.push(Bullet {
            id,
            pos: center - Vec2::new(3.0, 6.0),
            size: Size::new(6.0, 12.0),
            vel: Vec2::new(0.0, -480.0),
            owner: BulletOwner::Player,
        });
    }

    fn enemy_bullet_on_player(session: &mut Session) {
        let sim = session.simulation_mut();
        let center = sim.player.aabb().center();
        let id = sim.next_entity_id();
        sim.enemy_bullets.push(Bullet {
            id,
            pos: center - Vec2::new(3.0, 5.0),
            size: Size::new(6.0, 10.0),
            vel: Vec2::ZERO,
            owner: BulletOwner::Enemy,
        });
    }

    #[test]
    fn test_menu_ignores_frames() {
        let mut session = Session::new(1, calm_tuning(), always(mcq()));
        assert_eq!(session.state(), SessionState::Menu);
        let before = session.simulation().invaders.clone();
        session.frame(DT, &Intents::default());
        assert_eq!(session.simulation().invaders, before);
        assert_eq!(session.simulation().clock, 0.0);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut session = playing(always(mcq()));
        session.pause();
        assert_eq!(session.state(), SessionState::Paused);
        session.pause();
        assert_eq!(session.state(), SessionState::Paused);

        let clock = session.simulation().clock;
        session.frame(DT, &Intents::default());
        assert_eq!(session.simulation().clock, clock);

        session.toggle_pause();
        assert_eq!(session.state(), SessionState::Playing);
        session.resume();
        assert_eq!(session.state(), SessionState::Playing);
        session.frame(DT, &Intents::default());
        assert!(session.simulation().clock > clock);
    }

    #[test]
    fn test_kill_opens_quiz() {
        let mut session = playing(always(mcq()));
        let before = session.simulation().invaders.len();
        shoot_invader(&mut session, 0);
        session.frame(DT, &Intents::default());

        assert_eq!(session.state(), SessionState::Quiz);
        assert_eq!(session.simulation().invaders.len(), before - 1);
        assert_eq!(session.stats().questions_answered, 0);
        assert_eq!(session.current_question().map(|q| q.id), Some(1));
        assert!(session.drain_events().contains(&SessionEvent::Explosion));

        // Frozen while the quiz is open
        let clock = session.simulation().clock;
        session.frame(DT, &Intents::default());
        session.pause();
        assert_eq!(session.state(), SessionState::Quiz);
        assert_eq!(session.simulation().clock, clock);
    }

    #[test]
    fn test_correct_and_wrong_answers() {
        let mut session = playing(always(mcq()));
        shoot_invader(&mut session, 0);
        session.frame(DT, &Intents::default());
        session.drain_events();

        let outcome = session.submit_answer("B").expect("quiz open");
        assert!(outcome.correct);
        assert_eq!(outcome.score_delta, 100);
        assert_eq!(outcome.explanation, "B");
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.stats().score, 100);
        assert_eq!(session.stats().correct_answers, 1);
        assert_eq!(session.stats().enemies_destroyed, 1);
        assert_eq!(session.drain_events(), vec![SessionEvent::CorrectAnswer]);

        shoot_invader(&mut session, 0);
        session.frame(DT, &Intents::default());
        let outcome = session.submit_answer("C").expect("quiz open");
        assert!(!outcome.correct);
        assert_eq!(outcome.correct_answer, "B");
        assert_eq!(outcome.score_delta, -25);
        assert_eq!(session.stats().score, 75);
        assert_eq!(session.stats().questions_answered, 2);
        assert_eq!(session.stats().enemies_destroyed, 1);
    }

    #[test]
    fn test_answer_without_quiz_is_noop() {
        let mut session = playing(always(mcq()));
        assert!(session.submit_answer("B").is_none());
        assert_eq!(session.stats(), &SessionStats::new(3));
    }

    #[test]
    fn test_double_kill_queues_two_quizzes() {
        let mut session = playing(always(mcq()));
        shoot_invader(&mut session, 0);
        shoot_invader(&mut session, 1);
        session.frame(DT, &Intents::default());
        assert_eq!(session.state(), SessionState::Quiz);
        assert_eq!(session.pending_quizzes(), 1);

        session.submit_answer("B");
        assert_eq!(session.state(), SessionState::Quiz);
        session.submit_answer("B");
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.stats().score, 200);
        assert_eq!(session.stats().questions_answered, 2);
    }

    #[test]
    fn test_missing_question_skips_quiz() {
        let mut session = playing(|_level: u32| -> Option<Question> { None });
        shoot_invader(&mut session, 0);
        session.frame(DT, &Intents::default());
        assert_eq!(session.state(), SessionState::Playing);
        assert!(session.current_question().is_none());
        assert_eq!(session.stats().questions_answered, 0);
    }

    #[test]
    fn test_player_hit_costs_life_and_score() {
        let mut session = playing(always(mcq()));
        enemy_bullet_on_player(&mut session);
        session.frame(DT, &Intents::default());
        assert_eq!(session.stats().lives, 2);
        assert_eq!(session.simulation().player.lives, 2);
        assert_eq!(session.stats().score, 0);
        assert!(session.drain_events().contains(&SessionEvent::PlayerHit));
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut session = playing(always(mcq()));
        for _ in 0..3 {
            enemy_bullet_on_player(&mut session);
        }
        // Same frame also kills an invader: game over wins
        shoot_invader(&mut session, 0);
        session.frame(DT, &Intents::default());
        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.stats().lives, 0);
        assert!(session.current_question().is_none());
        let events = session.drain_events();
        assert_eq!(events.last(), Some(&SessionEvent::GameOver));

        session.frame(DT, &Intents::default());
        assert_eq!(session.state(), SessionState::GameOver);
        session.start();
        assert_eq!(session.state(), SessionState::GameOver);
    }

    #[test]
    fn test_wave_clear_levels_up() {
        let mut session = playing(|_level: u32| -> Option<Question> { None });
        session.simulation_mut().invaders.truncate(1);
        shoot_invader(&mut session, 0);
        session.frame(DT, &Intents::default());
        assert_eq!(session.stats().level, 2);
        assert_eq!(session.simulation().level, 2);
        assert!(!session.simulation().invaders.is_empty());
        assert!(session.drain_events().contains(&SessionEvent::LevelUp));
    }

    #[test]
    fn test_wave_clear_waits_for_quiz() {
        let mut session = playing(always(mcq()));
        session.simulation_mut().invaders.truncate(1);
        shoot_invader(&mut session, 0);
        session.frame(DT, &Intents::default());
        assert_eq!(session.state(), SessionState::Quiz);
        assert_eq!(session.stats().level, 1);

        session.submit_answer("A");
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.stats().level, 2);
    }

    #[test]
    fn test_final_wave_is_victory() {
        let mut session = playing(|_level: u32| -> Option<Question> { None });
        for level in 1..=5 {
            assert_eq!(session.stats().level, level);
            session.simulation_mut().invaders.clear();
            session.frame(DT, &Intents::default());
        }
        assert_eq!(session.state(), SessionState::Victory);
        assert_eq!(session.stats().level, 5);
        assert!(session.drain_events().contains(&SessionEvent::Victory));
    }

    #[test]
    fn test_tuned_final_level() {
        let tuning = Tuning {
            max_level: 7,
            ..calm_tuning()
        };
        let mut session = Session::new(3, tuning, |_level: u32| -> Option<Question> { None });
        session.start();
        for level in 1..=7 {
            assert_eq!(session.stats().level, level);
            session.simulation_mut().invaders.clear();
            session.frame(DT, &Intents::default());
        }
        assert_eq!(session.state(), SessionState::Victory);
        assert_eq!(session.stats().level, 7);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut session = playing(always(mcq()));
        shoot_invader(&mut session, 0);
        session.frame(DT, &Intents::default());
        session.submit_answer("B");
        for _ in 0..3 {
            enemy_bullet_on_player(&mut session);
        }
        session.frame(DT, &Intents::default());
        assert_eq!(session.state(), SessionState::GameOver);

        session.restart();
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.stats(), &SessionStats::new(3));
        let sim = session.simulation();
        assert!(sim.bullets.is_empty() && sim.enemy_bullets.is_empty() && sim.particles.is_empty());
        assert_eq!(sim.invaders.len(), 21);
        assert_eq!(sim.level, 1);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_settings_cap_particles() {
        let mut session = playing(always(mcq()));
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        session.apply_settings(&settings);
        shoot_invader(&mut session, 0);
        session.frame(DT, &Intents::default());
        assert!(session.simulation().particles.is_empty());
    }

    #[test]
    fn test_builtin_session() {
        let mut session = Session::with_builtin_bank(5).expect("builtin bank");
        session.start();
        shoot_invader(&mut session, 0);
        session.frame(DT, &Intents::default());
        assert_eq!(session.state(), SessionState::Quiz);
        assert!(session.current_question().is_some());
    }
}
