//! Round state machine for the plank ride.
//!
//! Pure game rules, no wasm / browser types, so everything here runs under
//! `cargo test` on the host. The browser glue in `ride` feeds this machine two
//! inputs (a frame-time advance and a keystroke) and consumes the [`Command`]
//! stream it emits; how those commands are rendered is not this module's
//! concern.

// --- Tunables (distances are signed z positions, forward = more negative) ---

/// Units of distance the rider covers per second.
pub const RIDER_SPEED: f64 = 5.0;
/// How far in front of the rider a fresh prompt is placed.
pub const SPAWN_DISTANCE_AHEAD: f64 = 20.0;
/// Slack past the prompt before an unresolved prompt counts as missed.
pub const MISS_MARGIN: f64 = 0.5;
/// Where the rider stands when a round starts.
pub const RIDER_START: f64 = -5.0;
/// With no prompt live, one is spawned once the rider has ridden past this.
pub const WARMUP_THRESHOLD: f64 = -10.0;
/// Misses allowed before the round ends.
pub const STARTING_CHANCES: u32 = 3;
/// How long a feedback flash stays visible.
pub const FEEDBACK_MS: u32 = 1500;

/// Score needed to sit at each level; level N requires `[N - 1]` points.
/// Index 0 is level 1 (a fresh round).
pub static LEVEL_SCORE_THRESHOLDS: [u32; 6] = [0, 10, 25, 45, 70, 100];

// --- Commands to the presentation layer -------------------------------------

/// What a feedback flash is telling the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedbackKind {
    /// Correct key, prompt resolved.
    Hit,
    /// Prompt timed out unresolved; a chance was spent.
    Miss,
    /// Keystroke did not match the prompt; the prompt stays live.
    WrongKey,
}

/// One instruction to whatever is drawing the game. The machine never touches
/// the DOM or a canvas itself; it only emits these.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    RenderHud { chances: u32, score: u32, level: u32 },
    ShowFeedback { kind: FeedbackKind, duration_ms: u32 },
    PlacePrompt { character: char, distance: f64 },
    RemovePrompt,
    PositionRider { distance: f64 },
    GameOver,
}

/// Sink for emitted commands. `Vec<Command>` implements this, which is what
/// both the browser glue and the tests use.
pub trait CommandSink {
    fn emit(&mut self, cmd: Command);
}

impl CommandSink for Vec<Command> {
    fn emit(&mut self, cmd: Command) {
        self.push(cmd);
    }
}

// --- Round state -------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Paused,
    Over,
}

/// The single character the player currently has to type, and where it sits.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Prompt {
    character: char,
    spawn_distance: f64,
}

/// Small LCG so prompt selection is deterministic under a fixed seed.
/// Same multiplier/increment the prototype randomness always used; not crypto.
pub(crate) struct Lcg {
    state: u64,
}

impl Lcg {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub(crate) fn next_index(&mut self, len: usize) -> usize {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        ((self.state >> 16) as usize) % len.max(1)
    }
}

/// One play session: chances, score, level, rider position and the single
/// pending prompt. All mutation goes through the methods below; every
/// transition reports itself through the [`CommandSink`].
pub struct Round {
    chances: u32,
    score: u32,
    level: u32,
    rider_distance: f64,
    status: Status,
    prompt: Option<Prompt>,
    // False while a rendering asset (e.g. a glyph font) is still loading;
    // spawning is deferred, never failed.
    spawn_ready: bool,
    rng: Lcg,
}

impl Round {
    /// A fresh machine. No prompt is live yet; the host is expected to call
    /// [`Round::start`] (if it forgets, the warm-up rule in [`Round::advance`]
    /// spawns the first prompt anyway).
    pub fn new(seed: u64) -> Self {
        Self {
            chances: STARTING_CHANCES,
            score: 0,
            level: 1,
            rider_distance: RIDER_START,
            status: Status::Running,
            prompt: None,
            spawn_ready: true,
            rng: Lcg::new(seed),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn chances(&self) -> u32 {
        self.chances
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn rider_distance(&self) -> f64 {
        self.rider_distance
    }

    /// Character of the live prompt, if any.
    pub fn active_prompt(&self) -> Option<char> {
        self.prompt.map(|p| p.character)
    }

    /// Gate prompt spawning on asset readiness. While the gate is closed no
    /// prompt spawns; once reopened the next `advance` past the warm-up
    /// threshold spawns one.
    pub fn set_spawn_ready(&mut self, ready: bool) {
        self.spawn_ready = ready;
    }

    /// Begin (or restart) a round: chances/score/level reset, rider back at
    /// the start, any stale prompt cleared and a fresh one spawned. Also the
    /// required acknowledgement after game-over; `Over` is terminal until the
    /// host calls this.
    pub fn start(&mut self, sink: &mut impl CommandSink) {
        self.chances = STARTING_CHANCES;
        self.score = 0;
        self.level = 1;
        self.rider_distance = RIDER_START;
        self.status = Status::Running;
        self.prompt = None;
        sink.emit(Command::PositionRider {
            distance: self.rider_distance,
        });
        self.emit_hud(sink);
        self.spawn_prompt(sink);
    }

    /// Suspend the round. No-op unless currently `Running`; the host is
    /// expected to stop delivering frame ticks while paused.
    pub fn pause(&mut self) {
        if self.status == Status::Running {
            self.status = Status::Paused;
        }
    }

    /// Undo [`Round::pause`]. No-op unless currently `Paused`.
    pub fn resume(&mut self) {
        if self.status == Status::Paused {
            self.status = Status::Running;
        }
    }

    /// One frame tick: move the rider forward by `RIDER_SPEED * dt` and
    /// resolve the prompt deadline. Negative `dt` is clamped to zero.
    /// No-op unless `Running`.
    pub fn advance(&mut self, dt: f64, sink: &mut impl CommandSink) {
        if self.status != Status::Running {
            return;
        }
        let dt = dt.max(0.0);
        self.rider_distance -= RIDER_SPEED * dt;
        sink.emit(Command::PositionRider {
            distance: self.rider_distance,
        });

        if let Some(prompt) = self.prompt {
            // Rode past the letter without resolving it: timeout miss.
            if self.rider_distance < prompt.spawn_distance - MISS_MARGIN {
                self.prompt = None;
                sink.emit(Command::RemovePrompt);
                self.chances = self.chances.saturating_sub(1);
                sink.emit(Command::ShowFeedback {
                    kind: FeedbackKind::Miss,
                    duration_ms: FEEDBACK_MS,
                });
                self.emit_hud(sink);
                if self.chances == 0 {
                    self.status = Status::Over;
                    sink.emit(Command::GameOver);
                } else {
                    self.spawn_prompt(sink);
                }
            }
        } else if self.rider_distance < WARMUP_THRESHOLD {
            // No prompt live (deferred spawn, or start was never called):
            // spawn one once the warm-up stretch is behind the rider.
            self.spawn_prompt(sink);
        }
    }

    /// One keystroke, matched exactly and case-sensitively against the live
    /// prompt. A match scores and respawns; a mismatch only flashes feedback
    /// and leaves the prompt live (it can still be hit or time out). No-op
    /// when not `Running` or when no prompt is live — in particular a
    /// keystroke delivered after a same-tick timeout miss falls through here.
    pub fn submit_key(&mut self, key: char, sink: &mut impl CommandSink) {
        if self.status != Status::Running {
            return;
        }
        let Some(prompt) = self.prompt else {
            return;
        };
        if key == prompt.character {
            self.prompt = None;
            self.score += 1;
            self.bump_level();
            sink.emit(Command::ShowFeedback {
                kind: FeedbackKind::Hit,
                duration_ms: FEEDBACK_MS,
            });
            self.emit_hud(sink);
            self.spawn_prompt(sink);
        } else {
            sink.emit(Command::ShowFeedback {
                kind: FeedbackKind::WrongKey,
                duration_ms: FEEDBACK_MS,
            });
        }
    }

    // Place a new prompt SPAWN_DISTANCE_AHEAD of the rider. The remove is
    // emitted unconditionally so a stale sprite can never survive a respawn.
    fn spawn_prompt(&mut self, sink: &mut impl CommandSink) {
        if !self.spawn_ready {
            return;
        }
        sink.emit(Command::RemovePrompt);
        let character = crate::MIDDLE_ROW_KEYS[self.rng.next_index(crate::MIDDLE_ROW_KEYS.len())];
        let prompt = Prompt {
            character,
            spawn_distance: self.rider_distance - SPAWN_DISTANCE_AHEAD,
        };
        self.prompt = Some(prompt);
        sink.emit(Command::PlacePrompt {
            character: prompt.character,
            distance: prompt.spawn_distance,
        });
    }

    fn bump_level(&mut self) {
        while (self.level as usize) < LEVEL_SCORE_THRESHOLDS.len()
            && self.score >= LEVEL_SCORE_THRESHOLDS[self.level as usize]
        {
            self.level += 1;
        }
    }

    fn emit_hud(&self, sink: &mut impl CommandSink) {
        sink.emit(Command::RenderHud {
            chances: self.chances,
            score: self.score,
            level: self.level,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_is_deterministic() {
        let mut a = Lcg::new(42);
        let mut b = Lcg::new(42);
        for _ in 0..32 {
            assert_eq!(a.next_index(9), b.next_index(9));
        }
    }

    #[test]
    fn test_lcg_stays_in_range() {
        let mut rng = Lcg::new(7);
        for _ in 0..256 {
            assert!(rng.next_index(9) < 9);
        }
        assert_eq!(rng.next_index(0), 0);
    }

    #[test]
    fn test_spawn_places_prompt_ahead_of_rider() {
        let mut round = Round::new(1);
        let mut cmds: Vec<Command> = Vec::new();
        round.start(&mut cmds);
        let placed = cmds.iter().find_map(|c| match c {
            Command::PlacePrompt {
                character,
                distance,
            } => Some((*character, *distance)),
            _ => None,
        });
        let (ch, dist) = placed.expect("start() must place a prompt");
        assert!(crate::MIDDLE_ROW_KEYS.contains(&ch));
        assert!((dist - (RIDER_START - SPAWN_DISTANCE_AHEAD)).abs() < 1e-9);
        assert_eq!(round.active_prompt(), Some(ch));
    }

    #[test]
    fn test_spawn_emits_remove_before_place() {
        let mut round = Round::new(3);
        let mut cmds: Vec<Command> = Vec::new();
        round.start(&mut cmds);
        let remove_at = cmds
            .iter()
            .position(|c| *c == Command::RemovePrompt)
            .expect("defensive remove expected");
        let place_at = cmds
            .iter()
            .position(|c| matches!(c, Command::PlacePrompt { .. }))
            .expect("place expected");
        assert!(remove_at < place_at);
    }

    #[test]
    fn test_negative_dt_is_clamped() {
        let mut round = Round::new(5);
        let mut cmds: Vec<Command> = Vec::new();
        round.start(&mut cmds);
        let before = round.rider_distance();
        round.advance(-3.0, &mut cmds);
        assert_eq!(round.rider_distance(), before);
    }

    #[test]
    fn test_spawn_gate_defers_until_ready() {
        let mut round = Round::new(9);
        round.set_spawn_ready(false);
        let mut cmds: Vec<Command> = Vec::new();
        round.start(&mut cmds);
        assert_eq!(round.active_prompt(), None);
        // Ride well past the warm-up stretch; still gated.
        round.advance(2.0, &mut cmds);
        assert_eq!(round.active_prompt(), None);
        // Gate opens: next tick spawns.
        round.set_spawn_ready(true);
        round.advance(0.01, &mut cmds);
        assert!(round.active_prompt().is_some());
    }
}
