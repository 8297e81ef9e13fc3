//! Browser glue for the ride: canvas, frame loop, keyboard wiring and DOM
//! overlays. Everything here is a consumer of the [`crate::round`] command
//! stream; no game rule lives in this module. The loop / listener plumbing
//! follows the usual wasm-bindgen closure patterns (`requestAnimationFrame`
//! recursion through an `Rc<RefCell<Option<Closure>>>`, forgotten event
//! listener closures).

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, window};

use crate::round::{Command, FeedbackKind, Round, Status};

mod hud;

// --- Screen mapping ----------------------------------------------------------
// World distances are signed z positions (forward = more negative). On screen
// the rider sits at a fixed x and the world slides past it, left to right.

const CANVAS_W: u32 = 800;
const CANVAS_H: u32 = 360;
const PIXELS_PER_UNIT: f64 = 26.0;
const RIDER_SCREEN_X: f64 = 120.0;
const PLANK_Y: f64 = 260.0;
const PLANK_MARK_STEP: f64 = 5.0;

fn screen_x(rider_distance: f64, z: f64) -> f64 {
    RIDER_SCREEN_X + (rider_distance - z) * PIXELS_PER_UNIT
}

// --- Runtime state -----------------------------------------------------------

/// Presentation copy of the live prompt, as last commanded.
struct PromptSprite {
    character: char,
    distance: f64,
}

/// Transient feedback flash; expires after its duration, and a newer flash
/// simply overwrites it (the pending clear is implicit in the age check).
struct FeedbackFlash {
    kind: FeedbackKind,
    duration_ms: f64,
    start_ms: f64,
}

struct RideState {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    round: Round,
    started: bool,
    rider_distance: f64,
    prompt: Option<PromptSprite>,
    feedback: Option<FeedbackFlash>,
    // Timestamp of the previous frame; None right after start/resume so the
    // first delta is zero and a pause gap never reaches `advance`.
    last_ts: Option<f64>,
    // True while a requestAnimationFrame callback is outstanding; guards
    // against double-scheduling when resuming.
    frame_armed: bool,
}

thread_local! {
    static RIDE_STATE: RefCell<Option<RideState>> = RefCell::new(None);
    static FRAME_CB: RefCell<Option<FrameCallback>> = RefCell::new(None);
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

// --- Entry -------------------------------------------------------------------

pub fn start_ride_mode() -> Result<(), JsValue> {
    // Idempotent: a second call just leaves the running game alone.
    let already = RIDE_STATE.with(|cell| cell.borrow().is_some());
    if already {
        return Ok(());
    }

    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Create / reuse the ride canvas.
    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id("pr-ride-canvas") {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id("pr-ride-canvas");
        c.set_width(CANVAS_W);
        c.set_height(CANVAS_H);
        c.set_attribute("style", "position:fixed; left:50%; top:45%; transform:translate(-50%,-50%); box-shadow:0 0 32px 0 rgba(0,0,0,0.18); border-radius:12px; border:2px solid #222; background:#181818; z-index:20;").ok();
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    ctx.set_text_align("center");

    let saved = hud::saved_name();
    hud::ensure_overlays(&doc)?;
    hud::ensure_landing(&doc, saved.as_deref())?;

    let now = performance_now();
    let state = RideState {
        canvas,
        ctx,
        round: Round::new(now as u64),
        started: false,
        rider_distance: crate::round::RIDER_START,
        prompt: None,
        feedback: None,
        last_ts: None,
        frame_armed: false,
    };
    RIDE_STATE.with(|cell| cell.replace(Some(state)));

    install_frame_loop();

    // Keyboard: letters go to the round, Escape toggles pause, Enter
    // acknowledges game-over and restarts.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let key = evt.key();
            if key == "Escape" {
                toggle_pause();
            } else {
                handle_key(&key);
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    attach_click(&doc, "pr-save-name", on_save_name)?;
    attach_click(&doc, "pr-play", on_play)?;
    attach_click(&doc, "pr-pause", toggle_pause)?;

    Ok(())
}

fn attach_click(doc: &web_sys::Document, id: &str, f: fn()) -> Result<(), JsValue> {
    if let Some(el) = doc.get_element_by_id(id) {
        let closure =
            Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| f()) as Box<dyn FnMut(_)>);
        el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

// --- UI handlers -------------------------------------------------------------

fn on_save_name() {
    let name = hud::name_input_value().unwrap_or_default();
    let trimmed = name.trim();
    if trimmed.is_empty() {
        hud::set_greeting("Please enter a name.");
    } else {
        hud::save_name(trimmed);
        hud::set_greeting(&format!("Name saved: {trimmed}"));
    }
}

fn on_play() {
    let now = performance_now();
    RIDE_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            if !state.started {
                state.started = true;
                let mut cmds: Vec<Command> = Vec::new();
                state.round.start(&mut cmds);
                apply_commands(state, &cmds, now);
            } else if state.round.status() == Status::Paused {
                state.round.resume();
                state.last_ts = None;
                hud::set_pause_label(false);
            }
        }
    });
    hud::hide_landing();
    request_frame();
}

fn toggle_pause() {
    let mut resumed = false;
    RIDE_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            if !state.started {
                return;
            }
            match state.round.status() {
                Status::Running => {
                    // The in-flight frame still fires once, sees Paused, and
                    // does not reschedule; the subscription is then suspended.
                    state.round.pause();
                    hud::set_pause_label(true);
                }
                Status::Paused => {
                    state.round.resume();
                    state.last_ts = None;
                    hud::set_pause_label(false);
                    resumed = true;
                }
                Status::Over => {}
            }
        }
    });
    if resumed {
        request_frame();
    }
}

fn handle_key(key: &str) {
    let now = performance_now();
    RIDE_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            if !state.started {
                return;
            }
            if key == "Enter" {
                if state.round.status() == Status::Over {
                    let mut cmds: Vec<Command> = Vec::new();
                    state.round.start(&mut cmds);
                    apply_commands(state, &cmds, now);
                    state.last_ts = None;
                }
                return;
            }
            // Only literal single characters reach the round; named keys
            // ("Shift", "ArrowUp", ...) are not keystrokes.
            let mut chars = key.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                let mut cmds: Vec<Command> = Vec::new();
                state.round.submit_key(c, &mut cmds);
                apply_commands(state, &cmds, now);
            }
        }
    });
}

// --- Frame loop --------------------------------------------------------------

fn install_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let keep_going = RIDE_STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                state.frame_armed = false;
                ride_tick(state, ts);
                // Paused fully suspends the subscription; Over keeps
                // rendering so the overlay stays live for the Enter ack.
                state.round.status() != Status::Paused
            } else {
                false
            }
        });
        if keep_going {
            request_frame();
        }
    }) as Box<dyn FnMut(f64)>));
    FRAME_CB.with(|cell| cell.replace(Some(g)));
}

/// Arm the next animation frame unless one is already outstanding.
fn request_frame() {
    let was_armed = RIDE_STATE.with(|cell| {
        cell.borrow_mut()
            .as_mut()
            .map(|state| {
                let was = state.frame_armed;
                state.frame_armed = true;
                was
            })
            .unwrap_or(true)
    });
    if was_armed {
        return;
    }
    FRAME_CB.with(|cell| {
        if let Some(cb) = cell.borrow().as_ref() {
            if let (Some(w), Some(closure)) = (window(), cb.borrow().as_ref()) {
                let _ = w.request_animation_frame(closure.as_ref().unchecked_ref());
            }
        }
    });
}

// --- Tick & rendering --------------------------------------------------------

fn ride_tick(state: &mut RideState, now: f64) {
    let dt = match state.last_ts {
        Some(prev) => ((now - prev) / 1000.0).max(0.0),
        None => 0.0,
    };
    state.last_ts = Some(now);

    let mut cmds: Vec<Command> = Vec::new();
    state.round.advance(dt, &mut cmds);
    apply_commands(state, &cmds, now);

    // Age out the feedback flash (a newer flash already replaced any prior
    // one in apply_commands, which is what cancels the pending clear).
    if let Some(fb) = &state.feedback {
        if now - fb.start_ms >= fb.duration_ms {
            state.feedback = None;
        }
    }

    render(state, now);
}

fn apply_commands(state: &mut RideState, cmds: &[Command], now: f64) {
    for cmd in cmds {
        match *cmd {
            Command::PositionRider { distance } => state.rider_distance = distance,
            Command::PlacePrompt {
                character,
                distance,
            } => {
                state.prompt = Some(PromptSprite {
                    character,
                    distance,
                });
            }
            Command::RemovePrompt => state.prompt = None,
            Command::ShowFeedback { kind, duration_ms } => {
                state.feedback = Some(FeedbackFlash {
                    kind,
                    duration_ms: duration_ms as f64,
                    start_ms: now,
                });
            }
            Command::RenderHud {
                chances,
                score,
                level,
            } => hud::update_hud(chances, score, level),
            // The terminal overlay is drawn from round status each frame.
            Command::GameOver => {}
        }
    }
}

fn render(state: &mut RideState, now: f64) {
    let w = state.canvas.width() as f64;
    let h = state.canvas.height() as f64;

    // Sky / backdrop.
    state.ctx.set_fill_style_str("#182030");
    state.ctx.fill_rect(0.0, 0.0, w, h);

    // Plank band with distance marks sliding past the rider.
    state.ctx.set_fill_style_str("#8b4513");
    state.ctx.fill_rect(0.0, PLANK_Y, w, h - PLANK_Y);
    state.ctx.set_stroke_style_str("rgba(0,0,0,0.35)");
    state.ctx.set_line_width(2.0);
    let z_far = state.rider_distance - (w - RIDER_SCREEN_X) / PIXELS_PER_UNIT;
    let z_near = state.rider_distance + RIDER_SCREEN_X / PIXELS_PER_UNIT;
    let mut mark = (z_far / PLANK_MARK_STEP).floor() * PLANK_MARK_STEP;
    while mark <= z_near {
        let mx = screen_x(state.rider_distance, mark);
        line(&state.ctx, mx, PLANK_Y, mx, PLANK_Y + 14.0);
        mark += PLANK_MARK_STEP;
    }

    // Rider block.
    let rider_size = 34.0;
    state.ctx.set_fill_style_str("#3355ff");
    state.ctx.set_stroke_style_str("#101840");
    state.ctx.set_line_width(3.0);
    state.ctx.fill_rect(
        RIDER_SCREEN_X - rider_size / 2.0,
        PLANK_Y - rider_size,
        rider_size,
        rider_size,
    );
    state.ctx.stroke_rect(
        RIDER_SCREEN_X - rider_size / 2.0,
        PLANK_Y - rider_size,
        rider_size,
        rider_size,
    );

    // Prompt glyph, layered stroke + fill so it reads against the backdrop.
    if let Some(prompt) = &state.prompt {
        let px = screen_x(state.rider_distance, prompt.distance);
        if px > -40.0 && px < w + 40.0 {
            let glyph = prompt.character.to_string();
            state.ctx.set_font("56px 'Fira Code', monospace");
            state.ctx.set_line_width(6.0);
            state.ctx.set_stroke_style_str("rgba(0,0,0,0.85)");
            state.ctx.stroke_text(&glyph, px, PLANK_Y - 18.0).ok();
            state.ctx.set_fill_style_str("#ffe34d");
            state.ctx.fill_text(&glyph, px, PLANK_Y - 18.0).ok();
        }
    }

    // Feedback flash, fading out until it expires.
    if let Some(fb) = &state.feedback {
        let age = now - fb.start_ms;
        let alpha = 1.0 - (age / fb.duration_ms).clamp(0.0, 1.0);
        if alpha > 0.0 {
            let (text, rgb) = match fb.kind {
                FeedbackKind::Hit => ("HIT!", "80,220,120"),
                FeedbackKind::Miss => ("MISS", "255,80,80"),
                FeedbackKind::WrongKey => ("WRONG KEY", "255,180,60"),
            };
            state.ctx.set_font("40px 'Fira Code', monospace");
            state
                .ctx
                .set_fill_style_str(&format!("rgba({rgb},{alpha})"));
            state.ctx.fill_text(text, w / 2.0, 90.0).ok();
        }
    }

    // GAME OVER overlay; the round stays terminal until Enter restarts it.
    if state.round.status() == Status::Over {
        state.ctx.set_fill_style_str("rgba(0,0,0,0.55)");
        state.ctx.fill_rect(0.0, 0.0, w, h);
        state.ctx.set_font("72px 'Fira Code', monospace");
        state.ctx.set_line_width(6.0);
        state.ctx.set_stroke_style_str("#000000");
        state.ctx.set_fill_style_str("#ffffff");
        state.ctx.stroke_text("GAME OVER", w / 2.0, h / 2.0).ok();
        state.ctx.fill_text("GAME OVER", w / 2.0, h / 2.0).ok();
        state.ctx.set_font("20px 'Fira Code', monospace");
        state
            .ctx
            .fill_text("Press Enter to ride again", w / 2.0, h / 2.0 + 44.0)
            .ok();
    }
}

fn line(ctx: &CanvasRenderingContext2d, x1: f64, y1: f64, x2: f64, y2: f64) {
    ctx.begin_path();
    ctx.move_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.stroke();
}
