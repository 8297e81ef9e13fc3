//! Plank Rider core crate.
//!
//! A rider glides forward along a plank while oncoming letters must be typed
//! before they pass; misses cost chances, hits add score and levels. The game
//! rules live in [`round`] as a pure state machine so they test natively;
//! everything browser-facing (canvas, HUD overlays, input, the frame loop) is
//! glue in the `ride` module that only does anything under wasm.

use wasm_bindgen::prelude::*;

pub mod round;
mod ride;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Prompt alphabet
// -----------------------------------------------------------------------------

/// The nine home-row keys a prompt can ask for. Lowercase on purpose: input is
/// matched as-is, case-sensitively, so an uppercase keystroke never matches.
pub const MIDDLE_ROW_KEYS: [char; 9] = ['a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l'];

/// `localStorage` key for the player's display name (the only persisted state).
pub const RIDER_NAME_KEY: &str = "riderName";

// -----------------------------------------------------------------------------
// Unified entrypoint
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    ride::start_ride_mode()
}
