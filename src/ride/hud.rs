//! DOM overlays around the canvas: score / hearts / level readouts, the pause
//! button, and the landing screen with the persisted rider name. All elements
//! are created (or reused) by id with inline styles; updates are best-effort
//! since a missing element is never worth failing a frame over.

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Document, window};

const HEART_FULL: &str = "<span style='color:#ff4d4d;font-size:16px;margin-right:6px;'>♥</span>";
const HEART_EMPTY: &str = "<span style='color:#6b6b6b;font-size:16px;margin-right:6px;'>♡</span>";

pub(super) fn ensure_overlays(doc: &Document) -> Result<(), JsValue> {
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;

    if doc.get_element_by_id("pr-score").is_none() {
        let div = doc.create_element("div")?;
        div.set_id("pr-score");
        div.set_text_content(Some("Score: 0"));
        div.set_attribute("style", "position:fixed; top:10px; left:12px; font-family:'Fira Code', monospace; font-size:15px; padding:4px 8px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#ffd166; z-index:45; letter-spacing:0.5px;").ok();
        body.append_child(&div)?;
    }
    if doc.get_element_by_id("pr-hearts").is_none() {
        let div = doc.create_element("div")?;
        div.set_id("pr-hearts");
        div.set_inner_html(&HEART_FULL.repeat(3));
        div.set_attribute("style", "position:fixed; top:10px; left:140px; font-family:'Fira Code', monospace; font-size:15px; padding:4px 8px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; z-index:44; letter-spacing:0.5px;").ok();
        body.append_child(&div)?;
    }
    if doc.get_element_by_id("pr-level").is_none() {
        let div = doc.create_element("div")?;
        div.set_id("pr-level");
        div.set_text_content(Some("Level 1"));
        div.set_attribute("style", "position:fixed; top:10px; left:270px; font-family:'Fira Code', monospace; font-size:15px; padding:4px 8px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#9fd6ff; z-index:44; letter-spacing:0.5px;").ok();
        body.append_child(&div)?;
    }
    if doc.get_element_by_id("pr-pause").is_none() {
        let btn = doc.create_element("button")?;
        btn.set_id("pr-pause");
        btn.set_text_content(Some("Pause"));
        btn.set_attribute("style", "position:fixed; top:10px; right:12px; font-family:'Fira Code', monospace; font-size:15px; padding:4px 12px; background:#26324a; border:1px solid #333; border-radius:6px; color:#eee; cursor:pointer; z-index:45;").ok();
        body.append_child(&btn)?;
    }
    Ok(())
}

pub(super) fn ensure_landing(doc: &Document, saved_name: Option<&str>) -> Result<(), JsValue> {
    if doc.get_element_by_id("pr-landing").is_some() {
        return Ok(());
    }
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let overlay = doc.create_element("div")?;
    overlay.set_id("pr-landing");
    overlay.set_attribute("style", "position:fixed; inset:0; display:flex; flex-direction:column; align-items:center; justify-content:center; gap:12px; background:rgba(10,14,22,0.92); font-family:'Fira Code', monospace; color:#eee; z-index:60;").ok();

    let title = doc.create_element("div")?;
    title.set_text_content(Some("Plank Rider"));
    title
        .set_attribute("style", "font-size:34px; color:#ffd166;")
        .ok();
    overlay.append_child(&title)?;

    let greeting = doc.create_element("div")?;
    greeting.set_id("pr-greeting");
    match saved_name {
        Some(name) => greeting.set_text_content(Some(&format!("Welcome back, {name}!"))),
        None => greeting.set_text_content(Some("Enter your name to ride.")),
    }
    overlay.append_child(&greeting)?;

    let input = doc.create_element("input")?;
    input.set_id("pr-name-input");
    input.set_attribute("placeholder", "Your name").ok();
    input.set_attribute("style", "font-family:inherit; font-size:16px; padding:6px 10px; background:#10161f; border:1px solid #444; border-radius:6px; color:#eee;").ok();
    if let Some(name) = saved_name {
        input.set_attribute("value", name).ok();
    }
    overlay.append_child(&input)?;

    let save = doc.create_element("button")?;
    save.set_id("pr-save-name");
    save.set_text_content(Some("Save Name"));
    save.set_attribute("style", "font-family:inherit; font-size:16px; padding:6px 16px; background:#26324a; border:1px solid #444; border-radius:6px; color:#eee; cursor:pointer;").ok();
    overlay.append_child(&save)?;

    let play = doc.create_element("button")?;
    play.set_id("pr-play");
    play.set_text_content(Some("Play"));
    play.set_attribute("style", "font-family:inherit; font-size:18px; padding:8px 28px; background:#2f6b3a; border:1px solid #444; border-radius:6px; color:#fff; cursor:pointer;").ok();
    overlay.append_child(&play)?;

    body.append_child(&overlay)?;
    Ok(())
}

pub(super) fn hide_landing() {
    if let Some(doc) = window().and_then(|w| w.document()) {
        if let Some(el) = doc.get_element_by_id("pr-landing") {
            el.set_attribute("style", "display:none;").ok();
        }
    }
}

pub(super) fn set_greeting(text: &str) {
    if let Some(doc) = window().and_then(|w| w.document()) {
        if let Some(el) = doc.get_element_by_id("pr-greeting") {
            el.set_text_content(Some(text));
        }
    }
}

pub(super) fn name_input_value() -> Option<String> {
    let doc = window().and_then(|w| w.document())?;
    let el = doc.get_element_by_id("pr-name-input")?;
    el.dyn_into::<web_sys::HtmlInputElement>()
        .ok()
        .map(|input| input.value())
}

pub(super) fn update_hud(chances: u32, score: u32, level: u32) {
    if let Some(doc) = window().and_then(|w| w.document()) {
        if let Some(el) = doc.get_element_by_id("pr-score") {
            el.set_text_content(Some(&format!("Score: {score}")));
        }
        if let Some(el) = doc.get_element_by_id("pr-level") {
            el.set_text_content(Some(&format!("Level {level}")));
        }
        if let Some(el) = doc.get_element_by_id("pr-hearts") {
            let filled = chances.min(3) as usize;
            let mut html = HEART_FULL.repeat(filled);
            html.push_str(&HEART_EMPTY.repeat(3 - filled));
            el.set_inner_html(&html);
        }
    }
}

pub(super) fn set_pause_label(paused: bool) {
    if let Some(doc) = window().and_then(|w| w.document()) {
        if let Some(el) = doc.get_element_by_id("pr-pause") {
            el.set_text_content(Some(if paused { "Resume" } else { "Pause" }));
        }
    }
}

// --- Name persistence (the only stored state) --------------------------------

pub(super) fn saved_name() -> Option<String> {
    let storage = window()?.local_storage().ok()??;
    storage.get_item(crate::RIDER_NAME_KEY).ok()?
}

pub(super) fn save_name(name: &str) {
    if let Some(storage) = window().and_then(|w| w.local_storage().ok().flatten()) {
        storage.set_item(crate::RIDER_NAME_KEY, name).ok();
    }
}
