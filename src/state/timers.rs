use super::AppState;
use crate::autosave::Wakeup;
use crate::util::now_ms;
use leptos::logging::warn;
use wasm_bindgen::JsCast;

/// Hands `wakeup` to `window.setTimeout`.
///
/// Timers are never cleared: a superseded wakeup still fires, and the
/// workspace drops it because its ticket is no longer current.
pub(crate) fn schedule(state: AppState, wakeup: Wakeup) {
    let Some(win) = web_sys::window() else {
        warn!("no window; dropping {:?} timer", wakeup.kind);
        return;
    };

    let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
        let next = state.update(|ws| ws.on_wakeup(wakeup, now_ms())).flatten();
        if let Some(next) = next {
            schedule(state, next);
        }
    });

    let delay = i32::try_from(wakeup.delay_ms).unwrap_or(i32::MAX);
    if let Err(e) = win.set_timeout_with_callback_and_timeout_and_arguments_0(
        cb.as_ref().unchecked_ref(),
        delay,
    ) {
        warn!("setTimeout failed: {e:?}");
    }
}
