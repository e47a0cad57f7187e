use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_AUTOSAVE_DELAY_MS: u32 = 2000;
pub(crate) const DEFAULT_SAVED_INDICATOR_MS: u32 = 3000;
pub(crate) const DEFAULT_COLOR: &str = "#ffffff";
pub(crate) const DEFAULT_SHARE_BASE_URL: &str = "natepad://local/";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Quiet period after the last edit before an auto-save commits.
    pub autosave_delay_ms: u32,
    /// How long the "saved" indicator stays up before returning to idle.
    pub saved_indicator_ms: u32,
    pub default_color: String,
    pub share_base_url: String,
}

impl AppConfig {
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            Self::from_window()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::defaults()
        }
    }

    pub fn defaults() -> Self {
        Self {
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            saved_indicator_ms: DEFAULT_SAVED_INDICATOR_MS,
            default_color: DEFAULT_COLOR.to_string(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
        }
    }

    /// Overrides come from `window.ENV`. Both `AUTOSAVE_DELAY_MS` and
    /// `autosave_delay_ms` spellings are accepted.
    #[cfg(target_arch = "wasm32")]
    fn from_window() -> Self {
        let mut config = Self::defaults();

        let Some(window) = web_sys::window() else {
            return config;
        };

        if let Ok(location) = window.location().href() {
            let base = location.split(['?', '#']).next().unwrap_or_default();
            if !base.is_empty() {
                config.share_base_url = base.to_string();
            }
        }

        let Some(env) = window.get("ENV") else {
            return config;
        };
        if env.is_undefined() || !env.is_object() {
            return config;
        }

        let read = |upper: &str| -> Option<wasm_bindgen::JsValue> {
            let lower = upper.to_ascii_lowercase();
            [upper, lower.as_str()].into_iter().find_map(|k| {
                js_sys::Reflect::get(&env, &k.into())
                    .ok()
                    .filter(|v| !v.is_undefined() && !v.is_null())
            })
        };

        if let Some(v) = read("AUTOSAVE_DELAY_MS").and_then(|v| js_number_or_string(&v)) {
            config.autosave_delay_ms = v;
        }
        if let Some(v) = read("SAVED_INDICATOR_MS").and_then(|v| js_number_or_string(&v)) {
            config.saved_indicator_ms = v;
        }
        if let Some(v) = read("DEFAULT_COLOR").and_then(|v| v.as_string()) {
            if !v.trim().is_empty() {
                config.default_color = v;
            }
        }
        if let Some(v) = read("SHARE_BASE_URL").and_then(|v| v.as_string()) {
            if !v.trim().is_empty() {
                config.share_base_url = v;
            }
        }

        config
    }
}

#[cfg(target_arch = "wasm32")]
fn js_number_or_string(v: &wasm_bindgen::JsValue) -> Option<u32> {
    if let Some(n) = v.as_f64() {
        return (n.is_finite() && n >= 0.0).then(|| n as u32);
    }
    v.as_string().and_then(|s| parse_millis(&s))
}

#[cfg(any(target_arch = "wasm32", test))]
pub(crate) fn parse_millis(s: &str) -> Option<u32> {
    s.trim().parse::<u32>().ok()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
