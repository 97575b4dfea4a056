use serde::{Deserialize, Serialize};

/// Slider values read from the page every frame.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct StateJS {
    pub light: [f32; 3],
    pub scale: f32,
}

impl Default for StateJS {
    fn default() -> Self {
        Self {
            light: [0.0, 0.0, 0.0],
            scale: 0.0,
        }
    }
}

/// Source of [`StateJS`]. In the browser this wraps the page's getter callback.
pub struct ControlFeed {
    #[cfg(target_arch = "wasm32")]
    get_js: js_sys::Function,
}

impl ControlFeed {
    #[cfg(target_arch = "wasm32")]
    pub fn new(get_js: js_sys::Function) -> Self {
        Self { get_js }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(target_arch = "wasm32")]
    #[allow(deprecated)]
    pub fn poll(&self) -> Option<StateJS> {
        use wasm_bindgen::JsValue;

        let value = match self.get_js.call0(&JsValue::null()) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Control callback failed: {:?}", err);
                return None;
            }
        };
        match value.into_serde() {
            Ok(state) => Some(state),
            Err(err) => {
                log::warn!("Malformed control state: {}", err);
                None
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn poll(&self) -> Option<StateJS> {
        None
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn native_feed_has_no_controls() {
        assert_eq!(ControlFeed::new().poll(), None);
    }

    #[test]
    fn state_deserializes_by_field_name() {
        let state: StateJS = toml::from_str("light = [0.5, 1.0, -2.0]\nscale = 2.0").unwrap();
        assert_eq!(
            state,
            StateJS {
                light: [0.5, 1.0, -2.0],
                scale: 2.0
            }
        );
    }
}
