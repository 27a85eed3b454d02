//! [`Platform`] backed by the browser window.
//!
//! Only built for `wasm32`. Notifications are dispatched as `CustomEvent`s
//! on `document`, so other widgets listen for them by name.

use std::time::Duration;

use futures::future::LocalBoxFuture;
use turbo_observability::StructuredLogger;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use crate::platform::{Platform, TimerTask};

/// The live page.
pub struct BrowserPlatform {
    logger: StructuredLogger,
}

impl Default for BrowserPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BrowserPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserPlatform").finish_non_exhaustive()
    }
}

impl BrowserPlatform {
    pub fn new() -> Self {
        Self {
            logger: StructuredLogger::new("browser-platform"),
        }
    }

    fn report(&self, message: &str, error: &JsValue) {
        self.logger
            .warn_builder(message)
            .field("error", format!("{:?}", error))
            .emit();
    }
}

impl Platform for BrowserPlatform {
    fn supports_form_data(&self) -> bool {
        js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("FormData")).unwrap_or(false)
    }

    fn origin(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default()
    }

    fn navigate(&self, url: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.location().set_href(url) {
            self.report("Navigation failed", &e);
        }
    }

    fn notify(&self, event: &str) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        match web_sys::CustomEvent::new(event) {
            Ok(event) => {
                document.dispatch_event(&event).ok();
            }
            Err(e) => self.report("Notification failed", &e),
        }
    }

    fn set_timeout(&self, delay: Duration, task: TimerTask) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::once_into_js(move || task());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            millis,
        ) {
            self.report("Timer scheduling failed", &e);
        }
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(future);
    }
}
