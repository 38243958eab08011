//! Capability wiring.
//!
//! We use Crux's built-in Render capability directly because it provides
//! all necessary functionality for triggering view updates, and `crux_http`
//! for the two remote calls the kiosk makes. There is deliberately no
//! key-value capability: the backend is the system of record and nothing
//! is persisted on the device.

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

pub type AppHttp = Http<Event>;
pub type AppRender = Render<Event>;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
}
