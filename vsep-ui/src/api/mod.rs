//! HTTP handlers for vsep-ui

pub mod audio;
pub mod form;
pub mod health;
pub mod page;

pub use audio::serve_track;
pub use form::{show_form, submit_form};
pub use health::health_routes;
