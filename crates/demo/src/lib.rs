//! `permgate-demo` — wires an auth store and an ability together and renders
//! the gated screen as text.

pub mod config;
pub mod view;

pub use config::{DemoConfig, MappingChoice};
pub use view::{Button, Press, Screen, render};
