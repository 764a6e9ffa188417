pub mod catalog;
pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod geo;
pub mod i18n;
pub mod layers;
pub mod map;
pub mod panel;
pub mod script;
pub mod selection;
pub mod surface;
