//! Traffic information panels (DRIPs) on a slippy map.
//!
//! The crate keeps the viewer's state: the panel registry filled from
//! `data.json`, the marker layer whose icons follow the zoom level, the
//! detail sidebar and its swipe-to-dismiss gesture.

pub mod app;
pub mod assets;
pub mod commands;
pub mod constants;
pub mod dataset;
pub mod detail;
pub mod gesture;
pub mod layer;
pub mod marker;
pub mod model;
pub mod registry;
pub mod settings;
pub mod zoom;

pub use app::{AppEvent, HostPage, LoadSummary, Session};
pub use model::{Dataset, Panel, PanelId};
pub use settings::Settings;
