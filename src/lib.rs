#![allow(clippy::collapsible_if)]

pub mod animation;
pub mod betting;
pub mod calibration;
pub mod config;
pub mod defaults;
pub mod layout;
pub mod logging;
pub mod net;
pub mod reducer;
pub mod storage;
pub mod tui;
pub mod view;
