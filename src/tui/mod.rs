pub mod input;
pub mod layout;
pub mod table_ui;
pub mod widgets;

pub use input::{CalibrationCommand, InputEffect, InputState};
pub use layout::{ScreenLayout, SurfaceProjection};
pub use table_ui::{TableUI, TableUIAction};
pub use widgets::{BettingPanel, BoardWidget, LogWidget, SeatWidget, TableSurfaceWidget};
