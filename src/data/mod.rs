pub mod calibration;
pub mod export;
pub mod geometry;
pub mod hotkeys;
pub mod points;
