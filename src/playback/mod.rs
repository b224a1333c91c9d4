pub mod clock;
pub mod controls;
pub mod engine;
pub mod state;
