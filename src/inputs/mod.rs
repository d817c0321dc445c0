pub mod controller;
pub mod display;
pub mod persist;
pub mod state;

pub use controller::{InputController, InputSnapshot};
pub use state::{ControllerStatus, InputState};
