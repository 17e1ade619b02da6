// Form-state controller and its HTTP surface.
// The controller owns the draft; handlers only lock it and call in.

pub mod controller;
pub mod handlers;
pub mod progress;

pub use controller::FormController;
