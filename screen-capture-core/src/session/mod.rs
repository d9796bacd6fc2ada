pub mod controller;
pub mod events;
pub mod recording;
pub mod transition;
