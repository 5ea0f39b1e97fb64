pub mod collision;
pub mod constants;
mod lifecycle;
pub mod math;
pub mod room;
pub mod snake;
pub mod types;
pub mod world;
