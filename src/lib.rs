pub mod app;
pub mod game;
pub mod protocol;
pub mod room_runtime;
pub mod shared;
pub mod transport;
