pub mod clock;
pub mod config;
pub mod controller;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod presets;
pub mod render;
pub mod sampler;
pub mod series;
pub mod session;
