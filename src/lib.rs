pub mod cancel;
pub mod cli;
pub mod config;
pub mod ctx;
pub mod design;
pub mod error;
pub mod grid;
pub mod io;
pub mod math;
pub mod model;
pub mod pipeline;
pub mod power;
pub mod sampler;
pub mod schema;
pub mod sim;

pub use error::SimError;
