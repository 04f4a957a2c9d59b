pub mod discipline;
pub mod league;
pub mod match_engine;
pub mod schedule;
pub mod scout;
pub mod season;
pub mod session;

pub use discipline::*;
pub use league::*;
pub use match_engine::*;
pub use schedule::*;
pub use scout::*;
pub use session::*;
