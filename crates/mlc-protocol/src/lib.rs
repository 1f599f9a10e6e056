pub mod cost;
pub mod outcome;
pub mod run;
pub mod window;

pub use cost::*;
pub use outcome::*;
pub use run::*;
pub use window::*;
