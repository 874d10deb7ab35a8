pub mod io;
pub mod progress;
