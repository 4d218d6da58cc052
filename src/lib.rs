pub mod finalize;
pub mod logging;
pub mod recording;
pub mod repl;
