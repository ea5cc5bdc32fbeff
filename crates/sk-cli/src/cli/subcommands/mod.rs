mod index;

pub use index::IndexCommands;
