pub mod check;
pub mod watcher;
