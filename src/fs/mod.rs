pub mod listing;
pub mod operations;
pub mod watch;
