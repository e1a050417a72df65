pub mod dialog;
pub mod help;
pub mod panel;
