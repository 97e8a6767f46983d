pub mod history;
pub mod preview;
