pub mod color_removal;
pub mod selection;
