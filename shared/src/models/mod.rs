//! Domain models for the facility operations console

mod document;
mod line_item;
mod master;
mod option;

pub use document::*;
pub use line_item::*;
pub use master::*;
pub use option::*;
