pub mod config;
pub mod diagram;
pub mod fold_state;
pub mod panic_handler;
pub mod parsing;
pub mod session_storage;
pub mod viewport;
pub mod widget;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export the widget's main types at the crate root
pub use widget::table_of_contents::tree::{Fold, FoldControl, TocNode, TocTree};
pub use widget::table_of_contents::{Key, KeyInput, TocChange, TocController, decorate, render};
