//! Terminal front end for the search box.

pub mod components;
pub mod shortcuts;
pub mod tui;
