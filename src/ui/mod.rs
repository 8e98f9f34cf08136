//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into cells on
//! the terminal.  No network I/O happens here.

pub mod form_widget;
pub mod image;
pub mod layout;
pub mod popup;
pub mod spinner;
pub mod theme;
pub mod url_field;
