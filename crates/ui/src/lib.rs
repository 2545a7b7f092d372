#![deny(unsafe_code)]

/// Root view and shell-level actions.
pub mod app;
/// Sidebar, transcript, input and chart widgets of the chat pane.
pub mod chat;
pub mod dashboard;
pub mod login;
/// Mapping from the persisted theme preference to gpui-component themes.
pub mod theme;
