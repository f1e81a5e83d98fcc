//! UI layer for the desktop client: app shell, Markdown layout and theme chrome.

pub mod app;
pub mod markdown;
pub mod theme;

pub use app::DesktopChatApp;
