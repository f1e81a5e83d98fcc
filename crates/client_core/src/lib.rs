//! Client side of the ask chat: turn lifecycle, `/ask` transport, Markdown and theme handling.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod markdown;
pub mod theme;

pub use backend::{AskBackend, HttpAskClient};
pub use config::{load_settings, ClientSettings};
pub use controller::{ChatTurnController, TranscriptView, TurnOutcome};
pub use error::StoreError;
pub use markdown::{HtmlMarkdown, MarkdownRenderer, StyledMarkdown, StyledText};
pub use theme::{JsonFileStore, KeyValueStore, MemoryStore, ThemeController, ThemePresenter};
