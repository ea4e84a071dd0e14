// Drill engine, persistence and dictionary loading. The terminal front end in
// main.rs drives it; tests and benches use it directly.

rust_i18n::i18n!("locales", fallback = "en");

pub mod app;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod event;
pub mod practice;
pub mod scheme;
pub mod session;
pub mod store;
pub mod ui;
