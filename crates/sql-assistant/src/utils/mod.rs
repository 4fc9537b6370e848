//! Utilities module - text helpers shared by the sanitizer and the result renderer

pub mod text_utils;

pub use text_utils::TextUtils;
