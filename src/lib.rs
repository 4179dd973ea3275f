//! CodeMentor: a chat tutor for AP Computer Science students.
//!
//! Questions go to a hosted Gemini model with a teaching preamble that keeps
//! replies to hints and guided reasoning. The conversation is windowed for
//! context, persisted between runs, and rendered either as HTML for the
//! local web page or as colored text for the terminal.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod events;
pub mod llm;
pub mod render;
pub mod session;
pub mod web;
