//! casegen - draft test cases for a code snippet with a hosted LLM
//!
//! The user declares a language and pastes code. One completion call confirms
//! the language, a second drafts a bounded list of test-case descriptions.
//! Calls go through a deployment gateway authenticated with OAuth2
//! client-credentials tokens that are cached and renewed ahead of expiry.

pub mod auth;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod util;
pub mod validator;
