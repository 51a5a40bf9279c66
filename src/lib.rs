#![deny(warnings)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! `pressroom` drafts press releases with an OpenAI-compatible
//! [chat-completion API] and reports the account's token usage.
//!
//! Fill in a [`ReleaseRequest`], pick a [`Tone`], and turn it into a
//! [`ChatRequest`] with a [`Submission`]. [`Client::generate`] sends it and
//! returns a [`Generation`], which is either the generated text, a warning,
//! or a failure with its cause. Usage lookups live in [`usage`].
//!
//! [chat-completion API]: <https://platform.openai.com/docs/api-reference/chat>
//!
//! See the `pressroom` binary for a command line front end.

pub mod key;
pub use key::Key;

pub mod client;
pub use client::Client;

pub mod config;
pub use config::Config;

pub mod model;
pub use model::Model;

pub mod tone;
pub use tone::Tone;

pub mod request;
pub use request::ChatRequest;

pub mod response;
pub use response::Generation;

pub mod release;
pub use release::{ReleaseRequest, ValidationContext};

pub mod prompt;
pub use prompt::{build_prompt, StyleExample, Submission};

pub mod usage;
pub use usage::{DateRange, UsageReport};

pub mod export;
pub use export::Artifact;

/// Re-exports of commonly used crates to avoid version conflicts and reduce
/// dependency bloat.
pub mod exports {
    pub use chrono;
    #[cfg(feature = "log")]
    pub use log;
    pub use reqwest;
    pub use serde;
    pub use serde_json;
}

static_assertions::assert_impl_all!(Client: Send, Sync, Clone);
static_assertions::assert_impl_all!(Generation: Send, Sync);
