//! Text-generation provider implementations for TaskBot.
//!
//! All providers implement the `taskbot_core::Provider` trait.
//! [`router::build_from_config`] picks the right one at startup.

pub mod gemini;
pub mod router;
pub mod timeout;
pub mod unconfigured;

pub use gemini::GeminiProvider;
pub use router::build_from_config;
pub use timeout::TimeoutProvider;
pub use unconfigured::UnconfiguredProvider;
