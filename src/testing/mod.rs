//! Test doubles for the ports.

mod fake_control_plane;
mod instant_wait;
mod scripted_prompt;

pub use fake_control_plane::FakeControlPlane;
pub use instant_wait::InstantWaiter;
pub use scripted_prompt::ScriptedPrompt;
