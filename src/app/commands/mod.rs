pub mod doctor;
pub mod grant;
pub mod provision;
pub mod secret;
pub mod settings;
pub mod teardown;
