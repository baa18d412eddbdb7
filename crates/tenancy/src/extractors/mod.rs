//! Axum extractors for the attached tenant.

mod tenant;

pub use tenant::RequireTenant;
