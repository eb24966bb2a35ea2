//! Reusable widget components.

pub mod breadcrumb;
pub mod detail;
pub mod status;

pub use breadcrumb::{Breadcrumb, Crumb};
pub use detail::{DetailField, DetailPanel};
pub use status::StatusTag;
