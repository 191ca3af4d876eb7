#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod catalog;
mod controller;
mod error;
mod exercise;
mod filter;
mod name;
mod selection;
mod service;
mod session;
mod workflow;

pub use catalog::*;
pub use controller::*;
pub use error::*;
pub use exercise::*;
pub use filter::*;
pub use name::*;
pub use selection::*;
pub use service::*;
pub use session::*;
pub use workflow::*;
