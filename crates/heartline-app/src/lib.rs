//! Application layer for Heartline.
//!
//! This crate provides the controller that coordinates the domain and
//! infrastructure layers behind the rendering loop, plus the toast
//! surface for transient alerts.

pub mod controller;
pub mod toast;

pub use controller::AppController;
pub use toast::{Toast, ToastCenter};
