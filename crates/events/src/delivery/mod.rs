//! External delivery channels for alert notifications.
//!
//! Each channel is configured independently from the environment; an
//! unconfigured channel is simply absent and the dispatcher skips it.

pub mod email;
pub mod webhook;
