//! `SessionKit` keeps a web application embedded in a native mobile shell signed in.
//!
//! The hosted page owns a volatile, page-scoped store; the host owns a persistent store that
//! survives restarts. This crate reconciles the two on every page load, turns in-page
//! "sign in with Google" links into a native account-picker flow backed by a token exchange,
//! and purges every copy of the session when the page shows a logout action.
//!
//! Hosts plug in their capabilities through foreign traits:
//! [`VolatileStore`], [`PersistentStore`], [`NativeSignIn`] (or [`GoogleSignInPlatform`] behind
//! the bundled [`GoogleSignInPlugin`]) and [`PageHost`], and drive everything through a
//! single [`SessionBridge`].
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

mod error;
pub use error::*;

pub mod logger;

mod config;
pub use config::*;

pub(crate) mod http_request;

pub mod store;
pub use store::{PersistentStore, StoreError, VolatileStore};

mod session;
pub use session::*;

mod page;
pub use page::*;

pub mod intercept;
pub use intercept::{ClickAction, ClickDisposition, ClickEvent, ElementSnapshot};

pub mod sign_in;
pub use sign_in::{
    GoogleSignInPlatform, GoogleSignInPlugin, IdentityAssertion, NativeSignIn, SignInError,
};

mod exchange;
pub use exchange::*;

mod credential_bridge;
pub use credential_bridge::*;

mod messages;
pub use messages::*;

pub mod shell;

mod bridge;
pub use bridge::*;

#[cfg(test)]
mod test_support;

uniffi::setup_scaffolding!("sessionkit_core");
