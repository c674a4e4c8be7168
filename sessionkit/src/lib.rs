//! Distribution crate for `SessionKit`. Re-exports [`sessionkit_core`] and carries its
//! `UniFFI` scaffolding so a single library can be linked into the Swift and Kotlin
//! packages.

pub use sessionkit_core::*;

sessionkit_core::uniffi_reexport_scaffolding!();
