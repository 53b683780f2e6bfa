#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Environment registry
//!
//! Maps environment ids such as `"llvm-autophase-ic-v0"` to the parameters
//! needed to construct them.
//!
//! A [`Registry`] is an ordinary value: build it once at start-up, register
//! every provider into it, then share it (for example behind an `Arc`) with
//! whatever needs to construct environments. It is `Sync`, so several
//! harnesses may call [`Registry::make`] concurrently. Registration takes
//! `&mut self` and therefore happens before the registry is shared.
//!
//! Registering an id twice is rejected; the first registration stays intact.

pub mod error;
pub mod options;
pub mod registry;
pub mod spec;

pub use error::{MakeError, RegistrationError};
pub use options::{MakeOptions, MakeOptionsError};
pub use registry::Registry;
pub use spec::{EntryPoint, EnvId, EnvKwargs, EnvSpec};
