//! # cgym: compiler optimization as a gym
//!
//! `cgym` exposes compiler-optimization tasks through the familiar
//! reset/step episode interface used in reinforcement learning. An agent
//! picks optimization passes, the environment applies them to a program and
//! reports features of the result together with a reward for how much the
//! program shrank.
//!
//! ## The Crates
//!
//! -   **`cgym`:** The crate you are currently viewing. It wires every other
//!     crate into a registry and runs the command-line tool.
//! -   **[`gym`]:** The episode contract: the provider trait, spaces and the
//!     [`gym::EnvInstance`] state machine.
//! -   **[`registry`]:** Maps ids such as `llvm-autophase-ic-v0` to
//!     constructors and their defaults.
//! -   **[`compiler`]:** A simulated compiler backend with benchmarks,
//!     optimization passes and feature extraction.
//! -   **[`harness`]:** Random-walk and fuzz drivers that check the contract
//!     after every step.
//!
//! ## Getting Started
//!
//! ```text
//! cgym list
//! cgym random-walk --env llvm-autophase-ic-v0 --steps 20
//! cgym fuzz --env llvm-v0 --observation-space Autophase --seconds 2
//! ```

pub mod app;

pub use compiler;
pub use gym;
pub use harness;
pub use registry;
