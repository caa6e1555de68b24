//! Backend crate: kernel dispatch primitives for pwhash.
//!
//! - **Selection**: walk a preference-ordered [`Candidate`] list against
//!   detected capabilities and take the first match
//! - **Binding**: a resolve-once [`Dispatcher`] slot that runs selection on
//!   first use and then serves the cached kernel with a single load
//! - **Caching**: [`OnceCache`], a `no_std`-capable write-once cell
//!
//! # Usage
//!
//! Algorithm crates register kernels as an ordered list of `Candidate`s,
//! built with the [`candidates!`] macro:
//!
//! ```ignore
//! use backend::{candidates, dispatch::{ConfigError, Dispatcher, Selected, select}};
//! use platform::{Caps, caps::x86};
//!
//! fn resolve() -> Result<Selected<FillFn>, ConfigError> {
//!   select(platform::caps(), candidates![
//!     "x86_64/avx2" => x86::AVX2  => avx2_kernel,
//!     "reference"   => Caps::NONE => reference_kernel,
//!   ])
//! }
//!
//! static FILL: Dispatcher<FillFn> = Dispatcher::new(resolve);
//! ```
//!
//! The macro expands to `&[Candidate::new(...), ...]`; `#[cfg]` attributes on
//! an entry remove it from the list.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod cache;
pub mod dispatch;

pub use cache::OnceCache;
pub use dispatch::{Candidate, ConfigError, Dispatcher, Selected, select};
// Re-export platform types for convenience.
pub use platform;
