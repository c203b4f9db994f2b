// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Helper macros shared by the MAKI interpreter crates.
//!
//! # Macros Overview
//!
//! ## Error Handling
//! - [`bail!`] - Early return with an error
//! - [`ensure!`] - Assertion that returns an error instead of panicking
//! - [`try_unwrap!`] - Unwrap an `Option` or return an error
//!
//! ## Types
//! - [`int_enum!`] - Enums convertible from their integer representation
//!
//! ## Testing
//! - [`assert_matches!`], [`assert_ok!`], [`assert_err!`], [`assert_approx_eq!`]
//!
//! # Examples
//!
//! ```
//! use maki_macros::*;
//!
//! int_enum! {
//!     #[derive(Debug, Clone, Copy, PartialEq)]
//!     pub enum Section: u8 {
//!         Classes = 0,
//!         Methods = 1,
//!     }
//! }
//!
//! fn section(byte: u8) -> Result<Section, String> {
//!     let section = try_unwrap!(Section::try_from(byte).ok(), "unknown section");
//!     ensure!(section != Section::Methods, "methods are read elsewhere");
//!     Ok(section)
//! }
//!
//! assert_eq!(section(0), Ok(Section::Classes));
//! assert!(section(1).is_err());
//! assert!(section(9).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod testing;
mod types;
