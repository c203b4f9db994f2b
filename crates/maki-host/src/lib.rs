// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # maki-host
//!
//! Hosts a compiled MAKI script outside a real skin engine.
//!
//! This crate provides:
//!
//! - [`Session`]: a loaded program, its object model and its host
//! - [`EventLoop`]: timer ticks and host events on a tokio runtime
//! - [`MemoryBridge`]: an in-memory element tree standing in for the UI
//! - [`Config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use maki_host::{Config, EventLoop, Session};
//!
//! #[tokio::main]
//! async fn main() -> maki_host::Result<()> {
//!     let config = Config::load(None)?;
//!     let mut session = Session::open("main.maki".as_ref(), &config)?;
//!     let mut event_loop = EventLoop::new(config.tick_interval());
//!     event_loop.run(&mut session, Some(100)).await;
//!     session.unload()
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod config;
pub mod error;
pub mod event;
pub mod runtime;

// Re-exports
pub use bridge::{Element, MemoryBridge, Mutation};
pub use config::Config;
pub use error::{Result, SessionError};
pub use event::{EventTarget, HostEvent};
pub use runtime::{EventLoop, LoopHandle, LoopStats, Session};
