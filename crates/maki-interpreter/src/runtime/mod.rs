// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The object model: runtime classes, instances and values.

pub mod class;
pub mod heap;
pub mod instance;
pub mod model;
pub mod value;

pub use class::{ClassTable, Method, RuntimeClass};
pub use heap::ObjectRef;
pub use instance::{Instance, NativeState};
pub use model::{ObjectModel, PendingEvent};
pub use value::Value;
