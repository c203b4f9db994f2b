// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! One loaded script bound to one host.

use std::path::Path;

use maki_interpreter::{
    ClassTable, ElementId, ObjectModel, ObjectRef, Program, Value, Vm, load,
};
use tracing::{debug, info, warn};

use crate::bridge::MemoryBridge;
use crate::config::Config;
use crate::error::{Result, SessionError};
use crate::event::{EventTarget, HostEvent};

/// A running script with its host and clock.
///
/// Every method runs to completion on the calling thread. A script fault is
/// returned as [`SessionError::Execution`] and leaves the session usable.
#[derive(Debug)]
pub struct Session {
    vm: Vm,
    bridge: MemoryBridge,
    clock_ms: u64,
    started: bool,
}

impl Session {
    /// Binds a loaded program to a fresh object model and an empty host.
    pub fn new(program: Program, config: &Config) -> Result<Self> {
        let model = ObjectModel::with_seed(ClassTable::standard()?, config.random_seed);
        Ok(Self {
            vm: Vm::new(program, model, config.vm.clone()),
            bridge: MemoryBridge::new(),
            clock_ms: 0,
            started: false,
        })
    }

    /// Loads a program image.
    pub fn from_bytes(bytes: &[u8], config: &Config) -> Result<Self> {
        Self::new(load(bytes)?, config)
    }

    /// Reads and loads a compiled `.maki` file.
    pub fn open(path: &Path, config: &Config) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| SessionError::io(path, e))?;
        let session = Self::from_bytes(&bytes, config)?;
        info!(
            path = %path.display(),
            size = bytes.len(),
            "program loaded"
        );
        Ok(session)
    }

    /// Replaces the host before the script starts.
    pub fn with_bridge(mut self, bridge: MemoryBridge) -> Self {
        self.bridge = bridge;
        self
    }

    /// The interpreter.
    pub fn vm(&self) -> &Vm {
        &self.vm
    }

    /// Mutable access to the interpreter.
    pub fn vm_mut(&mut self) -> &mut Vm {
        &mut self.vm
    }

    /// The host.
    pub fn bridge(&self) -> &MemoryBridge {
        &self.bridge
    }

    /// Mutable access to the host.
    pub fn bridge_mut(&mut self) -> &mut MemoryBridge {
        &mut self.bridge
    }

    /// Host time in milliseconds.
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Whether `onScriptLoaded` has been delivered.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Delivers `System.onScriptLoaded`. Later calls do nothing.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            debug!("script already started");
            return Ok(());
        }
        self.started = true;
        self.vm.start(&mut self.bridge)?;
        Ok(())
    }

    /// Resolves an event target to a live instance. `None` when a variable
    /// holds no object or a destroyed one.
    pub fn resolve(&mut self, target: EventTarget) -> Result<Option<ObjectRef>> {
        match target {
            EventTarget::System => Ok(Some(self.vm.system())),
            EventTarget::Variable(v) => match self.vm.variable(v) {
                Some(value) => Ok(value
                    .as_object()
                    .filter(|r| self.vm.model().is_alive(*r))),
                None => Err(SessionError::UnknownTarget(target.to_string())),
            },
            EventTarget::Element(element) => self
                .bind_element(element)
                .map(Some)
                .ok_or_else(|| SessionError::UnknownTarget(target.to_string())),
        }
    }

    /// Delivers a host event and everything it queues.
    ///
    /// Events for a variable without a live object are dropped.
    pub fn dispatch(&mut self, event: &HostEvent) -> Result<Value> {
        let Some(target) = self.resolve(event.target)? else {
            debug!(%event, "event target holds no object");
            return Ok(Value::Void);
        };
        let value = self
            .vm
            .deliver_event(&mut self.bridge, target, &event.name, &event.args)?;
        Ok(value)
    }

    /// Moves the clock forward and fires what came due.
    pub fn advance(&mut self, delta_ms: u64) -> Result<()> {
        self.clock_ms = self.clock_ms.saturating_add(delta_ms);
        self.vm.tick(&mut self.bridge, self.clock_ms)?;
        Ok(())
    }

    /// The instance mirroring a host element, created on first use.
    pub fn bind_element(&mut self, element: ElementId) -> Option<ObjectRef> {
        let info = self.bridge.info(element)?;
        Some(self.vm.model_mut().bind_element(&info))
    }

    /// Removes an element subtree from the host and invalidates the
    /// instances bound to it. Returns how many instances died.
    pub fn destroy_element(&mut self, element: ElementId) -> usize {
        let removed = self.bridge.remove(element);
        let model = self.vm.model_mut();
        let invalidated = removed
            .into_iter()
            .filter_map(|e| model.element_destroyed(e))
            .count();
        debug!(element = element.0, invalidated, "host element destroyed");
        invalidated
    }

    /// Delivers `System.onScriptUnloading` and destroys every instance.
    pub fn unload(&mut self) -> Result<()> {
        if !self.started {
            warn!("unloading a script that never started");
        }
        self.started = false;
        self.vm.unload(&mut self.bridge)?;
        Ok(())
    }
}
