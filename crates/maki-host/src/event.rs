// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Events sent from the host side into a session.

use std::fmt;
use std::str::FromStr;

use maki_interpreter::{ElementId, Value};

use crate::error::SessionError;

/// Who receives an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    /// The System singleton.
    System,
    /// Whatever object a program variable holds.
    Variable(usize),
    /// The instance bound to a host element.
    Element(ElementId),
}

impl fmt::Display for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTarget::System => write!(f, "system"),
            EventTarget::Variable(v) => write!(f, "{v}"),
            EventTarget::Element(e) => write!(f, "#{}", e.0),
        }
    }
}

/// A named event with arguments, as a UI would raise it.
///
/// The text form is `TARGET:NAME[:ARG,...]`, where the target is `system`,
/// a variable index, or `#` followed by an element id:
///
/// ```
/// use maki_host::{EventTarget, HostEvent};
/// use maki_interpreter::Value;
///
/// let event: HostEvent = "3:onSetPosition:128".parse().unwrap();
/// assert_eq!(event.target, EventTarget::Variable(3));
/// assert_eq!(event.args, vec![Value::Int(128)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent {
    /// Receiver.
    pub target: EventTarget,
    /// Event (hook) name.
    pub name: String,
    /// Arguments in declaration order.
    pub args: Vec<Value>,
}

impl HostEvent {
    /// Creates an event without arguments.
    pub fn new(target: EventTarget, name: impl Into<String>) -> Self {
        Self {
            target,
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Adds arguments.
    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args.extend(args);
        self
    }
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target, self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            f.write_str(if i == 0 { ":" } else { "," })?;
            write!(f, "{arg}")?;
        }
        Ok(())
    }
}

impl FromStr for HostEvent {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SessionError::InvalidEvent(s.to_string());
        let mut parts = s.splitn(3, ':');
        let target = parts.next().map(str::trim).ok_or_else(invalid)?;
        let name = parts.next().map(str::trim).filter(|n| !n.is_empty()).ok_or_else(invalid)?;

        let target = if target.eq_ignore_ascii_case("system") {
            EventTarget::System
        } else if let Some(id) = target.strip_prefix('#') {
            EventTarget::Element(ElementId(id.parse().map_err(|_| invalid())?))
        } else {
            EventTarget::Variable(target.parse().map_err(|_| invalid())?)
        };

        let args = match parts.next() {
            Some(list) if !list.trim().is_empty() => list.split(',').map(parse_value).collect(),
            _ => Vec::new(),
        };
        Ok(Self {
            target,
            name: name.to_string(),
            args,
        })
    }
}

/// Reads an argument literal: `null`, booleans, integers, floats, or a
/// string (optionally in double quotes).
pub fn parse_value(text: &str) -> Value {
    let text = text.trim();
    if text.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(b) = text.parse::<bool>() {
        return Value::Boolean(b);
    }
    if let Ok(i) = text.parse::<i32>() {
        return Value::Int(i);
    }
    if let Ok(f) = text.parse::<f64>() {
        return Value::Float(f);
    }
    let unquoted = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    Value::from(unquoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        let system: HostEvent = "system:onScriptLoaded".parse().unwrap();
        assert_eq!(system.target, EventTarget::System);
        assert!(system.args.is_empty());

        let element: HostEvent = "#12:onLeftButtonDown:4,5".parse().unwrap();
        assert_eq!(element.target, EventTarget::Element(ElementId(12)));
        assert_eq!(element.args, vec![Value::Int(4), Value::Int(5)]);
    }

    #[test]
    fn test_parse_argument_kinds() {
        assert_eq!(parse_value("true"), Value::Boolean(true));
        assert_eq!(parse_value("-3"), Value::Int(-3));
        assert_eq!(parse_value("0.5"), Value::Float(0.5));
        assert_eq!(parse_value("null"), Value::Null);
        assert_eq!(parse_value("\"1\""), Value::from("1"));
        assert_eq!(parse_value("main"), Value::from("main"));
    }

    #[test]
    fn test_rejects_malformed() {
        for text in ["", "system", "x:onTimer", "#a:onTimer", "3:"] {
            assert!(text.parse::<HostEvent>().is_err(), "{text:?}");
        }
    }

    #[test]
    fn test_display_round_trips_simple_events() {
        let event = HostEvent::new(EventTarget::Variable(2), "onResize")
            .with_args([Value::Int(1), Value::Int(2)]);
        assert_eq!(event.to_string(), "2:onResize:1,2");
        assert_eq!(event.to_string().parse::<HostEvent>().unwrap(), event);
    }
}
