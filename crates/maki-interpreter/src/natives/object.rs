// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The root class.

use super::{MethodEntry, NativeCall, call, hook, methods};
use crate::error::ObjectError;
use crate::runtime::value::Value;

pub(crate) fn object() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getid" => call(get_id),
        "onnotify" => hook(),
    ]
}

/// Object.getId() - The element id the skin gave this object.
fn get_id(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if let Some(id) = call.query("id", &[]) {
        return Ok(id);
    }
    Ok(call.field_or("id", ""))
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use crate::runtime::value::Value;

    #[test]
    fn test_get_id_defaults_to_empty() {
        let mut fx = Fixture::new();
        let layer = fx.create("Layer");
        assert_eq!(fx.call(layer, "getId", &[]), Value::from(""));
        fx.model
            .instance_mut(layer)
            .unwrap()
            .set_field("id", Value::from("logo"));
        assert_eq!(fx.call(layer, "getid", &[]), Value::from("logo"));
    }

    #[test]
    fn test_on_notify_is_a_hook() {
        let mut fx = Fixture::new();
        let timer = fx.create("Timer");
        let args = [Value::from("cmd"), Value::from("p"), Value::Int(1), Value::Int(2)];
        assert_eq!(fx.call(timer, "onNotify", &args), Value::Int(0));
    }
}
