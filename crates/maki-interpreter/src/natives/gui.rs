// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! GuiObject: the base of everything on screen.
//!
//! Geometry lives in the `x`, `y`, `w`, `h` and `alpha` properties. Reads
//! ask the host first and fall back to what the script last stored, so an
//! unbound object still behaves consistently.
//!
//! Target animation is bookkeeping only: `gotoTarget` tells the host where
//! the object is heading and records a deadline; [`complete_targets`] snaps
//! the geometry and fires `onTargetReached` once the deadline passes.

use tracing::debug;

use super::collections::{Rect, rects_arg, scan_map};
use super::system::leading_number;
use super::{MethodEntry, NativeCall, call, forward, get, hook, methods};
use crate::error::ObjectError;
use crate::host::HostBridge;
use crate::runtime::heap::ObjectRef;
use crate::runtime::model::ObjectModel;
use crate::runtime::value::Value;

/// Properties a target animation moves.
const TARGET_PROPERTIES: [&str; 5] = ["x", "y", "w", "h", "alpha"];

const DEADLINE: &str = "target.deadline";
const STARTED: &str = "target.started";

/// Parent chains longer than this are treated as cycles.
const MAX_DEPTH: usize = 64;

pub(crate) fn gui_object() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "show" => call(show),
        "hide" => call(hide),
        "isvisible" => call(is_visible),
        "onsetvisible" => hook(),
        "setalpha" => call(set_alpha),
        "getalpha" => call(get_alpha),
        "onleftbuttonup" => hook(),
        "onleftbuttondown" => hook(),
        "onrightbuttonup" => hook(),
        "onrightbuttondown" => hook(),
        "onrightbuttondblclk" => hook(),
        "onleftbuttondblclk" => hook(),
        "onmousemove" => hook(),
        "onenterarea" => hook(),
        "onleavearea" => hook(),
        "setenabled" => call(set_enabled),
        "getenabled" => call(get_enabled),
        "onenable" => hook(),
        "resize" => call(resize),
        "onresize" => hook(),
        "ismouseover" => call(is_mouse_over),
        "getleft" => call(get_left),
        "gettop" => call(get_top),
        "getwidth" => call(get_width),
        "getheight" => call(get_height),
        "settargetx" => call(set_target_x),
        "settargety" => call(set_target_y),
        "settargetw" => call(set_target_w),
        "settargeth" => call(set_target_h),
        "settargeta" => call(set_target_a),
        "settargetspeed" => call(set_target_speed),
        "gototarget" => call(goto_target),
        "ontargetreached" => hook(),
        "canceltarget" => call(cancel_target),
        "reversetarget" => call(reverse_target),
        "onstartup" => hook(),
        "isgoingtotarget" => call(is_going_to_target),
        "setxmlparam" => call(set_xml_param),
        "getxmlparam" => call(get_xml_param),
        "init" => call(init),
        "bringtofront" => forward("bringToFront"),
        "bringtoback" => forward("bringToBack"),
        "bringabove" => forward("bringAbove"),
        "bringbelow" => forward("bringBelow"),
        "getguix" => call(get_left),
        "getguiy" => call(get_top),
        "getguiw" => call(get_width),
        "getguih" => call(get_height),
        "getguirelatx" => forward("getGuiRelatX"),
        "getguirelaty" => forward("getGuiRelatY"),
        "getguirelatw" => forward("getGuiRelatW"),
        "getguirelath" => forward("getGuiRelatH"),
        "isactive" => forward("isActive"),
        "getparent" => call(get_parent),
        "getparentlayout" => call(get_parent_layout),
        "gettopparent" => call(get_top_parent),
        "runmodal" => forward("runModal"),
        "endmodal" => forward("endModal"),
        "findobject" => call(find_object),
        "findobjectxy" => call(find_object_xy),
        "getname" => get("name"),
        "clienttoscreenx" => call(client_to_screen_x),
        "clienttoscreeny" => call(client_to_screen_y),
        "clienttoscreenw" => call(client_to_screen_w),
        "clienttoscreenh" => call(client_to_screen_h),
        "screentoclientx" => call(screen_to_client_x),
        "screentoclienty" => call(screen_to_client_y),
        "screentoclientw" => call(screen_to_client_w),
        "screentoclienth" => call(screen_to_client_h),
        "getautowidth" => call(get_auto_width),
        "getautoheight" => call(get_auto_height),
        "setfocus" => forward("setFocus"),
        "onchar" => hook(),
        "onaccelerator" => hook(),
        "ismouseoverrect" => forward("isMouseOverRect"),
        "getinterface" => call(get_interface),
        "ondragenter" => hook(),
        "ondragover" => hook(),
        "ondragleave" => hook(),
        "onkeydown" => hook(),
        "onkeyup" => hook(),
        "ongetfocus" => hook(),
        "onkillfocus" => hook(),
        "sendaction" => call(send_action),
        "onaction" => hook(),
    ]
}

// ============================================================================
// Properties
// ============================================================================

/// Default for a property neither the host nor the script has set.
fn property_default(property: &str) -> i32 {
    match property {
        "alpha" => 255,
        "visible" | "enabled" => 1,
        _ => 0,
    }
}

/// Integer property of the receiver: host, then stored field, then default.
pub(crate) fn int_property(call: &mut NativeCall<'_>, property: &str) -> i32 {
    call.query(property, &[])
        .and_then(|v| v.as_i32())
        .or_else(|| call.field(property).and_then(Value::as_i32))
        .unwrap_or_else(|| property_default(property))
}

/// Integer property of another instance.
pub(crate) fn int_property_of(call: &mut NativeCall<'_>, r: ObjectRef, property: &str) -> i32 {
    let from_host = call
        .element_of(r)
        .and_then(|e| call.query_int(e, property, &[]));
    from_host
        .or_else(|| {
            call.model_ref()
                .instance(r)
                .and_then(|i| i.field(property))
                .and_then(Value::as_i32)
        })
        .unwrap_or_else(|| property_default(property))
}

/// Stores an integer property and mirrors it to the host.
pub(crate) fn store_int(call: &mut NativeCall<'_>, property: &str, value: i32) {
    call.set_field(property, value);
    call.mutate(property, &[Value::Int(value)]);
}

fn int_result(v: i32) -> Result<Value, ObjectError> {
    Ok(Value::Int(v))
}

// ============================================================================
// Visibility and state
// ============================================================================

fn set_visible(call: &mut NativeCall<'_>, on: bool) -> Result<Value, ObjectError> {
    let was = int_property(call, "visible") != 0;
    call.set_field("visible", i32::from(on));
    call.mutate(if on { "show" } else { "hide" }, &[]);
    if was != on {
        call.emit("onSetVisible", vec![Value::Boolean(on)]);
    }
    Ok(Value::Void)
}

/// GuiObject.show() - Fires `onSetVisible(true)` when the object was hidden.
fn show(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    set_visible(call, true)
}

fn hide(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    set_visible(call, false)
}

fn is_visible(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    int_result(int_property(call, "visible"))
}

fn set_alpha(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let alpha = call.int(0).clamp(0, 255);
    store_int(call, "alpha", alpha);
    Ok(Value::Void)
}

fn get_alpha(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    int_result(int_property(call, "alpha"))
}

fn set_enabled(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(0);
    store_int(call, "enabled", i32::from(on));
    call.emit("onEnable", vec![Value::Boolean(on)]);
    Ok(Value::Void)
}

fn get_enabled(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(int_property(call, "enabled") != 0))
}

// ============================================================================
// Geometry
// ============================================================================

/// GuiObject.resize(x, y, w, h) - Moves and sizes the object, then fires `onResize`.
fn resize(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let rect: Vec<Value> = (0..4).map(|i| Value::Int(call.int(i))).collect();
    for (property, value) in ["x", "y", "w", "h"].iter().zip(&rect) {
        call.set_field(*property, value.clone());
    }
    call.mutate("resize", &rect);
    call.emit("onResize", rect);
    Ok(Value::Void)
}

fn get_left(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    int_result(int_property(call, "x"))
}

fn get_top(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    int_result(int_property(call, "y"))
}

fn get_width(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    int_result(int_property(call, "w"))
}

fn get_height(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    int_result(int_property(call, "h"))
}

fn contains(call: &mut NativeCall<'_>, r: ObjectRef, x: i32, y: i32) -> bool {
    let left = int_property_of(call, r, "x");
    let top = int_property_of(call, r, "y");
    let w = int_property_of(call, r, "w");
    let h = int_property_of(call, r, "h");
    x >= left && x < left + w && y >= top && y < top + h
}

fn is_mouse_over(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (x, y) = (call.int(0), call.int(1));
    let this = call.this();
    Ok(Value::Boolean(contains(call, this, x, y)))
}

fn get_auto_width(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    match call.query("getAutoWidth", &[]) {
        Some(v) => Ok(v),
        None => get_width(call),
    }
}

fn get_auto_height(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    match call.query("getAutoHeight", &[]) {
        Some(v) => Ok(v),
        None => get_height(call),
    }
}

/// Coordinate conversion: the host's answer, else the object's own offset
/// (positions) or the identity (sizes).
fn convert(
    call: &mut NativeCall<'_>,
    action: &str,
    offset_by: Option<&str>,
    sign: i32,
) -> Result<Value, ObjectError> {
    let v = call.int(0);
    if let Some(answer) = call.query(action, &[Value::Int(v)]) {
        return Ok(answer);
    }
    let offset = offset_by.map_or(0, |p| int_property(call, p));
    int_result(v + sign * offset)
}

fn client_to_screen_x(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    convert(call, "clientToScreenX", Some("x"), 1)
}

fn client_to_screen_y(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    convert(call, "clientToScreenY", Some("y"), 1)
}

fn client_to_screen_w(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    convert(call, "clientToScreenW", None, 1)
}

fn client_to_screen_h(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    convert(call, "clientToScreenH", None, 1)
}

fn screen_to_client_x(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    convert(call, "screenToClientX", Some("x"), -1)
}

fn screen_to_client_y(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    convert(call, "screenToClientY", Some("y"), -1)
}

fn screen_to_client_w(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    convert(call, "screenToClientW", None, -1)
}

fn screen_to_client_h(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    convert(call, "screenToClientH", None, -1)
}

// ============================================================================
// Target animation
// ============================================================================

fn set_target(call: &mut NativeCall<'_>, property: &str) -> Result<Value, ObjectError> {
    let v = call.int(0);
    call.set_field(format!("target.{property}"), v);
    Ok(Value::Void)
}

fn set_target_x(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    set_target(call, "x")
}

fn set_target_y(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    set_target(call, "y")
}

fn set_target_w(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    set_target(call, "w")
}

fn set_target_h(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    set_target(call, "h")
}

fn set_target_a(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    set_target(call, "alpha")
}

fn set_target_speed(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let seconds = call.float(0).max(0.0);
    call.set_field("target.speed", seconds);
    Ok(Value::Void)
}

/// GuiObject.gotoTarget() - Starts moving toward the targets set so far.
/// Components without a target keep their current value.
fn goto_target(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let now = call.model_ref().clock_ms();
    let seconds = call.field("target.speed").and_then(Value::as_f64).unwrap_or(0.0);
    let mut args = Vec::with_capacity(TARGET_PROPERTIES.len() + 1);
    for property in TARGET_PROPERTIES {
        let current = int_property(call, property);
        let target = call
            .field(&format!("target.{property}"))
            .and_then(Value::as_i32)
            .unwrap_or(current);
        call.set_field(format!("target.from.{property}"), current);
        call.set_field(format!("target.{property}"), target);
        args.push(Value::Int(target));
    }
    args.push(Value::Float(seconds));
    let deadline = now + (seconds * 1000.0).round() as u64;
    call.set_field(STARTED, now as f64);
    call.set_field(DEADLINE, deadline as f64);
    call.mutate("gotoTarget", &args);
    Ok(Value::Void)
}

fn cancel_target(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if call.remove_field(DEADLINE).is_some() {
        call.mutate("cancelTarget", &[]);
    }
    Ok(Value::Void)
}

/// GuiObject.reverseTarget(reverse) - Heads back to where the running
/// animation started, taking as long as it has run so far.
fn reverse_target(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if call.int(0) == 0 || call.field(DEADLINE).is_none() {
        return Ok(Value::Void);
    }
    let now = call.model_ref().clock_ms();
    let started = call.field(STARTED).and_then(Value::as_f64).unwrap_or(0.0) as u64;
    let mut args = Vec::with_capacity(TARGET_PROPERTIES.len());
    for property in TARGET_PROPERTIES {
        let to = format!("target.{property}");
        let from = format!("target.from.{property}");
        let (a, b) = (call.field_or(&to, 0), call.field_or(&from, 0));
        call.set_field(to, b.clone());
        call.set_field(from, a);
        args.push(b);
    }
    call.set_field(STARTED, now as f64);
    call.set_field(DEADLINE, (now + now.saturating_sub(started)) as f64);
    call.mutate("reverseTarget", &args);
    Ok(Value::Void)
}

fn is_going_to_target(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(call.field(DEADLINE).is_some()))
}

/// Finishes every target animation whose deadline is at or before `now`:
/// the final geometry is stored and sent to the host, and
/// `onTargetReached` is queued. Returns the finished objects in deadline
/// order.
pub fn complete_targets(
    model: &mut ObjectModel,
    host: &mut dyn HostBridge,
    now: u64,
) -> Vec<ObjectRef> {
    let mut due: Vec<(u64, u64, ObjectRef)> = model
        .instances()
        .filter_map(|(r, instance)| {
            let deadline = instance.field(DEADLINE)?.as_f64()? as u64;
            (deadline <= now).then_some((deadline, instance.serial(), r))
        })
        .collect();
    due.sort_unstable();

    let mut finished = Vec::with_capacity(due.len());
    for (_, _, r) in due {
        let Some(instance) = model.instance_mut(r) else {
            continue;
        };
        instance.remove_field(DEADLINE);
        instance.remove_field(STARTED);
        let mut geometry = Vec::with_capacity(TARGET_PROPERTIES.len());
        for property in TARGET_PROPERTIES {
            let value = instance
                .field(&format!("target.{property}"))
                .cloned()
                .unwrap_or(Value::Int(0));
            instance.set_field(property, value.clone());
            geometry.push(value);
        }
        if let Some(element) = instance.element() {
            if let Err(err) = host.mutate(element, "resize", &geometry[..4]) {
                debug!(%err, "target resize failed");
            }
            if let Err(err) = host.mutate(element, "alpha", &geometry[4..]) {
                debug!(%err, "target alpha failed");
            }
        }
        model.emit(r, "onTargetReached", Vec::new());
        finished.push(r);
    }
    finished
}

// ============================================================================
// XML parameters
// ============================================================================

/// GuiObject.setXmlParam(param, value) - Geometry and visibility parameters
/// also update the matching properties.
fn set_xml_param(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let param = call.string(0).to_ascii_lowercase();
    let value = call.string(1).to_string();
    let args = [call.arg(0).clone(), call.arg(1).clone()];
    call.mutate("setXmlParam", &args);
    let property = match param.as_str() {
        "x" | "y" | "w" | "h" | "alpha" => Some(param.as_str()),
        "visible" => Some("visible"),
        _ => None,
    };
    if let Some(property) = property {
        call.set_field(property, leading_number(&value) as i32);
    }
    call.set_field(format!("xml.{param}"), value);
    Ok(Value::Void)
}

fn get_xml_param(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let param = call.string(0).to_ascii_lowercase();
    let args = [call.arg(0).clone()];
    if let Some(v) = call.query("getXmlParam", &args) {
        return Ok(v);
    }
    Ok(call.field_or(&format!("xml.{param}"), ""))
}

// ============================================================================
// Hierarchy
// ============================================================================

/// GuiObject.init(parent) - Attaches a dynamically created object to a group.
fn init(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let Some(parent) = call.object(0) else {
        return Ok(Value::Void);
    };
    call.set_field("parent", parent);
    let id = call
        .model_ref()
        .instance(parent)
        .and_then(|i| i.field("id"))
        .cloned()
        .unwrap_or_default();
    call.mutate("init", &[id]);
    Ok(Value::Void)
}

/// Parent instance: the host's tree first, then the group given to `init`.
pub(crate) fn parent(call: &mut NativeCall<'_>, r: ObjectRef) -> Option<ObjectRef> {
    if let Some(element) = call.element_of(r) {
        if let Some(p) = call.parent_of(element) {
            return Some(p);
        }
    }
    call.model_ref()
        .instance(r)
        .and_then(|i| i.field("parent"))
        .and_then(Value::as_object)
        .filter(|p| call.model_ref().is_alive(*p))
}

fn get_parent(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    Ok(parent(call, this).into())
}

fn get_parent_layout(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let mut current = call.this();
    for _ in 0..MAX_DEPTH {
        match parent(call, current) {
            Some(p) if call.model_ref().is_instance_of(p, "Layout") => {
                return Ok(Value::Object(p));
            }
            Some(p) => current = p,
            None => break,
        }
    }
    Ok(Value::Null)
}

fn get_top_parent(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let mut current = call.this();
    for _ in 0..MAX_DEPTH {
        match parent(call, current) {
            Some(p) => current = p,
            None => break,
        }
    }
    Ok(Value::Object(current))
}

fn find_object(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let id = call.string(0).to_string();
    let Some(element) = call.element() else {
        return Ok(Value::Null);
    };
    Ok(call.find(element, &id).into())
}

/// GuiObject.findObjectXY(x, y) - Topmost child containing the point.
fn find_object_xy(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (x, y) = (call.int(0), call.int(1));
    let Some(element) = call.element() else {
        return Ok(Value::Null);
    };
    let children = call.children(element);
    let hit = children
        .into_iter()
        .rev()
        .find(|child| contains(call, *child, x, y));
    Ok(hit.into())
}

// ============================================================================
// Window regions (Layer, WindowHolder, Component, MouseRedir)
// ============================================================================

fn send_region(call: &mut NativeCall<'_>, rects: &[Rect]) {
    let flat: Vec<Value> = rects
        .iter()
        .flat_map(|r| [r.x, r.y, r.w, r.h])
        .map(Value::Int)
        .collect();
    call.mutate("setRegion", &flat);
}

/// setRegion(reg) - Clips the element to a region, sent as `x, y, w, h` quads.
pub(crate) fn set_region(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let rects = rects_arg(call, 0);
    send_region(call, &rects);
    Ok(Value::Void)
}

/// setRegionFromMap(map, threshold, reverse)
pub(crate) fn set_region_from_map(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (threshold, reversed) = (call.int(1), call.boolean(2));
    let rects = match call.object(0) {
        Some(map) => scan_map(call, map, threshold, reversed)?,
        None => Vec::new(),
    };
    send_region(call, &rects);
    Ok(Value::Void)
}

fn get_interface(_call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Null)
}

/// GuiObject.sendAction(...) - Queues `onAction` on this object with itself
/// as the source.
fn send_action(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let mut args: Vec<Value> = (0..6).map(|i| call.arg(i).clone()).collect();
    args.push(Value::Object(call.this()));
    call.emit("onAction", args);
    Ok(Value::Int(0))
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;

    #[test]
    fn test_show_hide_fire_on_change_only() {
        let mut fx = Fixture::new();
        let obj = fx.create("Layer");
        fx.call(obj, "show", &[]);
        assert!(fx.events().is_empty());
        fx.call(obj, "hide", &[]);
        fx.call(obj, "hide", &[]);
        assert_eq!(fx.events(), vec![(obj, "onSetVisible".to_string())]);
        assert_eq!(fx.call(obj, "isVisible", &[]), Value::Int(0));
    }

    #[test]
    fn test_resize_updates_geometry() {
        let mut fx = Fixture::new();
        let obj = fx.create("Button");
        let rect = [Value::Int(10), Value::Int(20), Value::Int(30), Value::Int(40)];
        fx.call(obj, "resize", &rect);
        assert_eq!(fx.call(obj, "getLeft", &[]), Value::Int(10));
        assert_eq!(fx.call(obj, "getGuiH", &[]), Value::Int(40));
        assert_eq!(fx.call(obj, "isMouseOver", &[Value::Int(15), Value::Int(25)]), Value::Boolean(true));
        assert_eq!(fx.call(obj, "isMouseOver", &[Value::Int(40), Value::Int(25)]), Value::Boolean(false));
        assert_eq!(fx.call(obj, "clientToScreenX", &[Value::Int(5)]), Value::Int(15));
        assert_eq!(fx.call(obj, "screenToClientY", &[Value::Int(25)]), Value::Int(5));
        assert_eq!(fx.events(), vec![(obj, "onResize".to_string())]);
    }

    #[test]
    fn test_alpha_defaults_and_clamps() {
        let mut fx = Fixture::new();
        let obj = fx.create("Text");
        assert_eq!(fx.call(obj, "getAlpha", &[]), Value::Int(255));
        fx.call(obj, "setAlpha", &[Value::Int(-4)]);
        assert_eq!(fx.call(obj, "getAlpha", &[]), Value::Int(0));
    }

    #[test]
    fn test_xml_params_feed_geometry() {
        let mut fx = Fixture::new();
        let obj = fx.create("Layer");
        fx.call(obj, "setXmlParam", &[Value::from("X"), Value::from("12")]);
        fx.call(obj, "setXmlParam", &[Value::from("image"), Value::from("logo.png")]);
        assert_eq!(fx.call(obj, "getLeft", &[]), Value::Int(12));
        assert_eq!(fx.call(obj, "getXmlParam", &[Value::from("image")]), Value::from("logo.png"));
        assert_eq!(fx.call(obj, "getXmlParam", &[Value::from("unset")]), Value::from(""));
    }

    #[test]
    fn test_target_completes_at_deadline() {
        let mut fx = Fixture::new();
        let obj = fx.create("Layer");
        fx.call(obj, "setTargetX", &[Value::Int(100)]);
        fx.call(obj, "setTargetSpeed", &[Value::Float(0.5)]);
        fx.call(obj, "gotoTarget", &[]);
        assert_eq!(fx.call(obj, "isGoingToTarget", &[]), Value::Boolean(true));

        assert!(complete_targets(&mut fx.model, &mut fx.host, 400).is_empty());
        assert_eq!(complete_targets(&mut fx.model, &mut fx.host, 500), vec![obj]);
        assert_eq!(fx.call(obj, "isGoingToTarget", &[]), Value::Boolean(false));
        assert_eq!(fx.call(obj, "getLeft", &[]), Value::Int(100));
        assert_eq!(fx.call(obj, "getAlpha", &[]), Value::Int(255));
        assert_eq!(fx.events(), vec![(obj, "onTargetReached".to_string())]);
    }

    #[test]
    fn test_cancel_target() {
        let mut fx = Fixture::new();
        let obj = fx.create("Layer");
        fx.call(obj, "setTargetY", &[Value::Int(9)]);
        fx.call(obj, "gotoTarget", &[]);
        fx.call(obj, "cancelTarget", &[]);
        assert!(complete_targets(&mut fx.model, &mut fx.host, 1_000).is_empty());
        assert_eq!(fx.call(obj, "getTop", &[]), Value::Int(0));
    }

    #[test]
    fn test_send_action_queues_on_action() {
        let mut fx = Fixture::new();
        let obj = fx.create("Group");
        let args = [
            Value::from("go"),
            Value::from(""),
            Value::Int(0),
            Value::Int(0),
            Value::Int(0),
            Value::Int(0),
        ];
        assert_eq!(fx.call(obj, "sendAction", &args), Value::Int(0));
        let event = fx.model.take_pending().unwrap();
        assert_eq!(event.name, "onAction");
        assert_eq!(event.args[6], Value::Object(obj));
    }

    #[test]
    fn test_parent_from_init() {
        let mut fx = Fixture::new();
        let layout = fx.create("Layout");
        let group = fx.create("Group");
        let obj = fx.create("Button");
        fx.call(group, "init", &[Value::Object(layout)]);
        fx.call(obj, "init", &[Value::Object(group)]);
        assert_eq!(fx.call(obj, "getParent", &[]), Value::Object(group));
        assert_eq!(fx.call(obj, "getParentLayout", &[]), Value::Object(layout));
        assert_eq!(fx.call(obj, "getTopParent", &[]), Value::Object(layout));
        assert_eq!(fx.call(obj, "findObject", &[Value::from("x")]), Value::Null);
    }
}
