// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Containers, layouts, groups and the component hosts.
//!
//! The element tree belongs to the host; these natives walk it through the
//! bridge and bind whatever they find.

use super::gui::{parent, set_region, set_region_from_map};
use super::system::nth;
use super::{MethodEntry, NativeCall, call, forward, get, hook, methods, set};
use crate::error::ObjectError;
use crate::host::ElementId;
use crate::runtime::heap::ObjectRef;
use crate::runtime::value::Value;

// ============================================================================
// Shared helpers
// ============================================================================

/// Children of the receiver's element deriving from `class`.
fn own_children(call: &mut NativeCall<'_>, class: &str) -> Vec<ObjectRef> {
    match call.element() {
        Some(element) => call.children_of_class(element, class),
        None => Vec::new(),
    }
}

fn count(items: &[ObjectRef]) -> Result<Value, ObjectError> {
    Ok(Value::Int(items.len() as i32))
}

/// Named descendant of the receiver's element.
fn find_own(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let id = call.string(0).to_string();
    let Some(element) = call.element() else {
        return Ok(Value::Null);
    };
    Ok(call.find(element, &id).into())
}

/// The Wac registered under this object's `guid`.
fn wac_by_guid(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let guid = call
        .query("guid", &[])
        .or_else(|| call.field("guid").cloned())
        .unwrap_or_default()
        .to_string();
    if guid.is_empty() {
        return Ok(Value::Null);
    }
    Ok(call.find(ElementId::SYSTEM, &guid).into())
}

fn first_child(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(own_children(call, "GuiObject").first().copied().into())
}

// ============================================================================
// Container
// ============================================================================

pub(crate) fn container() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "onswitchtolayout" => hook(),
        "onbeforeswitchtolayout" => hook(),
        "setxmlparam" => forward("setXmlParam"),
        "onhidelayout" => hook(),
        "onshowlayout" => hook(),
        "getlayout" => call(find_own),
        "getnumlayouts" => call(get_num_layouts),
        "enumlayout" => call(enum_layout),
        "switchtolayout" => call(switch_to_layout),
        "show" => forward("show"),
        "hide" => forward("hide"),
        "close" => forward("close"),
        "toggle" => forward("toggle"),
        "isdynamic" => get("dynamic"),
        "setname" => set("name"),
        "getname" => get("name"),
        "getguid" => get("guid"),
        "getcurlayout" => call(get_cur_layout),
    ]
}

fn get_num_layouts(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    count(&own_children(call, "Layout"))
}

fn enum_layout(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let n = call.int(0);
    Ok(nth(&own_children(call, "Layout"), n).into())
}

/// Container.getCurLayout() - The last layout switched to, else the first.
fn get_cur_layout(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if let Some(current) = call.object_field("curLayout") {
        return Ok(Value::Object(current));
    }
    Ok(own_children(call, "Layout").first().copied().into())
}

/// Container.switchToLayout(id) - Fires `onBeforeSwitchToLayout(old, new)`
/// and `onSwitchToLayout(new)` when the layout actually changes.
fn switch_to_layout(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let id = call.string(0).to_string();
    let Some(element) = call.element() else {
        return Ok(Value::Void);
    };
    let Some(next) = call.find(element, &id) else {
        return Ok(Value::Void);
    };
    let old = get_cur_layout(call)?;
    if old == Value::Object(next) {
        return Ok(Value::Void);
    }
    call.emit("onBeforeSwitchToLayout", vec![old, Value::Object(next)]);
    call.set_field("curLayout", next);
    call.mutate("switchToLayout", &[Value::String(id)]);
    call.emit("onSwitchToLayout", vec![Value::Object(next)]);
    Ok(Value::Void)
}

// ============================================================================
// Wac
// ============================================================================

pub(crate) fn wac() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getguid" => get("guid"),
        "getname" => get("name"),
        "sendcommand" => forward("sendCommand"),
        "show" => forward("show"),
        "hide" => forward("hide"),
        "isvisible" => forward("isVisible"),
        "onnotify" => hook(),
        "onshow" => hook(),
        "onhide" => hook(),
        "setstatusbar" => set("statusBar"),
        "getstatusbar" => get("statusBar"),
    ]
}

// ============================================================================
// Group and Layout
// ============================================================================

pub(crate) fn group() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getobject" => call(find_own),
        "getnumobjects" => call(get_num_objects),
        "enumobject" => call(enum_object),
        "oncreateobject" => hook(),
        "getmouseposx" => forward("getMousePosX"),
        "getmouseposy" => forward("getMousePosY"),
        "islayout" => call(is_layout),
    ]
}

fn get_num_objects(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    count(&own_children(call, "GuiObject"))
}

fn enum_object(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let n = call.int(0);
    Ok(nth(&own_children(call, "GuiObject"), n).into())
}

fn is_layout(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    Ok(Value::Boolean(call.model_ref().is_instance_of(this, "Layout")))
}

pub(crate) fn layout() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "ondock" => hook(),
        "onundock" => hook(),
        "onscale" => hook(),
        "getscale" => call(get_scale),
        "setscale" => call(set_scale),
        "setdesktopalpha" => set("desktopAlpha"),
        "getdesktopalpha" => get("desktopAlpha"),
        "getcontainer" => call(get_container),
        "center" => forward("center"),
        "onmove" => hook(),
        "onendmove" => hook(),
        "onuserresize" => hook(),
        "snapadjust" => call(snap_adjust),
        "getsnapadjusttop" => get("snapAdjustTop"),
        "getsnapadjustright" => get("snapAdjustRight"),
        "getsnapadjustleft" => get("snapAdjustLeft"),
        "getsnapadjustbottom" => get("snapAdjustBottom"),
        "setredrawonresize" => set("redrawOnResize"),
        "beforeredock" => forward("beforeRedock"),
        "redock" => forward("redock"),
        "istransparencysafe" => forward("isTransparencySafe"),
        "islayoutanimationsafe" => forward("isLayoutAnimationSafe"),
        "onmouseenterlayout" => hook(),
        "onmouseleavelayout" => hook(),
        "onsnapadjustchanged" => hook(),
    ]
}

fn get_scale(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let scale = call
        .query("scale", &[])
        .and_then(|v| v.as_f64())
        .or_else(|| call.field("scale").and_then(Value::as_f64))
        .unwrap_or(1.0);
    Ok(Value::Float(scale))
}

/// Layout.setScale(v) - Fires `onScale(v)`.
fn set_scale(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let scale = call.float(0);
    call.set_field("scale", scale);
    call.mutate("scale", &[Value::Float(scale)]);
    call.emit("onScale", vec![Value::Float(scale)]);
    Ok(Value::Void)
}

fn get_container(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    let container = parent(call, this).filter(|p| call.model_ref().is_instance_of(*p, "Container"));
    Ok(container.into())
}

fn snap_adjust(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let sides = ["snapAdjustLeft", "snapAdjustTop", "snapAdjustRight", "snapAdjustBottom"];
    let values: Vec<Value> = (0..4).map(|i| Value::Int(call.int(i))).collect();
    for (side, value) in sides.into_iter().zip(&values) {
        call.set_field(side, value.clone());
    }
    call.mutate("snapAdjust", &values);
    call.emit("onSnapAdjustChanged", Vec::new());
    Ok(Value::Void)
}

// ============================================================================
// Component hosts
// ============================================================================

pub(crate) fn window_holder() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "setregionfrommap" => call(set_region_from_map),
        "setregion" => call(set_region),
        "getcontent" => call(first_child),
        "getguid" => get("guid"),
        "getcomponentname" => get("componentName"),
        "ongetwac" => hook(),
        "ongiveupwac" => hook(),
        "getwac" => call(wac_by_guid),
        "setacceptwac" => set("acceptWac"),
    ]
}

pub(crate) fn component() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getguid" => get("guid"),
        "getwac" => call(wac_by_guid),
        "setregionfrommap" => call(set_region_from_map),
        "setregion" => call(set_region),
        "ongetwac" => hook(),
        "ongiveupwac" => hook(),
        "setacceptwac" => set("acceptWac"),
        "getcontent" => call(first_child),
    ]
}

pub(crate) fn component_bucket() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getmaxheight" => forward("getMaxHeight"),
        "getmaxwidth" => forward("getMaxWidth"),
        "setscroll" => call(set_scroll),
        "getscroll" => get("scroll"),
        "getnumchildren" => call(get_num_objects),
        "enumchildren" => call(enum_object),
    ]
}

/// ComponentBucket.setScroll(x) - Returns the position actually set.
fn set_scroll(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let x = call.int(0).max(0);
    call.set_field("scroll", x);
    call.mutate("scroll", &[Value::Int(x)]);
    Ok(Value::Int(x))
}

// ============================================================================
// GroupList
// ============================================================================

pub(crate) fn group_list() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "instantiate" => call(instantiate),
        "getnumitems" => call(group_list_len),
        "enumitem" => call(group_list_item),
        "removeall" => call(group_list_clear),
        "scrolltopercent" => forward("scrollToPercent"),
    ]
}

/// Live groups this list instantiated, in creation order.
fn group_items(call: &NativeCall<'_>) -> Vec<ObjectRef> {
    let total = call.field("items").and_then(Value::as_i32).unwrap_or(0);
    (0..total)
        .filter_map(|i| call.object_field(&format!("item.{i}")))
        .collect()
}

/// GroupList.instantiate(id, n) - Creates `n` copies of a group template
/// and returns the first.
fn instantiate(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let id = call.string(0).to_string();
    let n = call.int(1).max(0);
    let element = call.element();
    let mut first = None;
    for _ in 0..n {
        let Some(group) = call.create_element("Group", &id, element) else {
            break;
        };
        let slot = call.field("items").and_then(Value::as_i32).unwrap_or(0);
        call.set_field(format!("item.{slot}"), group);
        call.set_field("items", slot + 1);
        if first.is_none() {
            first = Some(group);
        }
    }
    Ok(first.into())
}

fn group_list_len(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    count(&group_items(call))
}

fn group_list_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(nth(&group_items(call), call.int(0)).into())
}

fn group_list_clear(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    for group in group_items(call) {
        call.destroy(group);
    }
    let total = call.field("items").and_then(Value::as_i32).unwrap_or(0);
    for i in 0..total {
        call.remove_field(&format!("item.{i}"));
    }
    call.remove_field("items");
    Ok(Value::Void)
}

// ============================================================================
// CfgGroup
// ============================================================================

pub(crate) fn cfg_group() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "cfggetint" => call(cfg_get_int),
        "cfgsetint" => call(cfg_set),
        "cfggetstring" => call(cfg_get_string),
        "cfgsetstring" => call(cfg_set),
        "cfggetfloat" => call(cfg_get_float),
        "cfgsetfloat" => call(cfg_set),
        "cfggetname" => get("cfgName"),
        "cfggetguid" => get("cfgGuid"),
        "oncfgchanged" => hook(),
    ]
}

/// The attribute value: the host's copy, else the last value set.
fn cfg_value(call: &mut NativeCall<'_>) -> Value {
    call.query("cfgValue", &[])
        .or_else(|| call.field("cfgValue").cloned())
        .unwrap_or_default()
}

fn cfg_get_int(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let v = cfg_value(call);
    Ok(Value::Int(match &v {
        Value::String(s) => super::system::leading_number(s) as i32,
        other => other.as_i32().unwrap_or(0),
    }))
}

fn cfg_get_float(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let v = cfg_value(call);
    Ok(Value::Float(match &v {
        Value::String(s) => super::system::leading_number(s),
        other => other.as_f64().unwrap_or(0.0),
    }))
}

fn cfg_get_string(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::String(cfg_value(call).to_string()))
}

/// CfgGroup.cfgSet*(v) - Fires `onCfgChanged`.
fn cfg_set(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let value = call.arg(0).clone();
    call.set_field("cfgValue", value.clone());
    call.mutate("cfgValue", &[value]);
    call.emit("onCfgChanged", Vec::new());
    Ok(Value::Void)
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;

    #[test]
    fn test_unbound_container_lookups_are_empty() {
        let mut fx = Fixture::new();
        let container = fx.create("Container");
        assert_eq!(fx.call(container, "getNumLayouts", &[]), Value::Int(0));
        assert_eq!(fx.call(container, "getLayout", &[Value::from("normal")]), Value::Null);
        assert_eq!(fx.call(container, "getCurLayout", &[]), Value::Null);
        assert_eq!(fx.call(container, "isDynamic", &[]), Value::Int(0));
        fx.call(container, "switchToLayout", &[Value::from("normal")]);
        assert!(fx.events().is_empty());
    }

    #[test]
    fn test_is_layout() {
        let mut fx = Fixture::new();
        let group = fx.create("Group");
        let layout = fx.create("Layout");
        assert_eq!(fx.call(group, "isLayout", &[]), Value::Boolean(false));
        assert_eq!(fx.call(layout, "isLayout", &[]), Value::Boolean(true));
    }

    #[test]
    fn test_layout_scale_and_snap() {
        let mut fx = Fixture::new();
        let layout = fx.create("Layout");
        assert_eq!(fx.call(layout, "getScale", &[]), Value::Float(1.0));
        fx.call(layout, "setScale", &[Value::Float(2.0)]);
        assert_eq!(fx.call(layout, "getScale", &[]), Value::Float(2.0));
        let sides = [Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)];
        fx.call(layout, "snapAdjust", &sides);
        assert_eq!(fx.call(layout, "getSnapAdjustRight", &[]), Value::Int(3));
        let names: Vec<String> = fx.events().into_iter().map(|(_, n)| n).collect();
        assert_eq!(names, ["onScale", "onSnapAdjustChanged"]);
    }

    #[test]
    fn test_layout_container_from_parent() {
        let mut fx = Fixture::new();
        let container = fx.create("Container");
        let layout = fx.create("Layout");
        fx.model
            .instance_mut(layout)
            .unwrap()
            .set_field("parent", Value::Object(container));
        assert_eq!(fx.call(layout, "getContainer", &[]), Value::Object(container));
    }

    #[test]
    fn test_cfg_group_values() {
        let mut fx = Fixture::new();
        let cfg = fx.create("CfgGroup");
        fx.call(cfg, "cfgSetString", &[Value::from("42")]);
        assert_eq!(fx.call(cfg, "cfgGetInt", &[]), Value::Int(42));
        assert_eq!(fx.call(cfg, "cfgGetFloat", &[]), Value::Float(42.0));
        fx.call(cfg, "cfgSetInt", &[Value::Int(7)]);
        assert_eq!(fx.call(cfg, "cfgGetString", &[]), Value::from("7"));
        assert_eq!(fx.events().len(), 2);
    }

    #[test]
    fn test_group_list_without_host_creates_nothing() {
        let mut fx = Fixture::new();
        let list = fx.create("GroupList");
        let args = [Value::from("row"), Value::Int(3)];
        assert_eq!(fx.call(list, "instantiate", &args), Value::Null);
        assert_eq!(fx.call(list, "getNumItems", &[]), Value::Int(0));
    }

    #[test]
    fn test_component_bucket_scroll() {
        let mut fx = Fixture::new();
        let bucket = fx.create("ComponentBucket");
        assert_eq!(fx.call(bucket, "setScroll", &[Value::Int(-5)]), Value::Int(0));
        fx.call(bucket, "setScroll", &[Value::Int(30)]);
        assert_eq!(fx.call(bucket, "getScroll", &[]), Value::Int(30));
    }
}
