// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration stores and host services without an element of their own.
//!
//! `Config` items and `WinampConfig` groups are registered on the `System`
//! instance, so every handle a script obtains sees the same store. The
//! registry only holds weak handles: deleting an item forgets it.
//!
//! `File`, `PlEdit` and `PlDir` are thin fronts for the host; everything they
//! do is addressed to the application element.

use super::system::RUNTIME_VERSION;
use super::{MethodEntry, NativeCall, call, get, hook, methods, service};
use crate::error::ObjectError;
use crate::host::ElementId;
use crate::runtime::heap::ObjectRef;
use crate::runtime::value::Value;

/// Name reported when the host does not give one.
pub const APPLICATION_NAME: &str = "Winamp";

fn item_key(name: &str) -> String {
    format!("config.item.{}", name.to_lowercase())
}

fn guid_key(guid: &str) -> String {
    format!("config.guid.{}", guid.to_lowercase())
}

fn group_key(guid: &str) -> String {
    format!("winampConfig.{}", guid.to_lowercase())
}

/// Live instance registered under `key` on the `System` instance.
fn registered(call: &mut NativeCall<'_>, key: &str) -> Option<ObjectRef> {
    let system = call.model().system();
    let model = call.model_ref();
    model
        .instance(system)
        .and_then(|i| i.field(key))
        .and_then(Value::as_object)
        .filter(|r| model.is_alive(*r))
}

fn register(call: &mut NativeCall<'_>, key: String, r: ObjectRef) {
    let system = call.model().system();
    set_field_of(call, system, key, Value::Object(r));
}

fn set_field_of(call: &mut NativeCall<'_>, r: ObjectRef, name: impl Into<String>, value: Value) {
    if let Some(instance) = call.model().instance_mut(r) {
        instance.set_field(name, value);
    }
}

fn object_or_null(r: Option<ObjectRef>) -> Value {
    r.map_or(Value::Null, Value::Object)
}

// ============================================================================
// Config
// ============================================================================

pub(crate) fn config() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getitem" => call(get_item),
        "getitembyguid" => call(get_item_by_guid),
        "newitem" => call(new_item),
    ]
}

fn get_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let key = item_key(call.string(0));
    Ok(object_or_null(registered(call, &key)))
}

fn get_item_by_guid(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let key = guid_key(call.string(0));
    Ok(object_or_null(registered(call, &key)))
}

/// Config.newItem(name, guid) - Returns the item already registered under
/// either key, or creates one.
fn new_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let name = call.string(0).to_string();
    let guid = call.string(1).to_string();
    let existing = registered(call, &guid_key(&guid)).or_else(|| registered(call, &item_key(&name)));
    if let Some(item) = existing {
        return Ok(Value::Object(item));
    }
    let item = call.new_instance("ConfigItem")?;
    set_field_of(call, item, "name", Value::from(name.as_str()));
    set_field_of(call, item, "guid", Value::from(guid.as_str()));
    register(call, item_key(&name), item);
    register(call, guid_key(&guid), item);
    Ok(Value::Object(item))
}

// ============================================================================
// ConfigItem
// ============================================================================

pub(crate) fn config_item() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getattribute" => call(get_attribute),
        "newattribute" => call(new_attribute),
        "getguid" => get("guid"),
        "getname" => get("name"),
    ]
}

fn attribute_key(name: &str) -> String {
    format!("attr.{}", name.to_lowercase())
}

fn get_attribute(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let key = attribute_key(call.string(0));
    Ok(object_or_null(call.object_field(&key)))
}

/// ConfigItem.newAttribute(name, default) - An existing attribute keeps its
/// data.
fn new_attribute(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let name = call.string(0).to_string();
    let default = call.string(1).to_string();
    let key = attribute_key(&name);
    if let Some(existing) = call.object_field(&key) {
        return Ok(Value::Object(existing));
    }
    let this = call.this();
    let attribute = call.new_instance("ConfigAttribute")?;
    set_field_of(call, attribute, "name", Value::from(name));
    set_field_of(call, attribute, "data", Value::from(default));
    set_field_of(call, attribute, "parent", Value::Object(this));
    call.set_field(key, attribute);
    Ok(Value::Object(attribute))
}

// ============================================================================
// ConfigAttribute
// ============================================================================

pub(crate) fn config_attribute() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "setdata" => call(set_data),
        "getdata" => get("data"),
        "ondatachanged" => hook(),
        "getparentitem" => call(get_parent_item),
        "getattributename" => get("name"),
    ]
}

/// ConfigAttribute.setData(value) - Fires `onDataChanged` when the value
/// changes.
fn set_data(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let value = call.string(0).to_string();
    if call.field("data").and_then(Value::as_str) == Some(value.as_str()) {
        return Ok(Value::Void);
    }
    call.set_field("data", value);
    call.emit("onDataChanged", Vec::new());
    Ok(Value::Void)
}

fn get_parent_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(object_or_null(call.object_field("parent")))
}

// ============================================================================
// WinampConfig
// ============================================================================

pub(crate) fn winamp_config() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getgroup" => call(get_group),
    ]
}

/// WinampConfig.getGroup(guid) - One group instance per GUID.
fn get_group(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let guid = call.string(0).to_string();
    let key = group_key(&guid);
    if let Some(group) = registered(call, &key) {
        return Ok(Value::Object(group));
    }
    let group = call.new_instance("WinampConfigGroup")?;
    set_field_of(call, group, "guid", Value::from(guid));
    register(call, key, group);
    Ok(Value::Object(group))
}

pub(crate) fn winamp_config_group() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getbool" => call(get_bool),
        "setbool" => call(set_value),
        "getint" => call(get_int),
        "setint" => call(set_value),
        "getstring" => call(get_string),
        "setstring" => call(set_value),
    ]
}

/// Host value first, then what the script last stored.
fn group_value(call: &mut NativeCall<'_>) -> Option<Value> {
    let guid = call.field_or("guid", "");
    let name = call.arg(0).clone();
    let field = format!("value.{}", call.string(0));
    call.query_element(ElementId::SYSTEM, "winampConfig.get", &[guid, name])
        .or_else(|| call.field(&field).cloned())
}

fn get_bool(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(group_value(call).is_some_and(|v| v.to_boolean())))
}

fn get_int(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(group_value(call).and_then(|v| v.as_i32()).unwrap_or(0)))
}

fn get_string(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let value = group_value(call);
    Ok(match value {
        Some(Value::String(s)) => Value::String(s),
        Some(v) if v.is_numeric() => Value::String(v.to_string()),
        _ => Value::from(""),
    })
}

fn set_value(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let guid = call.field_or("guid", "");
    let (name, value) = (call.arg(0).clone(), call.arg(1).clone());
    let field = format!("value.{}", call.string(0));
    call.set_field(field, value.clone());
    call.mutate_element(ElementId::SYSTEM, "winampConfig.set", &[guid, name, value]);
    Ok(Value::Void)
}

// ============================================================================
// Application
// ============================================================================

pub(crate) fn application() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getapplicationname" => call(get_application_name),
        "getversionstring" => call(get_version_string),
        "getversionnumber" => call(get_version_number),
        "getbuildnumber" => service("getBuildNumber"),
        "getapplicationpath" => service("getApplicationPath"),
        "getsettingspath" => service("getSettingsPath"),
    ]
}

fn get_application_name(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(call
        .query_element(ElementId::SYSTEM, "getApplicationName", &[])
        .unwrap_or_else(|| Value::from(APPLICATION_NAME)))
}

fn get_version_string(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(call
        .query_element(ElementId::SYSTEM, "getVersionString", &[])
        .unwrap_or_else(|| Value::String(format!("{RUNTIME_VERSION}"))))
}

/// Application.getVersionNumber() - 5.666 reads as 5666.
fn get_version_number(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(call
        .query_element(ElementId::SYSTEM, "getVersionNumber", &[])
        .unwrap_or_else(|| Value::Int((RUNTIME_VERSION * 1000.0).round() as i32)))
}

// ============================================================================
// File
// ============================================================================

pub(crate) fn file() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "load" => call(load),
        "save" => call(save),
        "exists" => call(exists),
        "getsize" => call(get_size),
        "setfile" => call(set_file),
    ]
}

fn path(call: &NativeCall<'_>) -> Value {
    call.field_or("path", "")
}

fn set_file(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let path = call.string(0).to_string();
    call.set_field("path", path);
    Ok(Value::Void)
}

fn load(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let path = path(call);
    call.mutate_element(ElementId::SYSTEM, "file.load", &[path]);
    Ok(Value::Void)
}

fn save(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let path = path(call);
    call.mutate_element(ElementId::SYSTEM, "file.save", &[path]);
    Ok(Value::Void)
}

fn exists(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let path = path(call);
    let found = call.query_element(ElementId::SYSTEM, "file.exists", &[path]);
    Ok(Value::Boolean(found.is_some_and(|v| v.to_boolean())))
}

fn get_size(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let path = path(call);
    let size = call
        .query_element(ElementId::SYSTEM, "file.getSize", &[path])
        .and_then(|v| v.as_i32());
    Ok(Value::Int(size.unwrap_or(0)))
}

// ============================================================================
// Playlist editor and directory
// ============================================================================

pub(crate) fn pl_edit() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "onpleditmodified" => hook(),
        "showcurrentlyplayingtrack" => service("pledit.showCurrentlyPlayingTrack"),
        "showtrack" => service("pledit.showTrack"),
        "getnumtracks" => service("pledit.getNumTracks"),
        "getcurrentindex" => service("pledit.getCurrentIndex"),
        "getnumselectedtracks" => service("pledit.getNumSelectedTracks"),
        "getnextselectedtrack" => service("pledit.getNextSelectedTrack"),
        "gettitle" => service("pledit.getTitle"),
        "getlength" => service("pledit.getLength"),
        "getmetadata" => service("pledit.getMetaData"),
        "getfilename" => service("pledit.getFileName"),
        "getrating" => service("pledit.getRating"),
        "setrating" => service("pledit.setRating"),
        "enqueuefile" => service("pledit.enqueueFile"),
        "clear" => service("pledit.clear"),
        "removetrack" => service("pledit.removeTrack"),
        "swaptracks" => service("pledit.swapTracks"),
        "moveup" => service("pledit.moveUp"),
        "movedown" => service("pledit.moveDown"),
        "moveto" => service("pledit.moveTo"),
        "playtrack" => service("pledit.playTrack"),
    ]
}

pub(crate) fn pl_dir() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "showcurrentlyplayingentry" => service("pldir.showCurrentlyPlayingEntry"),
        "getnumitems" => service("pldir.getNumItems"),
        "getitemname" => service("pldir.getItemName"),
        "refresh" => service("pldir.refresh"),
        "renameitem" => service("pldir.renameItem"),
        "enqueueitem" => service("pldir.enqueueItem"),
        "playitem" => service("pldir.playItem"),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn test_items_are_shared_between_handles() {
        let mut fx = Fixture::new();
        let first = fx.create("Config");
        let second = fx.create("Config");
        let item = fx.call(first, "newItem", &[s("Skin"), s("{ABC}")]);
        assert_eq!(fx.call(second, "getItem", &[s("skin")]), item);
        assert_eq!(fx.call(second, "getItemByGuid", &[s("{abc}")]), item);
        assert_eq!(fx.call(second, "newItem", &[s("other"), s("{ABC}")]), item);
        let item = item.as_object().unwrap();
        assert_eq!(fx.call(item, "getName", &[]), s("Skin"));
        assert_eq!(fx.call(item, "getGuid", &[s("")]), s("{ABC}"));
    }

    #[test]
    fn test_deleted_items_are_forgotten() {
        let mut fx = Fixture::new();
        let config = fx.create("Config");
        let item = fx.call(config, "newItem", &[s("a"), s("g")]).as_object().unwrap();
        fx.model.destroy(item);
        assert_eq!(fx.call(config, "getItem", &[s("a")]), Value::Null);
    }

    #[test]
    fn test_attributes() {
        let mut fx = Fixture::new();
        let config = fx.create("Config");
        let item = fx.call(config, "newItem", &[s("a"), s("g")]).as_object().unwrap();
        let attr = fx.call(item, "newAttribute", &[s("Color"), s("red")]).as_object().unwrap();
        assert_eq!(fx.call(item, "newAttribute", &[s("color"), s("blue")]), Value::Object(attr));
        assert_eq!(fx.call(attr, "getData", &[]), s("red"));
        assert_eq!(fx.call(attr, "getAttributeName", &[]), s("Color"));
        assert_eq!(fx.call(attr, "getParentItem", &[]), Value::Object(item));
        fx.call(attr, "setData", &[s("red")]);
        fx.call(attr, "setData", &[s("green")]);
        assert_eq!(fx.events(), [(attr, "onDataChanged".to_string())]);
        assert_eq!(fx.call(item, "getAttribute", &[s("COLOR")]), Value::Object(attr));
    }

    #[test]
    fn test_winamp_config_groups() {
        let mut fx = Fixture::new();
        let config = fx.create("WinampConfig");
        let group = fx.call(config, "getGroup", &[s("{G}")]);
        assert_eq!(fx.call(config, "getGroup", &[s("{g}")]), group);
        let group = group.as_object().unwrap();
        fx.call(group, "setInt", &[s("volume"), Value::Int(7)]);
        fx.call(group, "setBool", &[s("shuffle"), Value::Boolean(true)]);
        assert_eq!(fx.call(group, "getInt", &[s("volume")]), Value::Int(7));
        assert_eq!(fx.call(group, "getBool", &[s("shuffle")]), Value::Boolean(true));
        assert_eq!(fx.call(group, "getString", &[s("missing")]), s(""));
    }

    #[test]
    fn test_host_services_without_a_host() {
        let mut fx = Fixture::new();
        let app = fx.create("Application");
        assert_eq!(fx.call(app, "getApplicationName", &[]), s(APPLICATION_NAME));
        assert_eq!(fx.call(app, "getVersionNumber", &[]), Value::Int(5666));
        assert_eq!(fx.call(app, "getBuildNumber", &[]), Value::Int(0));
        let file = fx.create("File");
        fx.call(file, "setFile", &[s("skin.xml")]);
        assert_eq!(fx.call(file, "exists", &[]), Value::Boolean(false));
        let pledit = fx.create("PlEdit");
        assert_eq!(fx.call(pledit, "getTitle", &[Value::Int(0)]), s(""));
    }
}
