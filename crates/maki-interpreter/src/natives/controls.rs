// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive controls: edits, sliders, buttons, check boxes, drop-down
//! lists and the smaller widgets.

use super::gui::{int_property, set_region, set_region_from_map, store_int};
use super::{MethodEntry, NativeCall, call, forward, get, hook, methods, set, state_mismatch};
use crate::error::ObjectError;
use crate::runtime::instance::NativeState;
use crate::runtime::value::Value;

/// Items and selection of a `DropDownList`.
#[derive(Debug, Clone, Default)]
pub struct DropdownState {
    pub items: Vec<String>,
    pub selected: Option<usize>,
    pub custom_text: String,
    pub no_item_text: String,
    pub open: bool,
    pub list_height: i32,
}

impl DropdownState {
    fn selected_text(&self) -> &str {
        self.selected
            .and_then(|i| self.items.get(i))
            .map_or(self.no_item_text.as_str(), String::as_str)
    }
}

/// Stores a string property, mirrors it, and reports whether it changed.
fn store_text(call: &mut NativeCall<'_>, property: &str, text: &str) -> bool {
    let changed = call.field(property).and_then(Value::as_str) != Some(text);
    call.set_field(property, text);
    call.mutate(property, &[Value::from(text)]);
    changed
}

// ============================================================================
// Edit
// ============================================================================

pub(crate) fn edit() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "onenter" => hook(),
        "onabort" => hook(),
        "onidleeditupdate" => hook(),
        "oneditupdate" => hook(),
        "settext" => set("text"),
        "setautoenter" => set("autoEnter"),
        "getautoenter" => get("autoEnter"),
        "gettext" => get("text"),
        "selectall" => forward("selectAll"),
        "enter" => call(edit_enter),
        "setidleenabled" => set("idleEnabled"),
        "getidleenabled" => get("idleEnabled"),
    ]
}

/// Edit.enter() - Behaves as if the user pressed Enter.
fn edit_enter(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    call.mutate("enter", &[]);
    call.emit("onEnter", Vec::new());
    Ok(Value::Void)
}

// ============================================================================
// Slider and Frame
// ============================================================================

pub(crate) fn slider() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "onsetposition" => hook(),
        "onpostedposition" => hook(),
        "onsetfinalposition" => hook(),
        "setposition" => call(slider_set_position),
        "getposition" => get("position"),
        "lock" => call(slider_lock),
        "unlock" => call(slider_unlock),
    ]
}

/// Slider.setPosition(pos) - Clamped to the `low`..`high` xml range
/// (default 0..255); fires `onSetPosition`.
fn slider_set_position(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let low = xml_int(call, "low").unwrap_or(0);
    let high = xml_int(call, "high").unwrap_or(255);
    let (low, high) = (low.min(high), low.max(high));
    let pos = call.int(0).clamp(low, high);
    store_int(call, "position", pos);
    call.emit("onSetPosition", vec![Value::Int(pos)]);
    Ok(Value::Void)
}

fn xml_int(call: &NativeCall<'_>, param: &str) -> Option<i32> {
    call.field(&format!("xml.{param}"))
        .and_then(Value::as_str)
        .map(|s| super::system::leading_number(s) as i32)
}

fn slider_lock(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    store_int(call, "locked", 1);
    Ok(Value::Void)
}

fn slider_unlock(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    store_int(call, "locked", 0);
    Ok(Value::Void)
}

pub(crate) fn frame() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getposition" => get("position"),
        "setposition" => call(frame_set_position),
        "onsetposition" => hook(),
    ]
}

fn frame_set_position(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    store_int(call, "position", pos);
    call.emit("onSetPosition", vec![Value::Int(pos)]);
    Ok(Value::Void)
}

// ============================================================================
// Vis and Browser
// ============================================================================

/// Number of visualization modes: off, spectrum, oscilloscope.
const VIS_MODES: i32 = 3;

pub(crate) fn vis() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "onframe" => hook(),
        "setrealtime" => set("realtime"),
        "getrealtime" => get("realtime"),
        "getmode" => get("mode"),
        "setmode" => set("mode"),
        "nextmode" => call(vis_next_mode),
    ]
}

fn vis_next_mode(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let mode = (int_property(call, "mode") + 1).rem_euclid(VIS_MODES);
    store_int(call, "mode", mode);
    Ok(Value::Void)
}

pub(crate) fn browser() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "navigateurl" => forward("navigateUrl"),
        "back" => forward("back"),
        "forward" => forward("forward"),
        "stop" => forward("stop"),
        "refresh" => forward("refresh"),
        "home" => forward("home"),
        "settargetname" => set("targetName"),
        "onbeforenavigate" => hook(),
        "ondocumentcomplete" => hook(),
    ]
}

// ============================================================================
// Text
// ============================================================================

pub(crate) fn text() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "settext" => call(text_set_text),
        "setalternatetext" => set("alternateText"),
        "gettext" => get("text"),
        "gettextwidth" => forward("getTextWidth"),
        "ontextchanged" => hook(),
    ]
}

/// Text.setText(txt) - Fires `onTextChanged` when the text differs.
fn text_set_text(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let text = call.string(0).to_string();
    if store_text(call, "text", &text) {
        call.emit("onTextChanged", vec![Value::String(text)]);
    }
    Ok(Value::Void)
}

// ============================================================================
// Buttons
// ============================================================================

pub(crate) fn button() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "onactivate" => hook(),
        "onleftclick" => hook(),
        "onrightclick" => hook(),
        "setactivated" => call(button_set_activated),
        "setactivatednocallback" => call(button_set_activated_silently),
        "getactivated" => call(button_get_activated),
        "leftclick" => call(button_left_click),
        "rightclick" => call(button_right_click),
    ]
}

fn activated(call: &mut NativeCall<'_>) -> bool {
    int_property(call, "activated") != 0
}

/// Button.setActivated(on) - Fires `onActivate` when the state changes.
fn button_set_activated(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(0);
    let was = activated(call);
    store_int(call, "activated", i32::from(on));
    if was != on {
        call.emit("onActivate", vec![Value::Int(i32::from(on))]);
    }
    Ok(Value::Void)
}

fn button_set_activated_silently(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(0);
    store_int(call, "activated", i32::from(on));
    Ok(Value::Void)
}

fn button_get_activated(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(activated(call)))
}

/// Button.leftClick() - Fires `onLeftClick`; a toggle button also flips its
/// state and fires `onToggle`.
fn button_left_click(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    call.emit("onLeftClick", Vec::new());
    let this = call.this();
    if call.model_ref().is_instance_of(this, "ToggleButton") {
        let on = !activated(call);
        store_int(call, "activated", i32::from(on));
        call.emit("onToggle", vec![Value::Boolean(on)]);
    }
    Ok(Value::Void)
}

fn button_right_click(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    call.emit("onRightClick", Vec::new());
    Ok(Value::Void)
}

pub(crate) fn toggle_button() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "ontoggle" => hook(),
        "getcurcfgval" => call(toggle_cfg_val),
    ]
}

/// ToggleButton.getCurCfgVal() - The bound config value, else the toggle state.
fn toggle_cfg_val(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if let Some(v) = call.query("getCurCfgVal", &[]) {
        return Ok(v);
    }
    Ok(Value::Int(i32::from(activated(call))))
}

pub(crate) fn check_box() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "ontoggle" => hook(),
        "setchecked" => call(check_box_set_checked),
        "ischecked" => get("checked"),
        "settext" => set("text"),
        "gettext" => get("text"),
    ]
}

/// CheckBox.setChecked(c) - Fires `onToggle` when the state changes.
fn check_box_set_checked(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let checked = i32::from(call.int(0) != 0);
    let was = int_property(call, "checked");
    store_int(call, "checked", checked);
    if was != checked {
        call.emit("onToggle", vec![Value::Int(checked)]);
    }
    Ok(Value::Void)
}

pub(crate) fn menu_button() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "onopenmenu" => hook(),
        "onclosemenu" => hook(),
        "onselectitem" => hook(),
        "openmenu" => call(menu_button_open),
        "closemenu" => call(menu_button_close),
    ]
}

fn menu_button_open(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    call.mutate("openMenu", &[]);
    call.emit("onOpenMenu", Vec::new());
    Ok(Value::Void)
}

fn menu_button_close(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    call.mutate("closeMenu", &[]);
    call.emit("onCloseMenu", Vec::new());
    Ok(Value::Void)
}

// ============================================================================
// DropDownList
// ============================================================================

pub(crate) fn drop_down_list() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getitemselected" => call(dropdown_selected_text),
        "onselect" => hook(),
        "setlistheight" => call(dropdown_set_list_height),
        "openlist" => call(dropdown_open),
        "closelist" => call(dropdown_close),
        "selectitem" => call(dropdown_select),
        "getitemtext" => call(dropdown_item_text),
        "getselected" => call(dropdown_selected),
        "getselectedtext" => call(dropdown_selected_text),
        "getcustomtext" => call(dropdown_custom_text),
        "deleteallitems" => call(dropdown_clear),
        "additem" => call(dropdown_add),
        "delitem" => call(dropdown_delete),
        "finditem" => call(dropdown_find),
        "getnumitems" => call(dropdown_len),
        "setitems" => call(dropdown_set_items),
        "setnoitemtext" => call(dropdown_set_no_item_text),
    ]
}

fn dropdown<'a>(call: &'a mut NativeCall<'_>) -> Result<&'a mut DropdownState, ObjectError> {
    match call.state()? {
        NativeState::Dropdown(state) => Ok(state),
        _ => Err(state_mismatch("DropDownList")),
    }
}

fn index(n: i32, len: usize) -> Option<usize> {
    usize::try_from(n).ok().filter(|&i| i < len)
}

fn dropdown_selected_text(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::from(dropdown(call)?.selected_text()))
}

fn dropdown_set_list_height(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let h = call.int(0).max(0);
    dropdown(call)?.list_height = h;
    call.mutate("listHeight", &[Value::Int(h)]);
    Ok(Value::Void)
}

fn dropdown_open(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    dropdown(call)?.open = true;
    call.mutate("openList", &[]);
    Ok(Value::Void)
}

fn dropdown_close(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    dropdown(call)?.open = false;
    call.mutate("closeList", &[]);
    Ok(Value::Void)
}

/// DropDownList.selectItem(id, hover) - Fires `onSelect(id, hover)` for a
/// valid id; anything else is ignored.
fn dropdown_select(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (id, hover) = (call.int(0), call.int(1));
    let state = dropdown(call)?;
    let Some(i) = index(id, state.items.len()) else {
        return Ok(Value::Void);
    };
    state.selected = Some(i);
    state.custom_text = state.items[i].clone();
    call.mutate("selectItem", &[Value::Int(id)]);
    call.emit("onSelect", vec![Value::Int(id), Value::Int(hover)]);
    Ok(Value::Void)
}

fn dropdown_item_text(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let id = call.int(0);
    let state = dropdown(call)?;
    let text = index(id, state.items.len()).map(|i| state.items[i].clone());
    Ok(Value::String(text.unwrap_or_default()))
}

fn dropdown_selected(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let selected = dropdown(call)?.selected;
    Ok(Value::Int(selected.map_or(-1, |i| i as i32)))
}

fn dropdown_custom_text(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if let Some(v) = call.query("getCustomText", &[]) {
        return Ok(v);
    }
    Ok(Value::String(dropdown(call)?.custom_text.clone()))
}

fn dropdown_clear(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let state = dropdown(call)?;
    state.items.clear();
    state.selected = None;
    state.custom_text.clear();
    call.mutate("deleteAllItems", &[]);
    Ok(Value::Void)
}

/// DropDownList.addItem(text) - Returns the new item's id.
fn dropdown_add(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let text = call.string(0).to_string();
    let state = dropdown(call)?;
    state.items.push(text.clone());
    let id = state.items.len() as i32 - 1;
    call.mutate("addItem", &[Value::String(text)]);
    Ok(Value::Int(id))
}

/// DropDownList.delItem(id) - Later ids shift down; deleting the selected
/// item clears the selection.
fn dropdown_delete(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let id = call.int(0);
    let state = dropdown(call)?;
    let Some(i) = index(id, state.items.len()) else {
        return Ok(Value::Void);
    };
    state.items.remove(i);
    state.selected = match state.selected {
        Some(s) if s == i => None,
        Some(s) if s > i => Some(s - 1),
        other => other,
    };
    call.mutate("delItem", &[Value::Int(id)]);
    Ok(Value::Void)
}

fn dropdown_find(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let text = call.string(0).to_string();
    let pos = dropdown(call)?.items.iter().position(|item| *item == text);
    Ok(Value::Int(pos.map_or(-1, |i| i as i32)))
}

fn dropdown_len(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(dropdown(call)?.items.len() as i32))
}

/// DropDownList.setItems(list) - Replaces the items with the `;`-separated
/// entries of `list`.
fn dropdown_set_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let list = call.string(0).to_string();
    let state = dropdown(call)?;
    state.items = list
        .split(';')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    state.selected = None;
    call.mutate("setItems", &[Value::String(list)]);
    Ok(Value::Void)
}

fn dropdown_set_no_item_text(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let text = call.string(0).to_string();
    dropdown(call)?.no_item_text = text;
    Ok(Value::Void)
}

// ============================================================================
// Small widgets
// ============================================================================

pub(crate) fn query_list() -> Vec<(&'static str, MethodEntry)> {
    methods!["onresetquery" => hook()]
}

pub(crate) fn mouse_redir() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "setredirection" => call(set_redirection),
        "getredirection" => call(get_redirection),
        "setregionfrommap" => call(set_region_from_map),
        "setregion" => call(set_region),
    ]
}

fn set_redirection(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let target = call.object(0);
    call.set_field("redirection", target);
    call.mutate("setRedirection", &[target.into()]);
    Ok(Value::Void)
}

fn get_redirection(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(call.object_field("redirection").into())
}

pub(crate) fn layout_status() -> Vec<(&'static str, MethodEntry)> {
    methods!["callme" => forward("callme")]
}

pub(crate) fn tab_sheet() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getcurpage" => get("curPage"),
        "setcurpage" => set("curPage"),
    ]
}

pub(crate) fn form() -> Vec<(&'static str, MethodEntry)> {
    methods!["getcontentsheight" => forward("getContentsHeight")]
}
