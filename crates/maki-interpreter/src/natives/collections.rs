// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Non-visual helper classes: List, BitList, Map, PopupMenu, Region, Timer.

use super::{MethodEntry, NativeCall, call, hook, methods, state_mismatch};
use crate::error::ObjectError;
use crate::host::ElementId;
use crate::runtime::heap::ObjectRef;
use crate::runtime::instance::{Instance, NativeState};
use crate::runtime::value::Value;

/// Largest size `BitList.setSize` grows to.
pub const MAX_BITS: usize = 1 << 20;

// ============================================================================
// State
// ============================================================================

/// Schedule of a `Timer`.
#[derive(Debug, Clone, Default)]
pub struct TimerState {
    /// Period in milliseconds. Zero means the timer cannot start.
    pub delay_ms: u32,
    /// Whether the timer fires.
    pub running: bool,
    /// Clock reading at which the next `onTimer` is due.
    pub next_due: u64,
    /// Periods that elapsed without a delivery.
    pub skipped: u32,
}

impl TimerState {
    /// Moves the deadline past `now`. Whole periods missed on the way are
    /// counted as skipped.
    pub fn advance(&mut self, now: u64) {
        let delay = u64::from(self.delay_ms.max(1));
        let periods = now.saturating_sub(self.next_due) / delay;
        self.skipped = self
            .skipped
            .saturating_add(u32::try_from(periods).unwrap_or(u32::MAX));
        self.next_due += (periods + 1) * delay;
    }
}

/// One row of a `PopupMenu`.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    /// Selectable command.
    Command {
        text: String,
        id: i32,
        checked: bool,
        disabled: bool,
    },
    /// Horizontal rule.
    Separator,
    /// Nested menu, by reference.
    SubMenu { menu: ObjectRef, text: String },
}

/// Entries of a `PopupMenu`.
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    pub entries: Vec<MenuEntry>,
}

/// Axis-aligned rectangle in region space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    fn right(&self) -> i32 {
        self.x + self.w
    }

    fn bottom(&self) -> i32 {
        self.y + self.h
    }

    fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// The parts of `self` not covered by `other`, as at most four rectangles.
    fn subtract(&self, other: &Rect) -> Vec<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if left >= right || top >= bottom {
            return vec![*self];
        }
        [
            Rect::new(self.x, self.y, self.w, top - self.y),
            Rect::new(self.x, bottom, self.w, self.bottom() - bottom),
            Rect::new(self.x, top, left - self.x, bottom - top),
            Rect::new(right, top, self.right() - right, bottom - top),
        ]
        .into_iter()
        .filter(|r| !r.is_empty())
        .collect()
    }
}

/// A `Region`: a set of disjoint rectangles.
#[derive(Debug, Clone, Default)]
pub struct RegionState {
    pub rects: Vec<Rect>,
}

impl RegionState {
    /// Adds the area of `rects` not already covered.
    pub fn add(&mut self, rects: &[Rect]) {
        for rect in rects {
            let mut pieces = vec![*rect];
            for existing in &self.rects {
                pieces = pieces.iter().flat_map(|p| p.subtract(existing)).collect();
            }
            self.rects.extend(pieces);
        }
    }

    /// Removes the area of `rects`.
    pub fn subtract(&mut self, rects: &[Rect]) {
        for cut in rects {
            self.rects = self.rects.iter().flat_map(|r| r.subtract(cut)).collect();
        }
    }

    /// Smallest rectangle covering the region; all zero when empty.
    pub fn bounding_box(&self) -> Rect {
        let Some(first) = self.rects.first() else {
            return Rect::new(0, 0, 0, 0);
        };
        let (mut left, mut top) = (first.x, first.y);
        let (mut right, mut bottom) = (first.right(), first.bottom());
        for r in &self.rects[1..] {
            left = left.min(r.x);
            top = top.min(r.y);
            right = right.max(r.right());
            bottom = bottom.max(r.bottom());
        }
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Total covered area.
    pub fn area(&self) -> i64 {
        self.rects
            .iter()
            .map(|r| i64::from(r.w) * i64::from(r.h))
            .sum()
    }
}

/// A `Map`: a bitmap id whose pixels the host samples.
#[derive(Debug, Clone, Default)]
pub struct MapState {
    pub bitmap: Option<String>,
}

// ============================================================================
// List
// ============================================================================

pub(crate) fn list() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "additem" => call(list_add_item),
        "removeitem" => call(list_remove_item),
        "enumitem" => call(list_enum_item),
        "finditem" => call(list_find_item),
        "getnumitems" => call(list_num_items),
        "removeall" => call(list_remove_all),
    ]
}

fn items<'a>(call: &'a mut NativeCall<'_>) -> Result<&'a mut Vec<Value>, ObjectError> {
    match call.state()? {
        NativeState::List(items) => Ok(items),
        _ => Err(state_mismatch("List")),
    }
}

fn list_add_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let item = call.arg(0).clone();
    items(call)?.push(item);
    Ok(Value::Void)
}

fn list_remove_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    let items = items(call)?;
    if let Ok(pos) = usize::try_from(pos) {
        if pos < items.len() {
            items.remove(pos);
        }
    }
    Ok(Value::Void)
}

fn list_enum_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    let items = items(call)?;
    Ok(usize::try_from(pos)
        .ok()
        .and_then(|pos| items.get(pos).cloned())
        .unwrap_or(Value::Null))
}

/// List.findItem(object) - Position of the first equal item, or -1.
fn list_find_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let needle = call.arg(0).clone();
    let pos = items(call)?.iter().position(|v| *v == needle);
    Ok(Value::Int(pos.map_or(-1, |p| p as i32)))
}

fn list_num_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(items(call)?.len() as i32))
}

fn list_remove_all(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    items(call)?.clear();
    Ok(Value::Void)
}

// ============================================================================
// BitList
// ============================================================================

pub(crate) fn bit_list() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getitem" => call(bits_get),
        "setitem" => call(bits_set),
        "setsize" => call(bits_set_size),
        "getsize" => call(bits_size),
    ]
}

fn bits<'a>(call: &'a mut NativeCall<'_>) -> Result<&'a mut Vec<bool>, ObjectError> {
    match call.state()? {
        NativeState::Bits(bits) => Ok(bits),
        _ => Err(state_mismatch("BitList")),
    }
}

fn bits_get(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let n = call.int(0);
    let bits = bits(call)?;
    let bit = usize::try_from(n).ok().and_then(|n| bits.get(n)).copied();
    Ok(Value::Boolean(bit.unwrap_or(false)))
}

/// BitList.setItem(n, val) - Out-of-range positions are ignored.
fn bits_set(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (n, val) = (call.int(0), call.boolean(1));
    let Ok(n) = usize::try_from(n) else {
        return Ok(Value::Void);
    };
    if let Some(bit) = bits(call)?.get_mut(n) {
        *bit = val;
    }
    Ok(Value::Void)
}

fn bits_set_size(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let size = usize::try_from(call.int(0)).unwrap_or(0).min(MAX_BITS);
    bits(call)?.resize(size, false);
    Ok(Value::Void)
}

fn bits_size(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(bits(call)?.len() as i32))
}

// ============================================================================
// Map
// ============================================================================

pub(crate) fn map() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getvalue" => call(map_get_value),
        "getargbvalue" => call(map_get_argb_value),
        "inregion" => call(map_in_region),
        "loadmap" => call(map_load),
        "getwidth" => call(map_width),
        "getheight" => call(map_height),
        "getregion" => call(map_region),
    ]
}

fn map_bitmap(call: &mut NativeCall<'_>) -> Result<Option<String>, ObjectError> {
    match call.state()? {
        NativeState::Map(map) => Ok(map.bitmap.clone()),
        _ => Err(state_mismatch("Map")),
    }
}

/// Samples the map's bitmap through the host. Unloaded maps read as zero.
fn sample(call: &mut NativeCall<'_>, property: &str, extra: &[Value]) -> Result<i32, ObjectError> {
    let Some(bitmap) = map_bitmap(call)? else {
        return Ok(0);
    };
    let mut args = vec![Value::String(bitmap)];
    args.extend_from_slice(extra);
    Ok(call.query_int(ElementId::SYSTEM, property, &args).unwrap_or(0))
}

fn map_load(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let id = call.string(0).to_string();
    match call.state()? {
        NativeState::Map(map) => map.bitmap = Some(id),
        _ => return Err(state_mismatch("Map")),
    }
    Ok(Value::Void)
}

fn map_get_value(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let xy = [Value::Int(call.int(0)), Value::Int(call.int(1))];
    Ok(Value::Int(sample(call, "map.getValue", &xy)?))
}

fn map_get_argb_value(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let args = [
        Value::Int(call.int(0)),
        Value::Int(call.int(1)),
        Value::Int(call.int(2)),
    ];
    Ok(Value::Int(sample(call, "map.getARGBValue", &args)?))
}

/// Map.inRegion(x, y) - Whether the sampled value at the point is non-zero.
fn map_in_region(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let xy = [Value::Int(call.int(0)), Value::Int(call.int(1))];
    Ok(Value::Boolean(sample(call, "map.getValue", &xy)? != 0))
}

fn map_width(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(sample(call, "map.getWidth", &[])?))
}

fn map_height(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(sample(call, "map.getHeight", &[])?))
}

fn map_region(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    let rects = scan_map(call, this, 0, false)?;
    let region = call.new_instance("Region")?;
    if let Some(instance) = call.model().instance_mut(region) {
        instance.state = NativeState::Region(RegionState { rects });
    }
    Ok(Value::Object(region))
}

/// Rectangles covering the pixels of `map` whose value passes `threshold`,
/// one per horizontal run.
pub(crate) fn scan_map(
    call: &mut NativeCall<'_>,
    map: ObjectRef,
    threshold: i32,
    reversed: bool,
) -> Result<Vec<Rect>, ObjectError> {
    let bitmap = match call.model_ref().instance(map).map(Instance::state) {
        Some(NativeState::Map(state)) => state.bitmap.clone(),
        _ => None,
    };
    let Some(bitmap) = bitmap else {
        return Ok(Vec::new());
    };
    let id = [Value::String(bitmap)];
    let width = call.query_int(ElementId::SYSTEM, "map.getWidth", &id).unwrap_or(0);
    let height = call.query_int(ElementId::SYSTEM, "map.getHeight", &id).unwrap_or(0);

    let mut rects = Vec::new();
    for y in 0..height {
        let mut run: Option<i32> = None;
        for x in 0..=width {
            let inside = x < width && {
                let args = [id[0].clone(), Value::Int(x), Value::Int(y)];
                let value = call
                    .query_int(ElementId::SYSTEM, "map.getValue", &args)
                    .unwrap_or(0);
                (value > threshold) != reversed
            };
            match (inside, run) {
                (true, None) => run = Some(x),
                (false, Some(start)) => {
                    rects.push(Rect::new(start, y, x - start, 1));
                    run = None;
                }
                _ => {}
            }
        }
    }
    Ok(rects)
}

// ============================================================================
// PopupMenu
// ============================================================================

pub(crate) fn popup_menu() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "addsubmenu" => call(menu_add_submenu),
        "addcommand" => call(menu_add_command),
        "addseparator" => call(menu_add_separator),
        "popatxy" => call(menu_pop_at_xy),
        "popatmouse" => call(menu_pop_at_mouse),
        "getnumcommands" => call(menu_num_commands),
        "checkcommand" => call(menu_check_command),
        "disablecommand" => call(menu_disable_command),
    ]
}

fn menu<'a>(call: &'a mut NativeCall<'_>) -> Result<&'a mut MenuState, ObjectError> {
    match call.state()? {
        NativeState::Menu(menu) => Ok(menu),
        _ => Err(state_mismatch("PopupMenu")),
    }
}

fn menu_add_submenu(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let Some(sub) = call.object(0) else {
        return Ok(Value::Void);
    };
    let text = call.string(1).to_string();
    menu(call)?.entries.push(MenuEntry::SubMenu { menu: sub, text });
    Ok(Value::Void)
}

fn menu_add_command(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let entry = MenuEntry::Command {
        text: call.string(0).to_string(),
        id: call.int(1),
        checked: call.boolean(2),
        disabled: call.boolean(3),
    };
    menu(call)?.entries.push(entry);
    Ok(Value::Void)
}

fn menu_add_separator(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    menu(call)?.entries.push(MenuEntry::Separator);
    Ok(Value::Void)
}

fn menu_num_commands(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(menu(call)?.entries.len() as i32))
}

fn update_command(
    call: &mut NativeCall<'_>,
    f: impl Fn(&mut bool, &mut bool),
) -> Result<Value, ObjectError> {
    let target = call.int(0);
    for entry in &mut menu(call)?.entries {
        if let MenuEntry::Command {
            id,
            checked,
            disabled,
            ..
        } = entry
        {
            if *id == target {
                f(checked, disabled);
            }
        }
    }
    Ok(Value::Void)
}

fn menu_check_command(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(1);
    update_command(call, |checked, _| *checked = on)
}

fn menu_disable_command(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(1);
    update_command(call, |_, disabled| *disabled = on)
}

/// Flattens a menu for the host. Commands become `"id:flags:text"` where
/// flags holds `c` for checked and `d` for disabled, separators `"-"`, and
/// sub-menus `">:text"` followed by their rows and a closing `"<"`.
fn describe_menu(call: &NativeCall<'_>, menu: ObjectRef, depth: usize, out: &mut Vec<Value>) {
    let entries = match call.model_ref().instance(menu).map(Instance::state) {
        Some(NativeState::Menu(state)) => state.entries.clone(),
        _ => return,
    };
    for entry in entries {
        match entry {
            MenuEntry::Command {
                text,
                id,
                checked,
                disabled,
            } => {
                let flags = format!(
                    "{}{}",
                    if checked { "c" } else { "" },
                    if disabled { "d" } else { "" }
                );
                out.push(Value::String(format!("{id}:{flags}:{text}")));
            }
            MenuEntry::Separator => out.push(Value::from("-")),
            MenuEntry::SubMenu { menu: sub, text } => {
                // Menus may contain themselves; stop at a sane depth.
                if depth < 16 && call.model_ref().is_alive(sub) {
                    out.push(Value::String(format!(">:{text}")));
                    describe_menu(call, sub, depth + 1, out);
                    out.push(Value::from("<"));
                }
            }
        }
    }
}

/// Shows the menu and returns the chosen command id, or -1 when dismissed.
fn pop_menu(call: &mut NativeCall<'_>, action: &str, position: &[Value]) -> Result<Value, ObjectError> {
    let mut args = position.to_vec();
    describe_menu(call, call.this(), 0, &mut args);
    Ok(Value::Int(
        call.query_int(ElementId::SYSTEM, action, &args).unwrap_or(-1),
    ))
}

fn menu_pop_at_xy(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let xy = [Value::Int(call.int(0)), Value::Int(call.int(1))];
    pop_menu(call, "popMenuAtXY", &xy)
}

fn menu_pop_at_mouse(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    pop_menu(call, "popMenuAtMouse", &[])
}

// ============================================================================
// Region
// ============================================================================

pub(crate) fn region() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "add" => call(region_add),
        "sub" => call(region_sub),
        "offset" => call(region_offset),
        "stretch" => call(region_stretch),
        "copy" => call(region_copy),
        "loadfrommap" => call(region_load_from_map),
        "loadfrombitmap" => call(region_load_from_bitmap),
        "getboundingboxx" => call(region_box_x),
        "getboundingboxy" => call(region_box_y),
        "getboundingboxw" => call(region_box_w),
        "getboundingboxh" => call(region_box_h),
    ]
}

fn region_state<'a>(call: &'a mut NativeCall<'_>) -> Result<&'a mut RegionState, ObjectError> {
    match call.state()? {
        NativeState::Region(region) => Ok(region),
        _ => Err(state_mismatch("Region")),
    }
}

/// Rectangles of the region passed as argument `i`; empty for null.
pub(crate) fn rects_arg(call: &NativeCall<'_>, i: usize) -> Vec<Rect> {
    let state = call
        .object(i)
        .and_then(|r| call.model_ref().instance(r))
        .map(Instance::state);
    match state {
        Some(NativeState::Region(region)) => region.rects.clone(),
        _ => Vec::new(),
    }
}

fn region_add(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let rects = rects_arg(call, 0);
    region_state(call)?.add(&rects);
    Ok(Value::Void)
}

fn region_sub(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let rects = rects_arg(call, 0);
    region_state(call)?.subtract(&rects);
    Ok(Value::Void)
}

fn region_offset(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (dx, dy) = (call.int(0), call.int(1));
    for r in &mut region_state(call)?.rects {
        r.x += dx;
        r.y += dy;
    }
    Ok(Value::Void)
}

/// Region.stretch(r) - Scales every rectangle about the origin.
fn region_stretch(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let factor = call.float(0);
    let scale = |v: i32| (f64::from(v) * factor).round() as i32;
    let region = region_state(call)?;
    for r in &mut region.rects {
        *r = Rect::new(scale(r.x), scale(r.y), scale(r.w), scale(r.h));
    }
    region.rects.retain(|r| !r.is_empty());
    Ok(Value::Void)
}

fn region_copy(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let rects = rects_arg(call, 0);
    region_state(call)?.rects = rects;
    Ok(Value::Void)
}

fn region_load_from_map(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (threshold, reversed) = (call.int(1), call.boolean(2));
    let rects = match call.object(0) {
        Some(map) => scan_map(call, map, threshold, reversed)?,
        None => Vec::new(),
    };
    region_state(call)?.rects = rects;
    Ok(Value::Void)
}

/// Region.loadFromBitmap(id) - The bitmap's full extent, as the host reports it.
fn region_load_from_bitmap(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let id = [call.arg(0).clone()];
    let w = call.query_int(ElementId::SYSTEM, "bitmap.getWidth", &id).unwrap_or(0);
    let h = call.query_int(ElementId::SYSTEM, "bitmap.getHeight", &id).unwrap_or(0);
    let rect = Rect::new(0, 0, w, h);
    region_state(call)?.rects = if rect.is_empty() { Vec::new() } else { vec![rect] };
    Ok(Value::Void)
}

fn bounding(call: &mut NativeCall<'_>, f: fn(&Rect) -> i32) -> Result<Value, ObjectError> {
    Ok(Value::Int(f(&region_state(call)?.bounding_box())))
}

fn region_box_x(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    bounding(call, |r| r.x)
}

fn region_box_y(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    bounding(call, |r| r.y)
}

fn region_box_w(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    bounding(call, |r| r.w)
}

fn region_box_h(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    bounding(call, |r| r.h)
}

// ============================================================================
// Timer
// ============================================================================

pub(crate) fn timer() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "ontimer" => hook(),
        "setdelay" => call(timer_set_delay),
        "getdelay" => call(timer_get_delay),
        "start" => call(timer_start),
        "stop" => call(timer_stop),
        "isrunning" => call(timer_is_running),
        "getskipped" => call(timer_skipped),
    ]
}

fn timer_state<'a>(call: &'a mut NativeCall<'_>) -> Result<&'a mut TimerState, ObjectError> {
    match call.state()? {
        NativeState::Timer(timer) => Ok(timer),
        _ => Err(state_mismatch("Timer")),
    }
}

/// Timer.setDelay(ms) - A running timer is rescheduled from now.
fn timer_set_delay(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let delay = u32::try_from(call.int(0)).unwrap_or(0);
    let now = call.model_ref().clock_ms();
    let timer = timer_state(call)?;
    timer.delay_ms = delay;
    if delay == 0 {
        timer.running = false;
    } else if timer.running {
        timer.next_due = now + u64::from(delay);
    }
    Ok(Value::Void)
}

fn timer_get_delay(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(timer_state(call)?.delay_ms as i32))
}

/// Timer.start() - Ignored while the delay is zero.
fn timer_start(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let now = call.model_ref().clock_ms();
    let timer = timer_state(call)?;
    if timer.delay_ms > 0 {
        timer.running = true;
        timer.skipped = 0;
        timer.next_due = now + u64::from(timer.delay_ms);
    }
    Ok(Value::Void)
}

fn timer_stop(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    timer_state(call)?.running = false;
    Ok(Value::Void)
}

fn timer_is_running(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(timer_state(call)?.running))
}

fn timer_skipped(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(timer_state(call)?.skipped as i32))
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;

    #[test]
    fn test_list_operations() {
        let mut fx = Fixture::new();
        let list = fx.create("List");
        fx.call(list, "addItem", &[Value::Int(7)]);
        fx.call(list, "addItem", &[Value::from("x")]);
        assert_eq!(fx.call(list, "getNumItems", &[]), Value::Int(2));
        assert_eq!(fx.call(list, "findItem", &[Value::from("x")]), Value::Int(1));
        assert_eq!(fx.call(list, "findItem", &[Value::Int(99)]), Value::Int(-1));
        assert_eq!(fx.call(list, "enumItem", &[Value::Int(5)]), Value::Null);
        fx.call(list, "removeItem", &[Value::Int(0)]);
        assert_eq!(fx.call(list, "enumItem", &[Value::Int(0)]), Value::from("x"));
        fx.call(list, "removeAll", &[]);
        assert_eq!(fx.call(list, "getNumItems", &[]), Value::Int(0));
    }

    #[test]
    fn test_bit_list_bounds() {
        let mut fx = Fixture::new();
        let bits = fx.create("BitList");
        fx.call(bits, "setSize", &[Value::Int(4)]);
        fx.call(bits, "setItem", &[Value::Int(2), Value::Boolean(true)]);
        fx.call(bits, "setItem", &[Value::Int(10), Value::Boolean(true)]);
        assert_eq!(fx.call(bits, "getItem", &[Value::Int(2)]), Value::Boolean(true));
        assert_eq!(fx.call(bits, "getItem", &[Value::Int(10)]), Value::Boolean(false));
        assert_eq!(fx.call(bits, "getSize", &[]), Value::Int(4));
    }

    #[test]
    fn test_bit_list_size_is_capped() {
        let mut fx = Fixture::new();
        let bits = fx.create("BitList");
        fx.call(bits, "setSize", &[Value::Int(i32::MAX)]);
        assert_eq!(fx.call(bits, "getSize", &[]), Value::Int(MAX_BITS as i32));
        fx.call(bits, "setSize", &[Value::Int(-3)]);
        assert_eq!(fx.call(bits, "getSize", &[]), Value::Int(0));
    }

    #[test]
    fn test_rect_subtract_splits() {
        let outer = Rect::new(0, 0, 10, 10);
        let hole = Rect::new(3, 3, 4, 4);
        let pieces = outer.subtract(&hole);
        assert_eq!(pieces.len(), 4);
        let area: i32 = pieces.iter().map(|r| r.w * r.h).sum();
        assert_eq!(area, 100 - 16);
        assert_eq!(outer.subtract(&Rect::new(20, 20, 5, 5)), vec![outer]);
    }

    #[test]
    fn test_region_add_keeps_rects_disjoint() {
        let mut region = RegionState::default();
        region.add(&[Rect::new(0, 0, 10, 10)]);
        region.add(&[Rect::new(5, 5, 10, 10)]);
        assert_eq!(region.area(), 100 + 100 - 25);
        assert_eq!(region.bounding_box(), Rect::new(0, 0, 15, 15));
    }

    #[test]
    fn test_region_natives() {
        let mut fx = Fixture::new();
        let a = fx.create("Region");
        let b = fx.create("Region");
        if let NativeState::Region(r) = &mut fx.model.instance_mut(b).unwrap().state {
            r.rects.push(Rect::new(2, 4, 6, 8));
        }
        fx.call(a, "copy", &[Value::Object(b)]);
        fx.call(a, "offset", &[Value::Int(1), Value::Int(1)]);
        assert_eq!(fx.call(a, "getBoundingBoxX", &[]), Value::Int(3));
        assert_eq!(fx.call(a, "getBoundingBoxH", &[]), Value::Int(8));
        fx.call(a, "stretch", &[Value::Float(2.0)]);
        assert_eq!(fx.call(a, "getBoundingBoxW", &[]), Value::Int(12));
        fx.call(a, "sub", &[Value::Object(a)]);
        assert_eq!(fx.call(a, "getBoundingBoxW", &[]), Value::Int(0));
    }

    #[test]
    fn test_popup_menu_defaults_to_dismissed() {
        let mut fx = Fixture::new();
        let menu = fx.create("PopupMenu");
        let args = [Value::from("Play"), Value::Int(1), Value::Boolean(false), Value::Boolean(false)];
        fx.call(menu, "addCommand", &args);
        fx.call(menu, "addSeparator", &[]);
        fx.call(menu, "checkCommand", &[Value::Int(1), Value::Boolean(true)]);
        assert_eq!(fx.call(menu, "getNumCommands", &[]), Value::Int(2));
        assert_eq!(fx.call(menu, "popAtMouse", &[]), Value::Int(-1));
        let NativeState::Menu(state) = fx.model.instance(menu).unwrap().state() else {
            panic!("menu state");
        };
        assert!(matches!(state.entries[0], MenuEntry::Command { checked: true, .. }));
    }

    #[test]
    fn test_timer_start_requires_delay() {
        let mut fx = Fixture::new();
        let timer = fx.create("Timer");
        fx.call(timer, "start", &[]);
        assert_eq!(fx.call(timer, "isRunning", &[]), Value::Boolean(false));
        fx.call(timer, "setDelay", &[Value::Int(100)]);
        fx.call(timer, "start", &[]);
        assert_eq!(fx.call(timer, "isRunning", &[]), Value::Boolean(true));
        assert_eq!(fx.call(timer, "getDelay", &[]), Value::Int(100));
    }

    #[test]
    fn test_due_timers_count_skipped_periods() {
        let mut fx = Fixture::new();
        let timer = fx.create("Timer");
        fx.call(timer, "setDelay", &[Value::Int(100)]);
        fx.call(timer, "start", &[]);
        assert!(fx.model.due_timers(50).is_empty());
        assert_eq!(fx.model.due_timers(350), vec![timer]);
        assert_eq!(fx.call(timer, "getSkipped", &[]), Value::Int(2));
        assert!(fx.model.due_timers(399).is_empty());
        assert_eq!(fx.model.due_timers(400), vec![timer]);
    }

    #[test]
    fn test_due_timers_ordered_by_deadline() {
        let mut fx = Fixture::new();
        let slow = fx.create("Timer");
        let fast = fx.create("Timer");
        fx.call(slow, "setDelay", &[Value::Int(200)]);
        fx.call(fast, "setDelay", &[Value::Int(100)]);
        fx.call(slow, "start", &[]);
        fx.call(fast, "start", &[]);
        assert_eq!(fx.model.due_timers(250), vec![fast, slow]);
    }
}
