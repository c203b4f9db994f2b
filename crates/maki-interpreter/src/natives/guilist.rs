// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `GuiList`: a multi-column list with focus, selection and sorting.
//!
//! Rows and columns live entirely in the core; the host only draws them.
//! Sub-item 0 of a row is its label. Selection changes are reported as
//! `onItemSelection(pos, selected)` events, deselections first.

use std::cmp::Ordering;

use super::gui::int_property;
use super::system::leading_number;
use super::{MethodEntry, NativeCall, call, forward, hook, methods, set, state_mismatch};
use crate::error::ObjectError;
use crate::runtime::instance::NativeState;
use crate::runtime::value::Value;

/// Pixel height of one row.
pub const ROW_HEIGHT: i32 = 16;
/// Pixel height of the column header, when there are columns.
pub const HEADER_HEIGHT: i32 = 16;
const DEFAULT_FONT_SIZE: i32 = 14;
/// Sub-items a row may hold beyond its declared columns.
pub const MAX_SUB_ITEMS: usize = 256;

/// One list column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    pub label: String,
    pub width: i32,
    pub numeric: bool,
    pub dynamic: bool,
}

/// One list row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<String>,
    pub selected: bool,
}

impl Row {
    fn new(label: &str) -> Self {
        Self {
            cells: vec![label.to_string()],
            selected: false,
        }
    }

    fn cell(&self, sub: usize) -> &str {
        self.cells.get(sub).map_or("", String::as_str)
    }
}

/// A selection change: row position and new state.
pub type SelectionChange = (usize, bool);

/// Rows, columns and cursor of a `GuiList`.
#[derive(Debug, Clone)]
pub struct TableState {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub focus: Option<usize>,
    /// Start of a range selection.
    pub anchor: Option<usize>,
    pub last_added: Option<usize>,
    pub sort_column: usize,
    pub sort_descending: bool,
    pub auto_sort: bool,
    pub auto_deselect: bool,
    pub single_selection: bool,
    pub font_size: i32,
    /// First visible row.
    pub top: usize,
    pub scroll_x: i32,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            focus: None,
            anchor: None,
            last_added: None,
            sort_column: 0,
            sort_descending: false,
            auto_sort: false,
            auto_deselect: true,
            single_selection: false,
            font_size: DEFAULT_FONT_SIZE,
            top: 0,
            scroll_x: 0,
        }
    }
}

fn remap(slot: &mut Option<usize>, f: impl Fn(usize) -> Option<usize>) {
    *slot = slot.and_then(f);
}

impl TableState {
    /// Valid row index for a script position.
    pub fn index(&self, pos: i32) -> Option<usize> {
        usize::try_from(pos).ok().filter(|&i| i < self.rows.len())
    }

    /// Text of a cell; empty when out of range.
    pub fn cell(&self, pos: i32, sub: i32) -> &str {
        match (self.index(pos), usize::try_from(sub)) {
            (Some(i), Ok(sub)) => self.rows[i].cell(sub),
            _ => "",
        }
    }

    /// Positions of the selected rows, in order.
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.selected)
            .map(|(i, _)| i)
    }

    fn set_one(&mut self, i: usize, on: bool) -> Option<SelectionChange> {
        let row = self.rows.get_mut(i)?;
        if row.selected == on {
            return None;
        }
        row.selected = on;
        Some((i, on))
    }

    /// Selects or deselects one row. With single selection, selecting a
    /// row deselects the others.
    pub fn set_selected(&mut self, i: usize, on: bool) -> Vec<SelectionChange> {
        if on && self.single_selection {
            return self.select_only(i);
        }
        self.set_one(i, on).into_iter().collect()
    }

    /// Selects exactly one row.
    pub fn select_only(&mut self, i: usize) -> Vec<SelectionChange> {
        let others: Vec<usize> = self.selected().filter(|&j| j != i).collect();
        let mut changes: Vec<SelectionChange> = others
            .into_iter()
            .filter_map(|j| self.set_one(j, false))
            .collect();
        changes.extend(self.set_one(i, true));
        changes
    }

    /// Selects every row in `from..=to` (either order) and nothing else.
    pub fn select_range(&mut self, from: usize, to: usize) -> Vec<SelectionChange> {
        if self.single_selection {
            return self.select_only(to);
        }
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        let mut changes: Vec<SelectionChange> = (0..self.rows.len())
            .filter(|i| !(lo..=hi).contains(i))
            .filter_map(|i| self.set_one(i, false))
            .collect();
        changes.extend((lo..=hi).filter_map(|i| self.set_one(i, true)));
        changes
    }

    /// Sets every row to `on`.
    pub fn set_all(&mut self, on: bool) -> Vec<SelectionChange> {
        (0..self.rows.len())
            .filter_map(|i| self.set_one(i, on))
            .collect()
    }

    /// Inserts a row at `pos` (clamped) and returns where it ended up.
    pub fn insert(&mut self, pos: usize, label: &str) -> usize {
        let pos = pos.min(self.rows.len());
        self.rows.insert(pos, Row::new(label));
        let shift = |i: usize| Some(if i >= pos { i + 1 } else { i });
        remap(&mut self.focus, shift);
        remap(&mut self.anchor, shift);
        self.last_added = Some(pos);
        if self.auto_sort {
            self.resort();
        }
        self.last_added.unwrap_or(pos)
    }

    /// Removes a row.
    pub fn remove(&mut self, i: usize) -> Option<Row> {
        if i >= self.rows.len() {
            return None;
        }
        let row = self.rows.remove(i);
        let shift = |j: usize| match j.cmp(&i) {
            Ordering::Less => Some(j),
            Ordering::Equal => None,
            Ordering::Greater => Some(j - 1),
        };
        remap(&mut self.focus, shift);
        remap(&mut self.anchor, shift);
        remap(&mut self.last_added, shift);
        self.top = self.top.min(self.rows.len().saturating_sub(1));
        Some(row)
    }

    /// Drops every row.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.focus = None;
        self.anchor = None;
        self.last_added = None;
        self.top = 0;
    }

    /// Moves a row. Focus, anchor and the last added row follow the rows
    /// they point at.
    pub fn move_row(&mut self, from: usize, to: usize) {
        if from >= self.rows.len() {
            return;
        }
        let row = self.rows.remove(from);
        let to = to.min(self.rows.len());
        self.rows.insert(to, row);
        let shift = |j: usize| {
            if j == from {
                return Some(to);
            }
            let without = if j > from { j - 1 } else { j };
            Some(if without >= to { without + 1 } else { without })
        };
        remap(&mut self.focus, shift);
        remap(&mut self.anchor, shift);
        remap(&mut self.last_added, shift);
    }

    fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let numeric = self
            .columns
            .get(self.sort_column)
            .is_some_and(|c| c.numeric);
        let (x, y) = (a.cell(self.sort_column), b.cell(self.sort_column));
        let ord = if numeric {
            leading_number(x).total_cmp(&leading_number(y))
        } else {
            x.to_lowercase().cmp(&y.to_lowercase())
        };
        if self.sort_descending { ord.reverse() } else { ord }
    }

    /// Sorts the rows by the sort column. Stable; the cursor follows its
    /// rows.
    pub fn resort(&mut self) {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| self.compare(&self.rows[a], &self.rows[b]));
        let mut new_pos = vec![0; order.len()];
        for (new, &old) in order.iter().enumerate() {
            new_pos[old] = new;
        }
        let mut old_rows: Vec<Option<Row>> = self.rows.drain(..).map(Some).collect();
        self.rows = order
            .iter()
            .filter_map(|&old| old_rows[old].take())
            .collect();
        let moved = |i: usize| new_pos.get(i).copied();
        remap(&mut self.focus, moved);
        remap(&mut self.anchor, moved);
        remap(&mut self.last_added, moved);
    }

    /// Scrolls so `i` is among the `page` visible rows.
    pub fn ensure_visible(&mut self, i: usize, page: usize) {
        let page = page.max(1);
        if i < self.top {
            self.top = i;
        } else if i >= self.top + page {
            self.top = i + 1 - page;
        }
    }

    fn header_height(&self) -> i32 {
        if self.columns.is_empty() { 0 } else { HEADER_HEIGHT }
    }
}

fn to_int(i: usize) -> i32 {
    i32::try_from(i).unwrap_or(i32::MAX)
}

fn int_or_none(i: Option<usize>) -> Value {
    Value::Int(i.map_or(-1, to_int))
}

pub(crate) fn gui_list() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getnumitems" => call(get_num_items),
        "getwantautodeselect" => call(get_want_auto_deselect),
        "setwantautodeselect" => call(set_want_auto_deselect),
        "onsetvisible" => hook(),
        "setautosort" => call(set_auto_sort),
        "next" => call(next),
        "selectcurrent" => call(select_current),
        "selectfirstentry" => call(select_first_entry),
        "previous" => call(previous),
        "pagedown" => call(page_down),
        "pageup" => call(page_up),
        "home" => call(home),
        "end" => call(end),
        "reset" => call(reset),
        "addcolumn" => call(add_column),
        "getnumcolumns" => call(get_num_columns),
        "getcolumnwidth" => call(get_column_width),
        "setcolumnwidth" => call(set_column_width),
        "getcolumnlabel" => call(get_column_label),
        "setcolumnlabel" => call(set_column_label),
        "getcolumnnumeric" => call(get_column_numeric),
        "setcolumndynamic" => call(set_column_dynamic),
        "iscolumndynamic" => call(is_column_dynamic),
        "setminimumsize" => set("minimumSize"),
        "additem" => call(add_item),
        "insertitem" => call(insert_item),
        "getlastaddeditempos" => call(get_last_added_item_pos),
        "setsubitem" => call(set_sub_item),
        "deleteallitems" => call(delete_all_items),
        "deletebypos" => call(delete_by_pos),
        "getitemlabel" => call(get_item_label),
        "setitemlabel" => call(set_item_label),
        "getitemselected" => call(get_item_selected),
        "isitemfocused" => call(is_item_focused),
        "getitemfocused" => call(get_item_focused),
        "setitemfocused" => call(set_item_focused),
        "ensureitemvisible" => call(ensure_item_visible),
        "invalidatecolumns" => forward("invalidateColumns"),
        "scrollabsolute" => call(scroll_absolute),
        "scrollrelative" => call(scroll_relative),
        "scrollleft" => call(scroll_left),
        "scrollright" => call(scroll_right),
        "scrollup" => call(scroll_up),
        "scrolldown" => call(scroll_down),
        "getsubitemtext" => call(get_item_label),
        "getfirstitemselected" => call(get_first_item_selected),
        "getnextitemselected" => call(get_next_item_selected),
        "selectall" => call(select_all),
        "deselectall" => call(deselect_all),
        "invertselection" => call(invert_selection),
        "invalidateitem" => call(invalidate_item),
        "getfirstitemvisible" => call(get_first_item_visible),
        "getlastitemvisible" => call(get_last_item_visible),
        "setfontsize" => call(set_font_size),
        "getfontsize" => call(get_font_size),
        "jumptonext" => call(jump_to_next),
        "scrolltoitem" => call(ensure_item_visible),
        "resort" => call(resort),
        "getsortdirection" => call(get_sort_direction),
        "getsortcolumn" => call(get_sort_column),
        "setsortcolumn" => call(set_sort_column),
        "setsortdirection" => call(set_sort_direction),
        "getitemcount" => call(get_num_items),
        "setselectionstart" => call(set_selection_start),
        "setselectionend" => call(set_selection_end),
        "setselected" => call(set_selected),
        "toggleselection" => call(toggle_selection),
        "getheaderheight" => call(get_header_height),
        "getpreventmultipleselection" => call(get_prevent_multiple_selection),
        "setpreventmultipleselection" => call(set_prevent_multiple_selection),
        "moveitem" => call(move_item),
        "onselectall" => hook(),
        "ondelete" => hook(),
        "ondoubleclick" => hook(),
        "onleftclick" => hook(),
        "onsecondleftclick" => hook(),
        "onrightclick" => hook(),
        "oncolumndblclick" => hook(),
        "oncolumnlabelclick" => hook(),
        "onitemselection" => hook(),
    ]
}

fn table<'a>(call: &'a mut NativeCall<'_>) -> Result<&'a mut TableState, ObjectError> {
    match call.state()? {
        NativeState::Table(state) => Ok(state),
        _ => Err(state_mismatch("GuiList")),
    }
}

fn announce(call: &mut NativeCall<'_>, changes: Vec<SelectionChange>) {
    for (pos, on) in changes {
        call.emit(
            "onItemSelection",
            vec![Value::Int(to_int(pos)), Value::Int(i32::from(on))],
        );
    }
}

/// Rows that fit in the element's height; at least one.
fn page(call: &mut NativeCall<'_>) -> Result<usize, ObjectError> {
    let height = int_property(call, "h");
    let header = table(call)?.header_height();
    Ok(usize::try_from((height - header) / ROW_HEIGHT)
        .unwrap_or(0)
        .max(1))
}

fn get_num_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(to_int(table(call)?.rows.len())))
}

fn get_want_auto_deselect(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(i32::from(table(call)?.auto_deselect)))
}

fn set_want_auto_deselect(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let want = call.boolean(0);
    table(call)?.auto_deselect = want;
    Ok(Value::Void)
}

fn set_auto_sort(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(0);
    let state = table(call)?;
    state.auto_sort = on;
    if on {
        state.resort();
    }
    Ok(Value::Void)
}

// ============================================================================
// Keyboard navigation
// ============================================================================

/// Moves focus to `target` (clamped), selects it alone and scrolls to it.
fn focus_row(call: &mut NativeCall<'_>, target: usize) -> Result<Value, ObjectError> {
    let page = page(call)?;
    let state = table(call)?;
    let Some(last) = state.rows.len().checked_sub(1) else {
        return Ok(Value::Void);
    };
    let target = target.min(last);
    state.focus = Some(target);
    state.anchor = Some(target);
    state.ensure_visible(target, page);
    let changes = state.select_only(target);
    announce(call, changes);
    Ok(Value::Void)
}

fn next(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let target = table(call)?.focus.map_or(0, |f| f + 1);
    focus_row(call, target)
}

fn previous(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let target = table(call)?.focus.map_or(0, |f| f.saturating_sub(1));
    focus_row(call, target)
}

fn page_down(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let page = page(call)?;
    let target = table(call)?.focus.map_or(0, |f| f + page);
    focus_row(call, target)
}

fn page_up(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let page = page(call)?;
    let target = table(call)?.focus.map_or(0, |f| f.saturating_sub(page));
    focus_row(call, target)
}

fn home(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    focus_row(call, 0)
}

fn end(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    focus_row(call, usize::MAX)
}

fn select_current(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    match table(call)?.focus {
        Some(f) => focus_row(call, f),
        None => Ok(Value::Void),
    }
}

fn select_first_entry(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    focus_row(call, 0)
}

/// GuiList.jumpToNext(c) - Focuses the next row whose label starts with
/// the character `c`, wrapping around.
fn jump_to_next(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let Some(wanted) = u32::try_from(call.int(0)).ok().and_then(char::from_u32) else {
        return Ok(Value::Void);
    };
    let wanted = wanted.to_lowercase().to_string();
    let state = table(call)?;
    let n = state.rows.len();
    let start = state.focus.map_or(0, |f| f + 1);
    let found = (0..n).map(|k| (start + k) % n).find(|&i| {
        state.rows[i]
            .cell(0)
            .to_lowercase()
            .starts_with(wanted.as_str())
    });
    match found {
        Some(i) => focus_row(call, i),
        None => Ok(Value::Void),
    }
}

fn reset(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    *table(call)? = TableState::default();
    call.mutate("reset", &[]);
    Ok(Value::Void)
}

// ============================================================================
// Columns
// ============================================================================

fn column_index(call: &mut NativeCall<'_>, i: usize) -> Result<Option<usize>, ObjectError> {
    let pos = call.int(i);
    let count = table(call)?.columns.len();
    Ok(usize::try_from(pos).ok().filter(|&c| c < count))
}

fn add_column(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let column = Column {
        label: call.string(0).to_string(),
        width: call.int(1),
        numeric: call.boolean(2),
        dynamic: false,
    };
    let columns = &mut table(call)?.columns;
    columns.push(column);
    Ok(Value::Int(to_int(columns.len() - 1)))
}

fn get_num_columns(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(to_int(table(call)?.columns.len())))
}

fn get_column_width(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let Some(c) = column_index(call, 0)? else {
        return Ok(Value::Int(0));
    };
    Ok(Value::Int(table(call)?.columns[c].width))
}

fn set_column_width(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let width = call.int(1);
    if let Some(c) = column_index(call, 0)? {
        table(call)?.columns[c].width = width;
    }
    Ok(Value::Void)
}

fn get_column_label(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let Some(c) = column_index(call, 0)? else {
        return Ok(Value::from(""));
    };
    Ok(Value::from(table(call)?.columns[c].label.as_str()))
}

fn set_column_label(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let label = call.string(1).to_string();
    if let Some(c) = column_index(call, 0)? {
        table(call)?.columns[c].label = label;
    }
    Ok(Value::Void)
}

fn get_column_numeric(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let Some(c) = column_index(call, 0)? else {
        return Ok(Value::Int(0));
    };
    Ok(Value::Int(i32::from(table(call)?.columns[c].numeric)))
}

fn set_column_dynamic(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let dynamic = call.boolean(1);
    if let Some(c) = column_index(call, 0)? {
        table(call)?.columns[c].dynamic = dynamic;
    }
    Ok(Value::Void)
}

fn is_column_dynamic(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let Some(c) = column_index(call, 0)? else {
        return Ok(Value::Int(0));
    };
    Ok(Value::Int(i32::from(table(call)?.columns[c].dynamic)))
}

// ============================================================================
// Rows
// ============================================================================

fn add_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let label = call.string(0).to_string();
    let pos = table(call)?.insert(usize::MAX, &label);
    Ok(Value::Int(to_int(pos)))
}

fn insert_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = usize::try_from(call.int(0)).unwrap_or(0);
    let label = call.string(1).to_string();
    let pos = table(call)?.insert(pos, &label);
    Ok(Value::Int(to_int(pos)))
}

fn get_last_added_item_pos(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(int_or_none(table(call)?.last_added))
}

/// GuiList.setSubItem(pos, subpos, text) - Sub-item 0 is the label.
fn set_sub_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (pos, sub) = (call.int(0), call.int(1));
    let text = call.string(2).to_string();
    let state = table(call)?;
    let (Some(i), Ok(sub)) = (state.index(pos), usize::try_from(sub)) else {
        return Ok(Value::Void);
    };
    if sub >= state.columns.len().max(MAX_SUB_ITEMS) {
        return Ok(Value::Void);
    }
    let cells = &mut state.rows[i].cells;
    if cells.len() <= sub {
        cells.resize(sub + 1, String::new());
    }
    cells[sub] = text;
    Ok(Value::Void)
}

fn delete_all_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    table(call)?.clear();
    Ok(Value::Void)
}

fn delete_by_pos(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    let state = table(call)?;
    let removed = state.index(pos).and_then(|i| state.remove(i));
    Ok(Value::Int(i32::from(removed.is_some())))
}

fn get_item_label(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (pos, sub) = (call.int(0), call.int(1));
    Ok(Value::from(table(call)?.cell(pos, sub)))
}

fn set_item_label(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    let text = call.string(1).to_string();
    let state = table(call)?;
    if let Some(i) = state.index(pos) {
        state.rows[i].cells[0] = text;
    }
    Ok(Value::Void)
}

fn move_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (from, to) = (call.int(0), call.int(1));
    let state = table(call)?;
    if let (Some(from), Ok(to)) = (state.index(from), usize::try_from(to)) {
        state.move_row(from, to);
    }
    Ok(Value::Void)
}

fn invalidate_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    if table(call)?.index(pos).is_none() {
        return Ok(Value::Int(0));
    }
    call.mutate("invalidateItem", &[Value::Int(pos)]);
    Ok(Value::Int(1))
}

// ============================================================================
// Focus and selection
// ============================================================================

fn get_item_selected(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    let state = table(call)?;
    let on = state.index(pos).is_some_and(|i| state.rows[i].selected);
    Ok(Value::Int(i32::from(on)))
}

fn is_item_focused(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    let state = table(call)?;
    let focused = state.index(pos).is_some() && state.index(pos) == state.focus;
    Ok(Value::Int(i32::from(focused)))
}

fn get_item_focused(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(int_or_none(table(call)?.focus))
}

fn set_item_focused(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    let state = table(call)?;
    if let Some(i) = state.index(pos) {
        state.focus = Some(i);
    }
    Ok(Value::Void)
}

fn get_first_item_selected(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(int_or_none(table(call)?.selected().next()))
}

fn get_next_item_selected(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let last = call.int(0);
    let state = table(call)?;
    let next = match usize::try_from(last) {
        Ok(last) => state.selected().find(|&i| i > last),
        Err(_) => state.selected().next(),
    };
    Ok(int_or_none(next))
}

/// GuiList.selectAll() - Fires `onItemSelection` per changed row, then
/// `onSelectAll`. Refused under single selection.
fn select_all(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let state = table(call)?;
    if state.single_selection && state.rows.len() > 1 {
        return Ok(Value::Int(0));
    }
    let changes = state.set_all(true);
    announce(call, changes);
    call.emit("onSelectAll", Vec::new());
    Ok(Value::Int(1))
}

fn deselect_all(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let changes = table(call)?.set_all(false);
    announce(call, changes);
    Ok(Value::Int(1))
}

fn invert_selection(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let state = table(call)?;
    if state.single_selection {
        return Ok(Value::Int(0));
    }
    let changes: Vec<SelectionChange> = (0..state.rows.len())
        .filter_map(|i| {
            let on = !state.rows[i].selected;
            state.set_one(i, on)
        })
        .collect();
    announce(call, changes);
    Ok(Value::Int(1))
}

fn set_selection_start(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    let state = table(call)?;
    let Some(i) = state.index(pos) else {
        return Ok(Value::Void);
    };
    state.anchor = Some(i);
    state.focus = Some(i);
    let changes = state.select_only(i);
    announce(call, changes);
    Ok(Value::Void)
}

fn set_selection_end(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    let state = table(call)?;
    let Some(i) = state.index(pos) else {
        return Ok(Value::Void);
    };
    let anchor = state.anchor.unwrap_or(i);
    state.focus = Some(i);
    let changes = state.select_range(anchor, i);
    announce(call, changes);
    Ok(Value::Void)
}

fn set_selected(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    let on = call.boolean(1);
    let state = table(call)?;
    let Some(i) = state.index(pos) else {
        return Ok(Value::Void);
    };
    let changes = state.set_selected(i, on);
    announce(call, changes);
    Ok(Value::Void)
}

fn toggle_selection(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    let set_focus = call.boolean(1);
    let state = table(call)?;
    let Some(i) = state.index(pos) else {
        return Ok(Value::Void);
    };
    if set_focus {
        state.focus = Some(i);
    }
    let on = !state.rows[i].selected;
    let changes = state.set_selected(i, on);
    announce(call, changes);
    Ok(Value::Void)
}

fn get_prevent_multiple_selection(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(i32::from(table(call)?.single_selection)))
}

/// GuiList.setPreventMultipleSelection(on) - Turning it on keeps only the
/// first selected row.
fn set_prevent_multiple_selection(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(0);
    let state = table(call)?;
    state.single_selection = on;
    let first = state.selected().next();
    let changes = match first {
        Some(first) if on => state.select_only(first),
        _ => Vec::new(),
    };
    announce(call, changes);
    Ok(Value::Int(i32::from(on)))
}

// ============================================================================
// Scrolling
// ============================================================================

fn ensure_item_visible(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let pos = call.int(0);
    let page = page(call)?;
    let state = table(call)?;
    if let Some(i) = state.index(pos) {
        state.ensure_visible(i, page);
        let top = to_int(state.top);
        call.mutate("scrollToItem", &[Value::Int(top)]);
    }
    Ok(Value::Void)
}

fn scroll_x(call: &mut NativeCall<'_>, x: i32) -> Result<Value, ObjectError> {
    let x = x.max(0);
    table(call)?.scroll_x = x;
    call.mutate("scrollX", &[Value::Int(x)]);
    Ok(Value::Int(x))
}

fn scroll_absolute(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let x = call.int(0);
    scroll_x(call, x)
}

fn scroll_relative(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let dx = call.int(0);
    let x = table(call)?.scroll_x.saturating_add(dx);
    scroll_x(call, x)
}

fn scroll_left(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let dx = call.int(0).saturating_mul(ROW_HEIGHT);
    let x = table(call)?.scroll_x.saturating_sub(dx);
    scroll_x(call, x).map(|_| Value::Void)
}

fn scroll_right(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let dx = call.int(0).saturating_mul(ROW_HEIGHT);
    let x = table(call)?.scroll_x.saturating_add(dx);
    scroll_x(call, x).map(|_| Value::Void)
}

fn scroll_rows(call: &mut NativeCall<'_>, down: bool) -> Result<Value, ObjectError> {
    let lines = usize::try_from(call.int(0)).unwrap_or(0);
    let state = table(call)?;
    let last = state.rows.len().saturating_sub(1);
    state.top = if down {
        state.top.saturating_add(lines).min(last)
    } else {
        state.top.saturating_sub(lines)
    };
    Ok(Value::Void)
}

fn scroll_up(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    scroll_rows(call, false)
}

fn scroll_down(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    scroll_rows(call, true)
}

fn get_first_item_visible(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let state = table(call)?;
    if state.rows.is_empty() {
        return Ok(Value::Int(-1));
    }
    Ok(Value::Int(to_int(state.top)))
}

fn get_last_item_visible(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let page = page(call)?;
    let state = table(call)?;
    let last = (state.top + page).min(state.rows.len()).checked_sub(1);
    Ok(int_or_none(last))
}

fn get_header_height(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(table(call)?.header_height()))
}

fn set_font_size(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let size = call.int(0);
    if size <= 0 {
        return Ok(Value::Int(0));
    }
    table(call)?.font_size = size;
    call.mutate("fontSize", &[Value::Int(size)]);
    Ok(Value::Int(1))
}

fn get_font_size(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(table(call)?.font_size))
}

// ============================================================================
// Sorting
// ============================================================================

fn resort(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    table(call)?.resort();
    Ok(Value::Void)
}

/// 0 ascending, 1 descending.
fn get_sort_direction(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(i32::from(table(call)?.sort_descending)))
}

fn set_sort_direction(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let descending = call.boolean(0);
    let state = table(call)?;
    state.sort_descending = descending;
    if state.auto_sort {
        state.resort();
    }
    Ok(Value::Void)
}

fn get_sort_column(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(to_int(table(call)?.sort_column)))
}

fn set_sort_column(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let column = usize::try_from(call.int(0)).unwrap_or(0);
    let state = table(call)?;
    state.sort_column = column;
    if state.auto_sort {
        state.resort();
    }
    Ok(Value::Void)
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;
    use crate::runtime::heap::ObjectRef;

    fn list_with(fx: &mut Fixture, labels: &[&str]) -> ObjectRef {
        let list = fx.create("GuiList");
        for label in labels {
            fx.call(list, "addItem", &[Value::from(*label)]);
        }
        list
    }

    fn selections(fx: &mut Fixture) -> Vec<(i32, i32)> {
        std::iter::from_fn(|| fx.model.take_pending())
            .filter(|e| e.name == "onItemSelection")
            .map(|e| (e.args[0].as_i32().unwrap(), e.args[1].as_i32().unwrap()))
            .collect()
    }

    #[test]
    fn test_insert_and_delete_keep_focus_on_its_row() {
        let mut state = TableState::default();
        state.insert(9, "a");
        state.insert(9, "b");
        state.focus = Some(1);
        state.insert(0, "c");
        assert_eq!(state.focus, Some(2));
        state.remove(0);
        assert_eq!(state.focus, Some(1));
        state.remove(1);
        assert_eq!(state.focus, None);
        assert_eq!(state.rows.len(), 1);
    }

    #[test]
    fn test_resort_numeric_descending() {
        let mut state = TableState::default();
        state.columns.push(Column {
            numeric: true,
            ..Column::default()
        });
        for label in ["10", "9", "100"] {
            state.insert(usize::MAX, label);
        }
        state.focus = Some(1);
        state.sort_descending = true;
        state.resort();
        let labels: Vec<&str> = state.rows.iter().map(|r| r.cell(0)).collect();
        assert_eq!(labels, ["100", "10", "9"]);
        assert_eq!(state.focus, Some(2));
    }

    #[test]
    fn test_auto_sort_reports_final_position() {
        let mut fx = Fixture::new();
        let list = list_with(&mut fx, &["beta", "delta"]);
        fx.call(list, "setAutoSort", &[Value::Int(1)]);
        assert_eq!(fx.call(list, "addItem", &[Value::from("alpha")]), Value::Int(0));
        assert_eq!(fx.call(list, "getLastAddedItemPos", &[]), Value::Int(0));
        assert_eq!(
            fx.call(list, "getItemLabel", &[Value::Int(2), Value::Int(0)]),
            Value::from("delta")
        );
    }

    #[test]
    fn test_sub_items() {
        let mut fx = Fixture::new();
        let list = list_with(&mut fx, &["row"]);
        fx.call(list, "setSubItem", &[Value::Int(0), Value::Int(2), Value::from("x")]);
        assert_eq!(
            fx.call(list, "getSubItemText", &[Value::Int(0), Value::Int(2)]),
            Value::from("x")
        );
        assert_eq!(
            fx.call(list, "getSubItemText", &[Value::Int(0), Value::Int(1)]),
            Value::from("")
        );
        assert_eq!(
            fx.call(list, "getItemLabel", &[Value::Int(0), Value::Int(0)]),
            Value::from("row")
        );
    }

    #[test]
    fn test_sub_item_past_limit_is_ignored() {
        let mut fx = Fixture::new();
        let list = list_with(&mut fx, &["row"]);
        let far = Value::Int(20_000_000);
        fx.call(list, "setSubItem", &[Value::Int(0), far.clone(), Value::from("x")]);
        assert_eq!(
            fx.call(list, "getSubItemText", &[Value::Int(0), far]),
            Value::from("")
        );
        let Some(NativeState::Table(state)) = fx.model.instance(list).map(|i| &i.state) else {
            panic!("list has no table state");
        };
        assert_eq!(state.rows[0].cells.len(), 1);
    }

    #[test]
    fn test_move_item_keeps_focus_on_its_row() {
        let mut fx = Fixture::new();
        let list = list_with(&mut fx, &["a", "b", "c", "d"]);
        fx.call(list, "setItemFocused", &[Value::Int(2)]);
        fx.call(list, "moveItem", &[Value::Int(0), Value::Int(3)]);
        assert_eq!(fx.call(list, "getItemFocused", &[]), Value::Int(1));
        assert_eq!(
            fx.call(list, "getItemLabel", &[Value::Int(1), Value::Int(0)]),
            Value::from("c")
        );
    }

    #[test]
    fn test_move_row_remaps_cursor() {
        let mut state = TableState::default();
        for label in ["a", "b", "c", "d"] {
            state.insert(usize::MAX, label);
        }
        state.focus = Some(3);
        state.anchor = Some(0);
        state.last_added = Some(1);
        state.move_row(3, 0);
        let labels: Vec<&str> = state.rows.iter().map(|r| r.cell(0)).collect();
        assert_eq!(labels, ["d", "a", "b", "c"]);
        assert_eq!(state.focus, Some(0));
        assert_eq!(state.anchor, Some(1));
        assert_eq!(state.last_added, Some(2));
    }

    #[test]
    fn test_keyboard_navigation_moves_selection() {
        let mut fx = Fixture::new();
        let list = list_with(&mut fx, &["a", "b", "c"]);
        fx.call(list, "next", &[]);
        fx.call(list, "next", &[]);
        fx.call(list, "end", &[]);
        assert_eq!(fx.call(list, "getItemFocused", &[]), Value::Int(2));
        assert_eq!(selections(&mut fx), [(0, 1), (0, 0), (1, 1), (1, 0), (2, 1)]);
        fx.call(list, "previous", &[]);
        assert_eq!(fx.call(list, "getFirstItemSelected", &[]), Value::Int(1));
    }

    #[test]
    fn test_range_selection() {
        let mut fx = Fixture::new();
        let list = list_with(&mut fx, &["a", "b", "c", "d"]);
        fx.call(list, "setSelectionStart", &[Value::Int(3)]);
        fx.call(list, "setSelectionEnd", &[Value::Int(1)]);
        assert_eq!(fx.call(list, "getFirstItemSelected", &[]), Value::Int(1));
        assert_eq!(fx.call(list, "getNextItemSelected", &[Value::Int(1)]), Value::Int(2));
        assert_eq!(fx.call(list, "getNextItemSelected", &[Value::Int(3)]), Value::Int(-1));
        assert_eq!(selections(&mut fx), [(3, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_single_selection() {
        let mut fx = Fixture::new();
        let list = list_with(&mut fx, &["a", "b", "c"]);
        fx.call(list, "selectAll", &[]);
        fx.call(list, "setPreventMultipleSelection", &[Value::Int(1)]);
        assert_eq!(fx.call(list, "getNextItemSelected", &[Value::Int(0)]), Value::Int(-1));
        assert_eq!(fx.call(list, "selectAll", &[]), Value::Int(0));
        fx.call(list, "setSelected", &[Value::Int(2), Value::Int(1)]);
        assert_eq!(fx.call(list, "getFirstItemSelected", &[]), Value::Int(2));
    }

    #[test]
    fn test_jump_to_next_wraps() {
        let mut fx = Fixture::new();
        let list = list_with(&mut fx, &["Bob", "alice", "bill"]);
        fx.call(list, "jumpToNext", &[Value::Int('b' as i32)]);
        assert_eq!(fx.call(list, "getItemFocused", &[]), Value::Int(0));
        fx.call(list, "jumpToNext", &[Value::Int('b' as i32)]);
        assert_eq!(fx.call(list, "getItemFocused", &[]), Value::Int(2));
        fx.call(list, "jumpToNext", &[Value::Int('B' as i32)]);
        assert_eq!(fx.call(list, "getItemFocused", &[]), Value::Int(0));
    }

    #[test]
    fn test_columns() {
        let mut fx = Fixture::new();
        let list = fx.create("GuiList");
        assert_eq!(fx.call(list, "getHeaderHeight", &[]), Value::Int(0));
        let args = [Value::from("Size"), Value::Int(40), Value::Int(1)];
        assert_eq!(fx.call(list, "addColumn", &args), Value::Int(0));
        assert_eq!(fx.call(list, "getColumnNumeric", &[Value::Int(0)]), Value::Int(1));
        assert_eq!(fx.call(list, "getColumnWidth", &[Value::Int(5)]), Value::Int(0));
        assert_eq!(fx.call(list, "getHeaderHeight", &[]), Value::Int(HEADER_HEIGHT));
    }

    #[test]
    fn test_visible_window() {
        let mut fx = Fixture::new();
        let list = list_with(&mut fx, &["a", "b", "c", "d", "e"]);
        fx.model
            .instance_mut(list)
            .unwrap()
            .set_field("h", Value::Int(2 * ROW_HEIGHT));
        assert_eq!(fx.call(list, "getLastItemVisible", &[]), Value::Int(1));
        fx.call(list, "ensureItemVisible", &[Value::Int(4)]);
        assert_eq!(fx.call(list, "getFirstItemVisible", &[]), Value::Int(3));
        fx.call(list, "scrollUp", &[Value::Int(5)]);
        assert_eq!(fx.call(list, "getFirstItemVisible", &[]), Value::Int(0));
    }
}
