// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `GuiTree` and `TreeItem`.
//!
//! Items are ordinary script instances linked by [`ObjectRef`]s: a tree
//! lists its roots, an item lists its children and remembers its parent and
//! tree. None of these links keep anything alive. Deleting an item leaves a
//! dangling handle behind, which every walk below skips.

use super::gui::int_property;
use super::{MethodEntry, NativeCall, call, forward, hook, methods, state_mismatch};
use crate::error::ObjectError;
use crate::runtime::heap::ObjectRef;
use crate::runtime::instance::NativeState;
use crate::runtime::model::ObjectModel;
use crate::runtime::value::Value;

/// Pixel height of one row.
pub const ROW_HEIGHT: i32 = 16;
/// Horizontal offset per nesting level.
pub const INDENT: i32 = 16;
const DEFAULT_FONT_SIZE: i32 = 14;
/// Deepest parent chain followed before giving up.
const MAX_DEPTH: usize = 1024;

/// Roots and cursor of a `GuiTree`.
#[derive(Debug, Clone)]
pub struct TreeState {
    pub roots: Vec<ObjectRef>,
    pub current: Option<ObjectRef>,
    pub hilited: Option<ObjectRef>,
    pub sorted: bool,
    pub auto_edit: bool,
    pub auto_collapse: bool,
    pub font_size: i32,
    /// Item whose label is being edited.
    pub editing: Option<ObjectRef>,
}

impl Default for TreeState {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            current: None,
            hilited: None,
            sorted: false,
            auto_edit: false,
            auto_collapse: false,
            font_size: DEFAULT_FONT_SIZE,
            editing: None,
        }
    }
}

/// One `TreeItem` node.
#[derive(Debug, Clone, Default)]
pub struct TreeItemState {
    pub label: String,
    pub tree: Option<ObjectRef>,
    pub parent: Option<ObjectRef>,
    pub children: Vec<ObjectRef>,
    pub expanded: bool,
    pub selected: bool,
    pub hilited: bool,
    pub sorted: bool,
    /// Draws an expander even without children.
    pub child_tab: bool,
}

// ============================================================================
// Graph helpers
// ============================================================================

fn item_ref(model: &ObjectModel, r: ObjectRef) -> Option<&TreeItemState> {
    match model.instance(r)?.state() {
        NativeState::TreeItem(state) => Some(state),
        _ => None,
    }
}

fn item_mut(model: &mut ObjectModel, r: ObjectRef) -> Option<&mut TreeItemState> {
    match &mut model.instance_mut(r)?.state {
        NativeState::TreeItem(state) => Some(state),
        _ => None,
    }
}

fn tree_ref(model: &ObjectModel, r: ObjectRef) -> Option<&TreeState> {
    match model.instance(r)?.state() {
        NativeState::Tree(state) => Some(state),
        _ => None,
    }
}

fn tree_mut(model: &mut ObjectModel, r: ObjectRef) -> Option<&mut TreeState> {
    match &mut model.instance_mut(r)?.state {
        NativeState::Tree(state) => Some(state),
        _ => None,
    }
}

fn live(model: &ObjectModel, refs: &[ObjectRef]) -> Vec<ObjectRef> {
    refs.iter().copied().filter(|r| model.is_alive(*r)).collect()
}

fn alive(model: &ObjectModel, r: Option<ObjectRef>) -> Option<ObjectRef> {
    r.filter(|r| model.is_alive(*r))
}

fn roots(model: &ObjectModel, tree: ObjectRef) -> Vec<ObjectRef> {
    tree_ref(model, tree).map_or_else(Vec::new, |t| live(model, &t.roots))
}

fn children(model: &ObjectModel, r: ObjectRef) -> Vec<ObjectRef> {
    item_ref(model, r).map_or_else(Vec::new, |s| live(model, &s.children))
}

/// Children of `parent`, or the roots of `tree` without one.
fn level(model: &ObjectModel, tree: ObjectRef, parent: Option<ObjectRef>) -> Vec<ObjectRef> {
    match parent {
        Some(p) => children(model, p),
        None => roots(model, tree),
    }
}

fn parent_of(model: &ObjectModel, r: ObjectRef) -> Option<ObjectRef> {
    alive(model, item_ref(model, r)?.parent)
}

fn tree_of(model: &ObjectModel, r: ObjectRef) -> Option<ObjectRef> {
    alive(model, item_ref(model, r)?.tree)
}

fn label(model: &ObjectModel, r: ObjectRef) -> &str {
    item_ref(model, r).map_or("", |s| s.label.as_str())
}

fn ancestors(model: &ObjectModel, r: ObjectRef) -> Vec<ObjectRef> {
    let mut chain = Vec::new();
    let mut cur = parent_of(model, r);
    while let Some(p) = cur {
        if chain.len() >= MAX_DEPTH {
            break;
        }
        chain.push(p);
        cur = parent_of(model, p);
    }
    chain
}

fn walk(model: &ObjectModel, items: Vec<ObjectRef>, visible_only: bool, out: &mut Vec<ObjectRef>) {
    for r in items {
        out.push(r);
        let expanded = item_ref(model, r).is_some_and(|s| s.expanded);
        if expanded || !visible_only {
            walk(model, children(model, r), visible_only, out);
        }
    }
}

/// Items on screen, top to bottom: roots, and children of expanded items.
fn visible(model: &ObjectModel, tree: ObjectRef) -> Vec<ObjectRef> {
    let mut out = Vec::new();
    walk(model, roots(model, tree), true, &mut out);
    out
}

/// Every item, depth first.
fn all(model: &ObjectModel, tree: ObjectRef) -> Vec<ObjectRef> {
    let mut out = Vec::new();
    walk(model, roots(model, tree), false, &mut out);
    out
}

/// `r` and all its descendants.
fn subtree(model: &ObjectModel, r: ObjectRef) -> Vec<ObjectRef> {
    let mut out = Vec::new();
    walk(model, vec![r], false, &mut out);
    out
}

fn store_level(model: &mut ObjectModel, tree: ObjectRef, parent: Option<ObjectRef>, list: Vec<ObjectRef>) {
    match parent {
        Some(p) => {
            if let Some(s) = item_mut(model, p) {
                s.children = list;
            }
        }
        None => {
            if let Some(t) = tree_mut(model, tree) {
                t.roots = list;
            }
        }
    }
}

fn sort_level(model: &mut ObjectModel, tree: ObjectRef, parent: Option<ObjectRef>) {
    let mut list = level(model, tree, parent);
    list.sort_by_cached_key(|r| label(model, *r).to_lowercase());
    store_level(model, tree, parent, list);
}

fn sort_all(model: &mut ObjectModel, tree: ObjectRef) {
    sort_level(model, tree, None);
    for r in all(model, tree) {
        sort_level(model, tree, Some(r));
    }
}

/// Unlinks `r` from its parent (or from its tree's roots).
fn detach(model: &mut ObjectModel, r: ObjectRef) {
    let Some(state) = item_ref(model, r) else {
        return;
    };
    let (parent, tree) = (state.parent, state.tree);
    match (parent, tree) {
        (Some(p), _) => {
            if let Some(s) = item_mut(model, p) {
                s.children.retain(|c| *c != r);
            }
        }
        (None, Some(t)) => {
            if let Some(s) = tree_mut(model, t) {
                s.roots.retain(|c| *c != r);
            }
        }
        (None, None) => {}
    }
    if let Some(s) = item_mut(model, r) {
        s.parent = None;
    }
}

/// Links a detached `r` under `parent` (or as a root) of `tree`.
fn attach(
    model: &mut ObjectModel,
    tree: ObjectRef,
    r: ObjectRef,
    parent: Option<ObjectRef>,
    sorted: bool,
) {
    let mut list = level(model, tree, parent);
    list.push(r);
    store_level(model, tree, parent, list);
    if sorted {
        sort_level(model, tree, parent);
    }
    if let Some(s) = item_mut(model, r) {
        s.parent = parent;
    }
    for node in subtree(model, r) {
        if let Some(s) = item_mut(model, node) {
            s.tree = Some(tree);
        }
    }
}

/// Takes `r` and its descendants out of `tree`. Returns false if `r` was
/// not in it.
fn remove(model: &mut ObjectModel, tree: ObjectRef, r: ObjectRef) -> bool {
    if tree_of(model, r) != Some(tree) {
        return false;
    }
    detach(model, r);
    let nodes = subtree(model, r);
    for node in &nodes {
        if let Some(s) = item_mut(model, *node) {
            s.tree = None;
            s.selected = false;
            s.hilited = false;
        }
    }
    if let Some(t) = tree_mut(model, tree) {
        for slot in [&mut t.current, &mut t.hilited, &mut t.editing] {
            if slot.is_some_and(|c| nodes.contains(&c)) {
                *slot = None;
            }
        }
    }
    model.emit(r, "onTreeRemove", Vec::new());
    true
}

/// Expands or collapses one item. Returns whether anything changed.
fn set_expanded(model: &mut ObjectModel, r: ObjectRef, on: bool) -> bool {
    let Some(state) = item_mut(model, r) else {
        return false;
    };
    if state.expanded == on {
        return false;
    }
    state.expanded = on;
    model.emit(r, if on { "onExpand" } else { "onCollapse" }, Vec::new());
    true
}

fn reveal(model: &mut ObjectModel, r: ObjectRef) {
    for p in ancestors(model, r) {
        set_expanded(model, p, true);
    }
}

/// Moves the tree's cursor. Fires `onDeselect`/`onItemDeselected` for the
/// old item, then `onSelect`/`onItemSelected` for the new one.
fn select(model: &mut ObjectModel, tree: ObjectRef, target: Option<ObjectRef>) {
    let Some(state) = tree_ref(model, tree) else {
        return;
    };
    let old = alive(model, state.current);
    let auto_collapse = state.auto_collapse;
    if old == target {
        return;
    }
    if let Some(o) = old {
        if let Some(s) = item_mut(model, o) {
            s.selected = false;
        }
        model.emit(o, "onDeselect", Vec::new());
        model.emit(tree, "onItemDeselected", vec![Value::Object(o)]);
    }
    if let Some(t) = tree_mut(model, tree) {
        t.current = target;
    }
    let Some(n) = target else {
        return;
    };
    if auto_collapse {
        let path = ancestors(model, n);
        for r in all(model, tree) {
            if r != n && !path.contains(&r) {
                set_expanded(model, r, false);
            }
        }
    }
    if let Some(s) = item_mut(model, n) {
        s.selected = true;
    }
    model.emit(n, "onSelect", Vec::new());
    model.emit(tree, "onItemSelected", vec![Value::Object(n)]);
}

fn hilite(model: &mut ObjectModel, r: ObjectRef, on: bool) {
    let tree = tree_of(model, r);
    let old = tree.and_then(|t| tree_ref(model, t)).and_then(|t| t.hilited);
    if on {
        if let Some(o) = old.filter(|o| *o != r) {
            if let Some(s) = item_mut(model, o) {
                s.hilited = false;
            }
        }
    }
    if let Some(s) = item_mut(model, r) {
        s.hilited = on;
    }
    let Some(t) = tree else {
        return;
    };
    let Some(t) = tree_mut(model, t) else {
        return;
    };
    if on {
        t.hilited = Some(r);
    } else if t.hilited == Some(r) {
        t.hilited = None;
    }
}

/// Starts editing a label; fires `onBeginLabelEdit` on the item.
fn begin_edit(model: &mut ObjectModel, r: ObjectRef) {
    if let Some(tree) = tree_of(model, r) {
        if let Some(t) = tree_mut(model, tree) {
            t.editing = Some(r);
        }
    }
    model.emit(r, "onBeginLabelEdit", Vec::new());
}

fn nth(items: &[ObjectRef], n: i32) -> Value {
    usize::try_from(n)
        .ok()
        .and_then(|n| items.get(n).copied())
        .map_or(Value::Null, Value::Object)
}

fn next_after(items: &[ObjectRef], r: ObjectRef) -> Value {
    let pos = items.iter().position(|c| *c == r);
    pos.and_then(|i| items.get(i + 1).copied())
        .map_or(Value::Null, Value::Object)
}

fn count(items: &[ObjectRef]) -> Value {
    Value::Int(i32::try_from(items.len()).unwrap_or(i32::MAX))
}

fn object_or_null(r: Option<ObjectRef>) -> Value {
    r.map_or(Value::Null, Value::Object)
}

// ============================================================================
// GuiTree
// ============================================================================

pub(crate) fn gui_tree() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "onwantautocontextmenu" => hook(),
        "onmousewheelup" => hook(),
        "onmousewheeldown" => hook(),
        "oncontextmenu" => hook(),
        "onchar" => hook(),
        "onitemrecvdrop" => hook(),
        "onlabelchange" => hook(),
        "onitemselected" => hook(),
        "onitemdeselected" => hook(),
        "getnumrootitems" => call(get_num_root_items),
        "enumrootitem" => call(enum_root_item),
        "jumptonext" => call(jump_to_next),
        "ensureitemvisible" => call(ensure_item_visible),
        "getcontentswidth" => call(get_contents_width),
        "getcontentsheight" => call(get_contents_height),
        "addtreeitem" => call(add_tree_item),
        "removetreeitem" => call(remove_tree_item),
        "movetreeitem" => call(move_tree_item),
        "deleteallitems" => call(delete_all_items),
        "expanditem" => call(expand_item),
        "expanditemdeferred" => call(expand_item_deferred),
        "collapseitem" => call(collapse_item),
        "collapseitemdeferred" => call(collapse_item_deferred),
        "selectitem" => call(select_item),
        "selectitemdeferred" => call(select_item),
        "delitemdeferred" => call(del_item),
        "hiliteitem" => call(hilite_item),
        "unhiliteitem" => call(unhilite_item),
        "getcuritem" => call(get_cur_item),
        "hittest" => call(item_from_point),
        "edititemlabel" => call(edit_item_label),
        "canceleditlabel" => call(cancel_edit_label),
        "setautoedit" => call(set_auto_edit),
        "getautoedit" => call(get_auto_edit),
        "getbylabel" => call(get_by_label),
        "setsorted" => call(set_sorted),
        "getsorted" => call(get_sorted),
        "sorttreeitems" => call(sort_tree_items),
        "getsibling" => call(get_sibling),
        "setautocollapse" => call(set_auto_collapse),
        "setfontsize" => call(set_font_size),
        "getfontsize" => call(get_font_size),
        "getnumvisiblechilditems" => call(get_num_visible_child_items),
        "getnumvisibleitems" => call(get_num_visible_items),
        "enumvisibleitems" => call(enum_visible_items),
        "enumvisiblechilditems" => call(enum_visible_child_items),
        "enumallitems" => call(enum_all_items),
        "getitemrectx" => call(get_item_rect_x),
        "getitemrecty" => call(get_item_rect_y),
        "getitemrectw" => call(get_item_rect_w),
        "getitemrecth" => call(get_item_rect_h),
        "getitemfrompoint" => call(item_from_point),
    ]
}

fn tree<'a>(call: &'a mut NativeCall<'_>) -> Result<&'a mut TreeState, ObjectError> {
    match call.state()? {
        NativeState::Tree(state) => Ok(state),
        _ => Err(state_mismatch("GuiTree")),
    }
}

/// A live `TreeItem` argument.
fn item_arg(call: &NativeCall<'_>, i: usize) -> Option<ObjectRef> {
    call.object(i)
        .filter(|r| item_ref(call.model_ref(), *r).is_some())
}

/// A live `TreeItem` argument that belongs to the receiving tree.
fn own_item_arg(call: &NativeCall<'_>, i: usize) -> Option<ObjectRef> {
    let this = call.this();
    item_arg(call, i).filter(|r| tree_of(call.model_ref(), *r) == Some(this))
}

fn get_num_root_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(count(&roots(call.model_ref(), call.this())))
}

fn enum_root_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(nth(&roots(call.model_ref(), call.this()), call.int(0)))
}

/// GuiTree.jumpToNext(c) - Selects the next visible item whose label
/// starts with the character `c`, wrapping around.
fn jump_to_next(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let Some(wanted) = u32::try_from(call.int(0)).ok().and_then(char::from_u32) else {
        return Ok(Value::Void);
    };
    let wanted = wanted.to_lowercase().to_string();
    let this = call.this();
    let current = tree(call)?.current;
    let model = call.model();
    let items = visible(model, this);
    let start = current
        .and_then(|c| items.iter().position(|r| *r == c))
        .map_or(0, |i| i + 1);
    let n = items.len();
    let found = (0..n)
        .map(|k| items[(start + k) % n])
        .find(|r| label(model, *r).to_lowercase().starts_with(wanted.as_str()));
    if let Some(r) = found {
        select(model, this, Some(r));
    }
    Ok(Value::Void)
}

fn ensure_item_visible(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if let Some(r) = own_item_arg(call, 0) {
        reveal(call.model(), r);
        call.mutate("ensureItemVisible", &[Value::Object(r)]);
    }
    Ok(Value::Void)
}

/// GuiTree.getContentsWidth() - As the host measures it, else the
/// element's own width.
fn get_contents_width(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if let Some(w) = call.query("getContentsWidth", &[]).and_then(|v| v.as_i32()) {
        return Ok(Value::Int(w));
    }
    Ok(Value::Int(int_property(call, "w")))
}

fn get_contents_height(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let rows = visible(call.model_ref(), call.this()).len();
    let rows = i32::try_from(rows).unwrap_or(i32::MAX);
    Ok(Value::Int(rows.saturating_mul(ROW_HEIGHT)))
}

/// GuiTree.addTreeItem(item, parent, sorted, haschildtab) - Links `item`
/// (moving it out of wherever it was) and fires `onTreeAdd` on it. Returns
/// the item, or null when `parent` is not in this tree or lies under
/// `item`.
fn add_tree_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    let Some(item) = item_arg(call, 0) else {
        return Ok(Value::Null);
    };
    let parent = own_item_arg(call, 1);
    if call.object(1).is_some() && parent.is_none() {
        return Ok(Value::Null);
    }
    let sorted = call.boolean(2);
    let child_tab = call.boolean(3);
    let tree_sorted = tree(call)?.sorted;
    let model = call.model();
    if let Some(p) = parent {
        if p == item || ancestors(model, p).contains(&item) {
            return Ok(Value::Null);
        }
    }
    if let Some(old) = tree_of(model, item) {
        remove(model, old, item);
    } else {
        detach(model, item);
    }
    attach(model, this, item, parent, sorted || tree_sorted);
    if let Some(s) = item_mut(model, item) {
        s.child_tab = child_tab;
    }
    model.emit(item, "onTreeAdd", Vec::new());
    Ok(Value::Object(item))
}

fn remove_tree_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    let removed = match item_arg(call, 0) {
        Some(r) => remove(call.model(), this, r),
        None => false,
    };
    Ok(Value::Int(i32::from(removed)))
}

/// GuiTree.moveTreeItem(item, newparent) - Re-links without add or remove
/// events. A null parent makes the item a root.
fn move_tree_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    let Some(item) = own_item_arg(call, 0) else {
        return Ok(Value::Void);
    };
    let parent = own_item_arg(call, 1);
    let sorted = tree(call)?.sorted;
    let model = call.model();
    if let Some(p) = parent {
        if p == item || ancestors(model, p).contains(&item) {
            return Ok(Value::Void);
        }
    }
    detach(model, item);
    attach(model, this, item, parent, sorted);
    Ok(Value::Void)
}

/// GuiTree.deleteAllItems() - Deletes every item instance.
fn delete_all_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let items = all(call.model_ref(), call.this());
    for r in items {
        call.destroy(r);
    }
    let state = tree(call)?;
    state.roots.clear();
    state.current = None;
    state.hilited = None;
    state.editing = None;
    Ok(Value::Void)
}

fn del_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    let Some(item) = own_item_arg(call, 0) else {
        return Ok(Value::Void);
    };
    let nodes = subtree(call.model_ref(), item);
    remove(call.model(), this, item);
    for r in nodes {
        call.destroy(r);
    }
    Ok(Value::Void)
}

fn expand_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let changed = match own_item_arg(call, 0) {
        Some(r) => set_expanded(call.model(), r, true),
        None => false,
    };
    Ok(Value::Int(i32::from(changed)))
}

fn expand_item_deferred(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    expand_item(call).map(|_| Value::Void)
}

fn collapse_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let changed = match own_item_arg(call, 0) {
        Some(r) => set_expanded(call.model(), r, false),
        None => false,
    };
    Ok(Value::Int(i32::from(changed)))
}

fn collapse_item_deferred(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    collapse_item(call).map(|_| Value::Void)
}

/// GuiTree.selectItem(item) - A null item clears the selection.
fn select_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    let target = own_item_arg(call, 0);
    if call.object(0).is_some() && target.is_none() {
        return Ok(Value::Void);
    }
    select(call.model(), this, target);
    Ok(Value::Void)
}

fn hilite_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if let Some(r) = own_item_arg(call, 0) {
        hilite(call.model(), r, true);
    }
    Ok(Value::Void)
}

fn unhilite_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if let Some(r) = own_item_arg(call, 0) {
        hilite(call.model(), r, false);
    }
    Ok(Value::Void)
}

fn get_cur_item(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let current = tree(call)?.current;
    Ok(object_or_null(alive(call.model_ref(), current)))
}

/// GuiTree.hitTest(x, y) - The visible row under `y`; `x` only has to be
/// inside the element.
fn item_from_point(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let (x, y) = (call.int(0), call.int(1));
    if x < 0 || y < 0 {
        return Ok(Value::Null);
    }
    let items = visible(call.model_ref(), call.this());
    Ok(nth(&items, y / ROW_HEIGHT))
}

fn edit_item_label(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    if let Some(r) = own_item_arg(call, 0) {
        begin_edit(call.model(), r);
    }
    Ok(Value::Void)
}

fn cancel_edit_label(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let destroy = call.boolean(0);
    tree(call)?.editing = None;
    call.mutate("cancelEditLabel", &[Value::Int(i32::from(destroy))]);
    Ok(Value::Void)
}

fn set_auto_edit(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(0);
    tree(call)?.auto_edit = on;
    Ok(Value::Void)
}

fn get_auto_edit(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(i32::from(tree(call)?.auto_edit)))
}

/// GuiTree.getByLabel(item, name) - First child of `item` (or root, when
/// null) with exactly that label.
fn get_by_label(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let parent = own_item_arg(call, 0);
    let name = call.string(1);
    let model = call.model_ref();
    let found = level(model, call.this(), parent)
        .into_iter()
        .find(|r| label(model, *r) == name);
    Ok(object_or_null(found))
}

/// GuiTree.setSorted(on) - Sorts every level now and keeps later
/// additions sorted.
fn set_sorted(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(0);
    tree(call)?.sorted = on;
    if on {
        let this = call.this();
        sort_all(call.model(), this);
    }
    Ok(Value::Void)
}

fn get_sorted(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(i32::from(tree(call)?.sorted)))
}

fn sort_tree_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    sort_all(call.model(), this);
    Ok(Value::Void)
}

fn get_sibling(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let Some(item) = own_item_arg(call, 0) else {
        return Ok(Value::Null);
    };
    let model = call.model_ref();
    let siblings = level(model, call.this(), parent_of(model, item));
    Ok(next_after(&siblings, item))
}

fn set_auto_collapse(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(0);
    tree(call)?.auto_collapse = on;
    Ok(Value::Void)
}

fn set_font_size(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let size = call.int(0);
    if size <= 0 {
        return Ok(Value::Int(0));
    }
    tree(call)?.font_size = size;
    call.mutate("fontSize", &[Value::Int(size)]);
    Ok(Value::Int(1))
}

fn get_font_size(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(tree(call)?.font_size))
}

/// Visible descendants of `r`: nothing when it is collapsed.
fn visible_children(model: &ObjectModel, r: ObjectRef) -> Vec<ObjectRef> {
    if !item_ref(model, r).is_some_and(|s| s.expanded) {
        return Vec::new();
    }
    let mut out = Vec::new();
    walk(model, children(model, r), true, &mut out);
    out
}

fn get_num_visible_child_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let items = match own_item_arg(call, 0) {
        Some(r) => visible_children(call.model_ref(), r),
        None => Vec::new(),
    };
    Ok(count(&items))
}

fn get_num_visible_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(count(&visible(call.model_ref(), call.this())))
}

fn enum_visible_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(nth(&visible(call.model_ref(), call.this()), call.int(0)))
}

fn enum_visible_child_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let items = match own_item_arg(call, 0) {
        Some(r) => visible_children(call.model_ref(), r),
        None => Vec::new(),
    };
    Ok(nth(&items, call.int(1)))
}

fn enum_all_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(nth(&all(call.model_ref(), call.this()), call.int(0)))
}

/// Row and depth of a visible item.
fn item_slot(call: &NativeCall<'_>) -> Option<(i32, i32)> {
    let item = own_item_arg(call, 0)?;
    let model = call.model_ref();
    let row = visible(model, call.this()).iter().position(|r| *r == item)?;
    let depth = ancestors(model, item).len();
    Some((
        i32::try_from(row).ok()?,
        i32::try_from(depth).ok()?,
    ))
}

fn get_item_rect_x(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(item_slot(call).map_or(0, |(_, depth)| depth * INDENT)))
}

fn get_item_rect_y(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(item_slot(call).map_or(0, |(row, _)| row * ROW_HEIGHT)))
}

fn get_item_rect_w(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let Some((_, depth)) = item_slot(call) else {
        return Ok(Value::Int(0));
    };
    let width = int_property(call, "w");
    Ok(Value::Int((width - depth * INDENT).max(0)))
}

fn get_item_rect_h(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Int(if item_slot(call).is_some() { ROW_HEIGHT } else { 0 }))
}

// ============================================================================
// TreeItem
// ============================================================================

pub(crate) fn tree_item() -> Vec<(&'static str, MethodEntry)> {
    methods![
        "getnumchildren" => call(get_num_children),
        "setlabel" => call(set_label),
        "getlabel" => call(get_label),
        "ensurevisible" => call(ensure_visible),
        "getnthchild" => call(get_nth_child),
        "getchild" => call(get_child),
        "getchildsibling" => call(get_child_sibling),
        "getsibling" => call(get_item_sibling),
        "getparent" => call(get_parent),
        "editlabel" => call(edit_label),
        "hassubitems" => call(has_sub_items),
        "setsorted" => call(set_item_sorted),
        "setchildtab" => call(set_child_tab),
        "issorted" => call(is_sorted),
        "iscollapsed" => call(is_collapsed),
        "isexpanded" => call(is_expanded),
        "invalidate" => forward("invalidate"),
        "isselected" => call(is_selected),
        "ishilited" => call(is_hilited),
        "sethilited" => call(set_hilited),
        "collapse" => call(collapse),
        "expand" => call(expand),
        "gettree" => call(get_tree),
        "ontreeadd" => hook(),
        "ontreeremove" => hook(),
        "onselect" => hook(),
        "ondeselect" => hook(),
        "onleftdoubleclick" => hook(),
        "onrightdoubleclick" => hook(),
        "onchar" => hook(),
        "onexpand" => hook(),
        "oncollapse" => hook(),
        "onbeginlabeledit" => hook(),
        "onendlabeledit" => hook(),
        "oncontextmenu" => hook(),
    ]
}

fn this_item<'a>(call: &'a mut NativeCall<'_>) -> Result<&'a mut TreeItemState, ObjectError> {
    match call.state()? {
        NativeState::TreeItem(state) => Ok(state),
        _ => Err(state_mismatch("TreeItem")),
    }
}

fn own_children(call: &NativeCall<'_>) -> Vec<ObjectRef> {
    children(call.model_ref(), call.this())
}

fn get_num_children(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(count(&own_children(call)))
}

/// TreeItem.setLabel(label) - Fires the tree's `onLabelChange` when the
/// text changes.
fn set_label(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let text = call.string(0).to_string();
    let state = this_item(call)?;
    if state.label == text {
        return Ok(Value::Void);
    }
    state.label = text;
    let this = call.this();
    if let Some(tree) = tree_of(call.model_ref(), this) {
        call.emit_to(tree, "onLabelChange", vec![Value::Object(this)]);
    }
    Ok(Value::Void)
}

fn get_label(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::from(this_item(call)?.label.as_str()))
}

fn ensure_visible(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    reveal(call.model(), this);
    Ok(Value::Void)
}

fn get_nth_child(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(nth(&own_children(call), call.int(0)))
}

fn get_child(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(nth(&own_children(call), 0))
}

fn get_child_sibling(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let Some(child) = item_arg(call, 0) else {
        return Ok(Value::Null);
    };
    Ok(next_after(&own_children(call), child))
}

fn get_item_sibling(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    let model = call.model_ref();
    let Some(tree) = tree_of(model, this) else {
        return Ok(Value::Null);
    };
    let siblings = level(model, tree, parent_of(model, this));
    Ok(next_after(&siblings, this))
}

fn get_parent(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(object_or_null(parent_of(call.model_ref(), call.this())))
}

fn edit_label(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    begin_edit(call.model(), this);
    Ok(Value::Void)
}

/// TreeItem.hasSubItems() - Children, or a child tab standing in for
/// children not loaded yet.
fn has_sub_items(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let has_children = !own_children(call).is_empty();
    Ok(Value::Boolean(has_children || this_item(call)?.child_tab))
}

fn set_item_sorted(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(0);
    this_item(call)?.sorted = on;
    let this = call.this();
    let model = call.model();
    if let Some(tree) = tree_of(model, this).filter(|_| on) {
        sort_level(model, tree, Some(this));
    }
    Ok(Value::Void)
}

fn set_child_tab(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(0);
    this_item(call)?.child_tab = on;
    Ok(Value::Void)
}

fn is_sorted(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(this_item(call)?.sorted))
}

fn is_collapsed(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(!this_item(call)?.expanded))
}

fn is_expanded(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(this_item(call)?.expanded))
}

fn is_selected(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(this_item(call)?.selected))
}

fn is_hilited(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(Value::Boolean(this_item(call)?.hilited))
}

fn set_hilited(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let on = call.boolean(0);
    let this = call.this();
    hilite(call.model(), this, on);
    Ok(Value::Void)
}

fn collapse(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    Ok(Value::Int(i32::from(set_expanded(call.model(), this, false))))
}

fn expand(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    let this = call.this();
    Ok(Value::Int(i32::from(set_expanded(call.model(), this, true))))
}

fn get_tree(call: &mut NativeCall<'_>) -> Result<Value, ObjectError> {
    Ok(object_or_null(tree_of(call.model_ref(), call.this())))
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;

    fn item(fx: &mut Fixture, text: &str) -> ObjectRef {
        let r = fx.create("TreeItem");
        fx.call(r, "setLabel", &[Value::from(text)]);
        r
    }

    fn add(fx: &mut Fixture, tree: ObjectRef, r: ObjectRef, parent: Option<ObjectRef>) -> Value {
        let parent = parent.map_or(Value::Null, Value::Object);
        fx.call(
            tree,
            "addTreeItem",
            &[Value::Object(r), parent, Value::Int(0), Value::Int(0)],
        )
    }

    fn names(fx: &mut Fixture) -> Vec<String> {
        fx.events().into_iter().map(|(_, n)| n).collect()
    }

    /// root ─┬─ a ── a1
    ///       └─ b
    fn sample(fx: &mut Fixture) -> (ObjectRef, [ObjectRef; 4]) {
        let tree = fx.create("GuiTree");
        let root = item(fx, "root");
        let a = item(fx, "a");
        let a1 = item(fx, "a1");
        let b = item(fx, "b");
        add(fx, tree, root, None);
        add(fx, tree, a, Some(root));
        add(fx, tree, a1, Some(a));
        add(fx, tree, b, Some(root));
        fx.events();
        (tree, [root, a, a1, b])
    }

    #[test]
    fn test_links() {
        let mut fx = Fixture::new();
        let (tree, [root, a, a1, b]) = sample(&mut fx);
        assert_eq!(fx.call(tree, "getNumRootItems", &[]), Value::Int(1));
        assert_eq!(fx.call(root, "getNumChildren", &[]), Value::Int(2));
        assert_eq!(fx.call(a, "getSibling", &[]), Value::Object(b));
        assert_eq!(fx.call(b, "getSibling", &[]), Value::Null);
        assert_eq!(fx.call(a1, "getParent", &[]), Value::Object(a));
        assert_eq!(fx.call(a1, "getTree", &[]), Value::Object(tree));
        assert_eq!(fx.call(tree, "enumAllItems", &[Value::Int(3)]), Value::Object(b));
    }

    #[test]
    fn test_add_fires_on_tree_add() {
        let mut fx = Fixture::new();
        let tree = fx.create("GuiTree");
        let r = item(&mut fx, "x");
        assert_eq!(add(&mut fx, tree, r, None), Value::Object(r));
        assert_eq!(fx.events(), [(r, "onTreeAdd".to_string())]);
    }

    #[test]
    fn test_cycles_are_refused() {
        let mut fx = Fixture::new();
        let (tree, [root, _, a1, _]) = sample(&mut fx);
        assert_eq!(add(&mut fx, tree, root, Some(a1)), Value::Null);
        let args = [Value::Object(root), Value::Object(a1)];
        fx.call(tree, "moveTreeItem", &args);
        assert_eq!(fx.call(root, "getParent", &[]), Value::Null);
    }

    #[test]
    fn test_visibility_follows_expansion() {
        let mut fx = Fixture::new();
        let (tree, [root, a, a1, _]) = sample(&mut fx);
        assert_eq!(fx.call(tree, "getNumVisibleItems", &[]), Value::Int(1));
        fx.call(a1, "ensureVisible", &[]);
        assert_eq!(fx.call(tree, "getNumVisibleItems", &[]), Value::Int(4));
        assert_eq!(names(&mut fx), ["onExpand", "onExpand"]);
        assert_eq!(fx.call(tree, "enumVisibleItems", &[Value::Int(2)]), Value::Object(a1));
        assert_eq!(
            fx.call(tree, "getNumVisibleChildItems", &[Value::Object(root)]),
            Value::Int(3)
        );
        assert_eq!(fx.call(a, "collapse", &[]), Value::Int(1));
        assert_eq!(fx.call(a, "collapse", &[]), Value::Int(0));
        assert_eq!(fx.call(tree, "getNumVisibleItems", &[]), Value::Int(3));
    }

    #[test]
    fn test_selection_events() {
        let mut fx = Fixture::new();
        let (tree, [root, a, _, _]) = sample(&mut fx);
        fx.call(tree, "selectItem", &[Value::Object(root)]);
        fx.call(tree, "selectItem", &[Value::Object(root)]);
        fx.call(tree, "selectItem", &[Value::Object(a)]);
        assert_eq!(
            names(&mut fx),
            ["onSelect", "onItemSelected", "onDeselect", "onItemDeselected", "onSelect", "onItemSelected"]
        );
        assert_eq!(fx.call(tree, "getCurItem", &[]), Value::Object(a));
        assert_eq!(fx.call(root, "isSelected", &[]), Value::Boolean(false));
    }

    #[test]
    fn test_remove_clears_cursor() {
        let mut fx = Fixture::new();
        let (tree, [root, a, a1, _]) = sample(&mut fx);
        fx.call(tree, "selectItem", &[Value::Object(a1)]);
        assert_eq!(fx.call(tree, "removeTreeItem", &[Value::Object(a)]), Value::Int(1));
        assert_eq!(fx.call(tree, "getCurItem", &[]), Value::Null);
        assert_eq!(fx.call(a1, "getTree", &[]), Value::Null);
        assert_eq!(fx.call(root, "getNumChildren", &[]), Value::Int(1));
        assert_eq!(fx.call(tree, "removeTreeItem", &[Value::Object(a)]), Value::Int(0));
    }

    #[test]
    fn test_deleted_items_are_skipped() {
        let mut fx = Fixture::new();
        let (tree, [root, a, _, b]) = sample(&mut fx);
        fx.model.destroy(a);
        assert_eq!(fx.call(root, "getChild", &[]), Value::Object(b));
        fx.call(tree, "delItemDeferred", &[Value::Object(root)]);
        assert!(!fx.model.is_alive(b));
        assert_eq!(fx.call(tree, "getNumRootItems", &[]), Value::Int(0));
    }

    #[test]
    fn test_sorting_and_lookup() {
        let mut fx = Fixture::new();
        let tree = fx.create("GuiTree");
        for text in ["pear", "Apple", "fig"] {
            let r = item(&mut fx, text);
            add(&mut fx, tree, r, None);
        }
        fx.call(tree, "setSorted", &[Value::Int(1)]);
        let first = fx.call(tree, "enumRootItem", &[Value::Int(0)]).as_object().unwrap();
        assert_eq!(fx.call(first, "getLabel", &[]), Value::from("Apple"));
        let args = [Value::Null, Value::from("fig")];
        let fig = fx.call(tree, "getByLabel", &args).as_object().unwrap();
        let pear = fx.call(tree, "getSibling", &[Value::Object(fig)]).as_object().unwrap();
        assert_eq!(fx.call(pear, "getLabel", &[]), Value::from("pear"));
    }

    #[test]
    fn test_label_change_and_hilite() {
        let mut fx = Fixture::new();
        let (tree, [root, a, _, _]) = sample(&mut fx);
        fx.call(a, "setLabel", &[Value::from("a")]);
        fx.call(a, "setLabel", &[Value::from("A")]);
        assert_eq!(fx.events(), [(tree, "onLabelChange".to_string())]);
        fx.call(tree, "hiliteItem", &[Value::Object(root)]);
        fx.call(a, "setHilited", &[Value::Int(1)]);
        assert_eq!(fx.call(root, "isHilited", &[]), Value::Boolean(false));
        assert_eq!(fx.call(a, "isHilited", &[]), Value::Boolean(true));
    }

    #[test]
    fn test_item_rect() {
        let mut fx = Fixture::new();
        let (tree, [_, a, a1, _]) = sample(&mut fx);
        fx.call(a1, "ensureVisible", &[]);
        assert_eq!(fx.call(tree, "getItemRectX", &[Value::Object(a1)]), Value::Int(2 * INDENT));
        assert_eq!(fx.call(tree, "getItemRectY", &[Value::Object(a)]), Value::Int(ROW_HEIGHT));
        assert_eq!(
            fx.call(tree, "hitTest", &[Value::Int(3), Value::Int(2 * ROW_HEIGHT + 1)]),
            Value::Object(a1)
        );
    }
}
