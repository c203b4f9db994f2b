//! Live objects.

use rustc_hash::FxHashMap;

use super::value::Value;
use crate::host::ElementId;
use crate::natives::collections::{MapState, MenuState, RegionState, TimerState};
use crate::natives::controls::DropdownState;
use crate::natives::guilist::TableState;
use crate::natives::layers::AnimationState;
use crate::natives::tree::{TreeItemState, TreeState};
use crate::registry::{ClassId, ClassRegistry};

/// Internal state a native class keeps beyond plain fields.
#[derive(Debug, Clone, Default)]
pub enum NativeState {
    /// Nothing beyond fields.
    #[default]
    None,
    /// `List` items.
    List(Vec<Value>),
    /// `BitList` bits.
    Bits(Vec<bool>),
    /// `Timer` schedule.
    Timer(TimerState),
    /// `PopupMenu` entries.
    Menu(MenuState),
    /// `Region` rectangles.
    Region(RegionState),
    /// `Map` bitmap binding.
    Map(MapState),
    /// `DropDownList` items.
    Dropdown(DropdownState),
    /// `GuiList` rows and columns.
    Table(TableState),
    /// `GuiTree` roots and cursor.
    Tree(TreeState),
    /// `TreeItem` node.
    TreeItem(TreeItemState),
    /// `AnimatedLayer` frame state.
    Animation(AnimationState),
}

impl NativeState {
    /// Initial state for a new instance of `class`.
    pub fn for_class(registry: &ClassRegistry, class: ClassId) -> Self {
        let name = registry.descriptor(class).name;
        let is = |ancestor: &str| registry.is_a(name, ancestor);
        if is("List") {
            NativeState::List(Vec::new())
        } else if is("BitList") {
            NativeState::Bits(Vec::new())
        } else if is("Timer") {
            NativeState::Timer(TimerState::default())
        } else if is("PopupMenu") {
            NativeState::Menu(MenuState::default())
        } else if is("Region") {
            NativeState::Region(RegionState::default())
        } else if is("Map") {
            NativeState::Map(MapState::default())
        } else if is("DropDownList") {
            NativeState::Dropdown(DropdownState::default())
        } else if is("GuiList") {
            NativeState::Table(TableState::default())
        } else if is("GuiTree") {
            NativeState::Tree(TreeState::default())
        } else if is("TreeItem") {
            NativeState::TreeItem(TreeItemState::default())
        } else if is("AnimatedLayer") {
            NativeState::Animation(AnimationState::default())
        } else {
            NativeState::None
        }
    }
}

/// A live object of some runtime class.
#[derive(Debug, Clone)]
pub struct Instance {
    class: ClassId,
    element: Option<ElementId>,
    serial: u64,
    fields: FxHashMap<String, Value>,
    pub(crate) state: NativeState,
}

impl Instance {
    pub(crate) fn new(
        class: ClassId,
        element: Option<ElementId>,
        serial: u64,
        state: NativeState,
    ) -> Self {
        Self {
            class,
            element,
            serial,
            fields: FxHashMap::default(),
            state,
        }
    }

    /// The instance's class.
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Host element this instance mirrors, if any.
    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    /// Creation order within the owning model.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Reads a stored field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Stores a field.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Removes a stored field.
    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// All stored fields.
    pub fn fields(&self) -> &FxHashMap<String, Value> {
        &self.fields
    }

    /// Native state.
    pub fn state(&self) -> &NativeState {
        &self.state
    }
}
