use std::any::TypeId;
use std::sync::Arc;

use bevy::prelude::*;

/// Generation of the value bound to an editor. Every `set_root` starts a new one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(pub u64);

/// Identifies an object inside the bound root by its reflect path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId {
    pub root: RootId,
    pub path: String,
}

/// A readable property of some owner type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub owner_type: TypeId,
    pub name: String,
    pub declared: TypeId,
    pub declared_path: &'static str,
    pub writable: bool,
}

/// Which row of a property a token stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowSlot {
    /// The property itself.
    Property,
    /// Element `i` of a list-valued property.
    Element(usize),
    /// The trailing row used to append to a list.
    Inserter,
}

/// Concrete type of a list element. `variant` is the active variant of an enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RuntimeType {
    pub type_id: TypeId,
    pub variant: Option<usize>,
}

/// How a row is rendered and edited, decided once when its token is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowKind {
    Basic,
    NullReference,
    ListInserter,
    ListElement,
    CustomEdit,
    CustomEditorBound,
}

/// Marks a field as readable but not writable: `#[reflect(@ReadOnly)]`.
#[derive(Reflect, Clone, Copy, Debug, Default)]
pub struct ReadOnly;

/// Value identity of one row of the tree.
///
/// Tokens are rebuilt from scratch on every resynchronization and matched
/// against the live rows by value, so a row survives as long as a token with
/// the same fields keeps being produced.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyToken {
    pub property: PropertyKey,
    pub owner: ObjectId,
    pub slot: RowSlot,
    pub parent: Option<Arc<PropertyToken>>,
    pub element_type: Option<RuntimeType>,
    pub kind: RowKind,
    value_path: String,
}

impl PropertyToken {
    pub(crate) fn property(
        property: PropertyKey,
        owner: ObjectId,
        parent: Option<Arc<PropertyToken>>,
        kind: RowKind,
        value_path: String,
    ) -> Self {
        Self {
            property,
            owner,
            slot: RowSlot::Property,
            parent,
            element_type: None,
            kind,
            value_path,
        }
    }

    /// Token for element `index` of the list at `list_path`, which this token denotes.
    pub(crate) fn element(
        parent: &Arc<Self>,
        list_path: &str,
        index: usize,
        element_type: RuntimeType,
    ) -> Self {
        Self {
            property: parent.property.clone(),
            owner: parent.owner.clone(),
            slot: RowSlot::Element(index),
            parent: Some(parent.clone()),
            element_type: Some(element_type),
            kind: RowKind::ListElement,
            value_path: format!("{list_path}[{index}]"),
        }
    }

    /// The inserter row closing the list at `list_path`.
    pub(crate) fn inserter(parent: &Arc<Self>, list_path: &str) -> Self {
        Self {
            property: parent.property.clone(),
            owner: parent.owner.clone(),
            slot: RowSlot::Inserter,
            parent: Some(parent.clone()),
            element_type: None,
            kind: RowKind::ListInserter,
            value_path: list_path.to_string(),
        }
    }

    /// Reflect path of the value shown by the row, relative to the bound root.
    ///
    /// Inserter rows point at their list.
    pub fn value_path(&self) -> &str {
        &self.value_path
    }

    pub fn element_index(&self) -> Option<usize> {
        match self.slot {
            RowSlot::Element(index) => Some(index),
            _ => None,
        }
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut parent = self.parent.as_deref();
        while let Some(token) = parent {
            depth += 1;
            parent = token.parent.as_deref();
        }
        depth
    }
}

/// Appends a named field access to a reflect path.
pub(crate) fn field_path(owner: &str, name: &str) -> String {
    format!("{owner}.{name}")
}
