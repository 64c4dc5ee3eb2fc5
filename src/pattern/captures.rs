//! Values captured from a matched path.

/// The captures produced by a successful match.
///
/// Every capture segment of the template owns one slot, in template order.
/// A slot is empty when its capture sits inside an optional group that did
/// not participate in the match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    slots: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    name: Option<String>,
    value: Option<String>,
}

impl Captures {
    pub(crate) fn push(&mut self, name: Option<String>, value: Option<String>) {
        self.slots.push(Slot { name, value });
    }

    /// Get a named capture.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.slots
            .iter()
            .find(|slot| slot.name.as_deref() == Some(name))
            .and_then(|slot| slot.value.as_deref())
    }

    /// Get a capture by its zero-based position in the template.
    pub fn index(&self, position: usize) -> Option<&str> {
        self.slots.get(position).and_then(|slot| slot.value.as_deref())
    }

    /// Iterate over the captures that matched, as `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.value.as_deref().map(|value| (slot.name.as_deref(), value)))
    }

    /// Number of captures that matched.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value.is_some()).count()
    }

    /// Whether no capture matched.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
