//=========================================================================
// Listener List
//=========================================================================
//
// Ordered fan-out list used by every completion event in the crate.
//
// Architecture:
//   subscribe ──push()──> VecDeque<(ListenerId, F)>
//                               ↓
//   fire ──pop_front_before(cutoff)──> F (invoked by the owner)
//
// Ids are handed out in strictly increasing order, so comparing an id
// with `next_id()` tells whether a listener was registered before or
// after a given moment.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::fmt;

//=== ListenerId ==========================================================

/// Identity of a registered listener, used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Raw numeric value of the id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

//=== Listeners ===========================================================

/// FIFO list of listeners keyed by [`ListenerId`].
///
/// The list never invokes anything itself. Owners pop entries and call
/// them with no borrow held, which keeps re-entrant registration from
/// inside a callback safe.
pub struct Listeners<F> {
    next_id: u64,
    entries: VecDeque<(ListenerId, F)>,
}

impl<F> Listeners<F> {
    /// Creates an empty listener list.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: VecDeque::new(),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Appends a listener and returns its id.
    pub fn push(&mut self, listener: F) -> ListenerId {
        let id = self.reserve_id();
        self.entries.push_back((id, listener));
        id
    }

    /// Allocates an id without storing anything.
    ///
    /// Used when a listener is invoked immediately instead of queued, so
    /// callers still get an id they can pass to `remove` (a no-op).
    pub fn reserve_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Removes a listener by id. Returns false if it already fired or was
    /// never queued.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        match self.entries.iter().position(|(entry, _)| *entry == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    //--- Dispatch ---------------------------------------------------------

    /// The id the next registration will receive.
    pub fn next_id(&self) -> ListenerId {
        ListenerId(self.next_id)
    }

    /// Pops the oldest listener if it was registered before `cutoff`.
    pub fn pop_front_before(&mut self, cutoff: ListenerId) -> Option<F> {
        match self.entries.front() {
            Some((id, _)) if *id < cutoff => self.entries.pop_front().map(|(_, f)| f),
            _ => None,
        }
    }

    /// Returns true if a listener with this id is still queued.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }

    /// Iterates over queued listeners in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ListenerId, &F)> {
        self.entries.iter().map(|(id, f)| (*id, f))
    }

    //--- Query API --------------------------------------------------------

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every queued listener. Ids keep increasing afterwards.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<F> Default for Listeners<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> fmt::Debug for Listeners<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("next_id", &self.next_id)
            .field("queued", &self.entries.len())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
