//! The discrete action set submitted to the batch engine.

/// Number of discrete actions.
pub const NUM_ACTIONS: usize = 7;

/// Control-input table: `(dx, dy)` per action index.
const DISCRETE_ACTIONS: [(i32, i32); NUM_ACTIONS] = [
    (0, 0),   // no-op
    (1, 0),   // right
    (-1, 0),  // left
    (0, 1),   // jump
    (1, 1),   // right-jump
    (-1, 1),  // left-jump
    (0, -1),  // down (step down from a crate)
];

/// A validated discrete action.
///
/// Constructed from a raw index by [`Action::from_index`]; an out-of-range
/// index is a caller defect and aborts the process, matching the batch
/// engine's fatal-on-misuse contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Action(usize);

impl Action {
    /// Validate a raw action index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= NUM_ACTIONS`.
    pub fn from_index(index: usize) -> Self {
        assert!(
            index < NUM_ACTIONS,
            "action index {index} out of range (NUM_ACTIONS={NUM_ACTIONS})"
        );
        Self(index)
    }

    /// Horizontal control input in `{-1, 0, +1}`.
    pub fn dx(self) -> i32 {
        DISCRETE_ACTIONS[self.0].0
    }

    /// Vertical control input in `{-1, 0, +1}`.
    pub fn dy(self) -> i32 {
        DISCRETE_ACTIONS[self.0].1
    }

    /// The raw index this action was built from.
    pub fn index(self) -> usize {
        self.0
    }
}
