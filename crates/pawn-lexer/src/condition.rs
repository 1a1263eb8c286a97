//! Conditional-compilation nesting tracker and its per-line snapshot log.

/// Nesting levels beyond this bound stop affecting suppression state but
/// still keep the depth counter balanced.
pub const MAX_CONDITIONAL_DEPTH: usize = 32;

/// Per-level branch bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct BranchState {
    /// The branch at this level is currently excluded.
    suppressed: bool,
    /// Some branch at this level has already been entered, so a later
    /// `#elif`/`#else` must not take effect again.
    taken: bool,
}

/// Immutable snapshot of conditional-compilation nesting.
///
/// One snapshot is recorded per line, representing the state as of the
/// *start* of that line; re-lexing from that line with the snapshot must
/// reproduce a full scan byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConditionalState {
    levels: [BranchState; MAX_CONDITIONAL_DEPTH],
    /// Current nesting depth; -1 when no section is open. May run past the
    /// level array so pops stay balanced beyond the bound.
    depth: i32,
}

impl Default for LineConditionalState {
    fn default() -> LineConditionalState {
        LineConditionalState {
            levels: [BranchState::default(); MAX_CONDITIONAL_DEPTH],
            depth: -1,
        }
    }
}

impl LineConditionalState {
    fn valid_level(&self) -> bool {
        self.depth >= 0 && (self.depth as usize) < MAX_CONDITIONAL_DEPTH
    }

    /// Whether any open level up to and including the current one is
    /// suppressed.
    pub fn is_inactive(&self) -> bool {
        self.levels.iter().any(|level| level.suppressed)
    }

    /// Whether the current level already committed to a branch.
    pub fn current_if_taken(&self) -> bool {
        self.valid_level() && self.levels[self.depth as usize].taken
    }

    /// Open a nesting level for `#if`/`#ifdef`, entering the true branch
    /// when `condition` holds.
    pub fn start_section(&mut self, condition: bool) {
        self.depth += 1;
        if self.valid_level() {
            let level = &mut self.levels[self.depth as usize];
            if condition {
                level.suppressed = false;
                level.taken = true;
            } else {
                level.suppressed = true;
                level.taken = false;
            }
        }
    }

    /// Close the current level for `#endif`.
    pub fn end_section(&mut self) {
        if self.valid_level() {
            self.levels[self.depth as usize] = BranchState::default();
        }
        self.depth -= 1;
    }

    /// Flip the current level's suppression for `#else`/`#elif` and mark
    /// the level as having taken a branch.
    pub fn invert_current_level(&mut self) {
        if self.valid_level() {
            let level = &mut self.levels[self.depth as usize];
            level.suppressed = !level.suppressed;
            level.taken = true;
        }
    }
}

/// Per-line snapshots of [`LineConditionalState`].
///
/// Keyed by line index; lines never recorded default to "no nesting".
/// Recording a line discards any snapshots previously stored past it, which
/// is what invalidates stale state when a scan restarts earlier in the
/// document.
#[derive(Debug, Default)]
pub struct ConditionalStateLog {
    lines: Vec<LineConditionalState>,
}

impl ConditionalStateLog {
    pub fn new() -> ConditionalStateLog {
        ConditionalStateLog::default()
    }

    /// The snapshot taken at the start of `line`. Line 0 and unrecorded
    /// lines read as the default state.
    pub fn state_at(&self, line: usize) -> LineConditionalState {
        if line > 0 && line < self.lines.len() {
            self.lines[line]
        } else {
            LineConditionalState::default()
        }
    }

    /// Store the state as of the start of `line`, truncating any snapshots
    /// recorded for later lines.
    pub fn record(&mut self, line: usize, state: LineConditionalState) {
        self.lines.resize(line + 1, LineConditionalState::default());
        self.lines[line] = state;
    }
}
