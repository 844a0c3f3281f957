//! Thread-local hit-count bookkeeping backing the `sim`-featured macros.

use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct Counts {
    held: u64,
    violated: u64,
}

thread_local! {
    static COUNTS: RefCell<HashMap<&'static str, Counts>> = RefCell::new(HashMap::new());
}

pub fn record(name: &'static str, held: bool) {
    COUNTS.with(|counts| {
        let entry = counts.borrow_mut().entry(name).or_default();
        if held {
            entry.held += 1;
        } else {
            entry.violated += 1;
        }
    });
}

/// Clears the current thread's registry. Call between independent
/// scenario runs so counts don't bleed across iterations.
pub fn reset() {
    COUNTS.with(|counts| counts.borrow_mut().clear());
}

/// A snapshot of one property's hit counts, for a scenario runner to
/// assert coverage against (e.g. "sometimes[handshake_resync] fired at
/// least once across the whole run").
#[derive(Debug, Clone, Copy, Default)]
pub struct Report {
    pub held: u64,
    pub violated: u64,
}

impl Report {
    pub fn was_hit(&self) -> bool {
        self.held > 0 || self.violated > 0
    }
}

pub fn report(name: &str) -> Report {
    COUNTS.with(|counts| {
        counts.borrow().get(name).map_or_else(Report::default, |c| Report { held: c.held, violated: c.violated })
    })
}
