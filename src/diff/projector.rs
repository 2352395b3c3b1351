//! Projection of per-event latency deltas onto an alignment.
//!
//! Both raw traces are merged with two cursors. Between ops the cursors move
//! in lock-step and pair events as common; each op then consumes exactly one
//! event on the side(s) it names.

use super::schema::{EditKind, EditOp, EditScript};
use crate::model::StateTrace;
use crate::utils::error::DiffError;
use log::debug;

/// How far the lock-step pairing runs before the pending op is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Pair until the first-trace cursor reaches the bound
    UntilFirst(usize),
    /// Pair until the second-trace cursor reaches the bound
    UntilSecond(usize),
}

impl MergeMode {
    /// Mode for a pending op
    pub fn for_op(op: &EditOp) -> Result<Self, DiffError> {
        let missing = |side: &str| {
            DiffError::Alignment(format!("{:?} op without a position in the {} trace", op.kind, side))
        };
        match op.kind {
            EditKind::Delete | EditKind::Common => op
                .position_in_first
                .map(MergeMode::UntilFirst)
                .ok_or_else(|| missing("first")),
            EditKind::Add => op
                .position_in_second
                .map(MergeMode::UntilSecond)
                .ok_or_else(|| missing("second")),
        }
    }

    fn trace(&self) -> &'static str {
        match self {
            MergeMode::UntilFirst(_) => "first",
            MergeMode::UntilSecond(_) => "second",
        }
    }

    fn bound(&self) -> usize {
        match *self {
            MergeMode::UntilFirst(bound) | MergeMode::UntilSecond(bound) => bound,
        }
    }

    fn measured(&self, cursors: &Cursors) -> usize {
        match self {
            MergeMode::UntilFirst(_) => cursors.first,
            MergeMode::UntilSecond(_) => cursors.second,
        }
    }
}

#[derive(Debug, Default)]
struct Cursors {
    first: usize,
    second: usize,
}

/// Annotate `second` with latency deltas against `first`
///
/// Existing annotations on `second` are cleared first. Common pairs get
/// `second - first`, added events get their own execution time and deleted
/// events leave nothing behind.
///
/// # Errors
/// * `DiffError::IdentityMismatch` - A common pair names different functions
/// * `DiffError::CursorOverrun` - The script points behind a cursor or past a trace
/// * `DiffError::Alignment` - An op lacks the position its kind requires
pub fn project_latency(
    first: &StateTrace,
    second: &mut StateTrace,
    script: &EditScript,
) -> Result<(), DiffError> {
    second.clear_deltas();

    let mut cursors = Cursors::default();
    let mut ops = script.ops.iter();

    loop {
        let pending = ops.next();
        let mode = match pending {
            Some(op) => MergeMode::for_op(op)?,
            None => MergeMode::UntilSecond(second.len()),
        };

        while mode.measured(&cursors) < mode.bound() {
            pair_common(first, second, &mut cursors)?;
        }
        if mode.measured(&cursors) > mode.bound() {
            return Err(DiffError::CursorOverrun {
                trace: mode.trace(),
                index: mode.measured(&cursors),
                bound: mode.bound(),
            });
        }

        let Some(op) = pending else {
            break;
        };
        match op.kind {
            EditKind::Common => pair_common(first, second, &mut cursors)?,
            EditKind::Add => {
                let bound = second.events.len();
                let event = second.events.get_mut(cursors.second).ok_or(
                    DiffError::CursorOverrun {
                        trace: "second",
                        index: cursors.second,
                        bound,
                    },
                )?;
                event.latency_delta = Some(event.execution_time);
                cursors.second += 1;
            }
            EditKind::Delete => {
                if cursors.first >= first.len() {
                    return Err(DiffError::CursorOverrun {
                        trace: "first",
                        index: cursors.first,
                        bound: first.len(),
                    });
                }
                cursors.first += 1;
            }
        }
    }

    debug!(
        "Projected {} deltas onto state {} against state {}",
        second.annotated_count(),
        second.id,
        first.id
    );
    Ok(())
}

fn pair_common(
    first: &StateTrace,
    second: &mut StateTrace,
    cursors: &mut Cursors,
) -> Result<(), DiffError> {
    let before = first.events.get(cursors.first).ok_or(DiffError::CursorOverrun {
        trace: "first",
        index: cursors.first,
        bound: first.len(),
    })?;
    let second_len = second.events.len();
    let after = second
        .events
        .get_mut(cursors.second)
        .ok_or(DiffError::CursorOverrun {
            trace: "second",
            index: cursors.second,
            bound: second_len,
        })?;

    if before.identity() != after.identity() {
        return Err(DiffError::IdentityMismatch {
            first_index: cursors.first,
            second_index: cursors.second,
            first_function: before.function,
            second_function: after.function,
        });
    }

    after.latency_delta = Some(after.execution_time - before.execution_time);
    cursors.first += 1;
    cursors.second += 1;
    Ok(())
}
