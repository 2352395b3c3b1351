//! Sequence alignment of two traces.
//!
//! Events are reduced to their function address and aligned with the
//! linear-space variant of Myers' O(ND) shortest edit script. The edit script
//! is grouped into hunks (a common run followed by changes) and positions are
//! recovered by walking the hunks in order.

use super::schema::{EditKind, EditOp, EditScript, Hunk};
use crate::model::StateTrace;
use crate::utils::error::DiffError;
use log::{debug, warn};
use std::ops::{Index, IndexMut};

/// One element of the shortest edit script, with absolute indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SesOp {
    Common(usize, usize),
    Delete(usize),
    Add(usize),
}

/// Align two traces by function identity
///
/// # Errors
/// * `DiffError::Alignment` - The edit script is internally inconsistent
pub fn align(first: &StateTrace, second: &StateTrace) -> Result<EditScript, DiffError> {
    align_keys(&first.identity_keys(), &second.identity_keys())
}

/// Align two identity-key sequences
pub fn align_keys(first: &[u64], second: &[u64]) -> Result<EditScript, DiffError> {
    let ses = shortest_edit_script(first, second)?;
    let hunks = compose_hunks(&ses);
    let script = script_from_hunks(hunks, first.len(), second.len());
    verify_coverage(&script, first.len(), second.len())?;

    debug!(
        "Aligned {} vs {} events: {} common, {} added, {} deleted in {} hunks",
        first.len(),
        second.len(),
        script.count(EditKind::Common),
        script.count(EditKind::Add),
        script.count(EditKind::Delete),
        script.hunks.len()
    );

    Ok(script)
}

/// Group an edit script into hunks of `common run + changes`
pub(crate) fn compose_hunks(ses: &[SesOp]) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut current: Option<Hunk> = None;
    let (mut first_pos, mut second_pos) = (0usize, 0usize);

    for op in ses {
        match *op {
            SesOp::Common(i, j) => {
                match current.as_mut() {
                    Some(hunk) if hunk.changes.is_empty() => hunk.common_len += 1,
                    _ => {
                        if let Some(done) = current.take() {
                            hunks.push(done);
                        }
                        current = Some(Hunk {
                            first_start: i,
                            second_start: j,
                            common_len: 1,
                            changes: Vec::new(),
                        });
                    }
                }
                first_pos = i + 1;
                second_pos = j + 1;
            }
            SesOp::Delete(i) => {
                current
                    .get_or_insert_with(|| empty_hunk(first_pos, second_pos))
                    .changes
                    .push(EditKind::Delete);
                first_pos = i + 1;
            }
            SesOp::Add(j) => {
                current
                    .get_or_insert_with(|| empty_hunk(first_pos, second_pos))
                    .changes
                    .push(EditKind::Add);
                second_pos = j + 1;
            }
        }
    }

    hunks.extend(current);
    hunks
}

fn empty_hunk(first_start: usize, second_start: usize) -> Hunk {
    Hunk {
        first_start,
        second_start,
        common_len: 0,
        changes: Vec::new(),
    }
}

/// Walk hunks in order and derive positioned ops
///
/// A hunk starting before the end of the previously accepted hunk in either
/// trace is logged and skipped. Gaps between hunks of equal length on both
/// sides are filled with common ops, uneven gaps with a delete run followed
/// by an add run, so the script always covers both traces.
pub fn script_from_hunks(hunks: Vec<Hunk>, first_len: usize, second_len: usize) -> EditScript {
    let mut ops = Vec::new();
    let mut accepted = Vec::with_capacity(hunks.len());
    let mut skipped_hunks = 0;
    let (mut first_idx, mut second_idx) = (0usize, 0usize);

    for hunk in hunks {
        if hunk.first_start < first_idx || hunk.second_start < second_idx {
            warn!(
                "unsorted hunk detected at @@ -{},{} +{},{} @@",
                hunk.first_start,
                hunk.first_len(),
                hunk.second_start,
                hunk.second_len()
            );
            skipped_hunks += 1;
            continue;
        }

        fill_gap(
            &mut ops,
            (first_idx, second_idx),
            (hunk.first_start, hunk.second_start),
        );

        first_idx = hunk.first_start;
        second_idx = hunk.second_start;
        for _ in 0..hunk.common_len {
            ops.push(EditOp::common(first_idx, second_idx));
            first_idx += 1;
            second_idx += 1;
        }
        for change in &hunk.changes {
            match change {
                EditKind::Add => {
                    ops.push(EditOp::add(second_idx));
                    second_idx += 1;
                }
                EditKind::Delete => {
                    ops.push(EditOp::delete(first_idx));
                    first_idx += 1;
                }
                EditKind::Common => {
                    ops.push(EditOp::common(first_idx, second_idx));
                    first_idx += 1;
                    second_idx += 1;
                }
            }
        }
        accepted.push(hunk);
    }

    fill_gap(&mut ops, (first_idx, second_idx), (first_len, second_len));

    EditScript {
        ops,
        hunks: accepted,
        skipped_hunks,
    }
}

fn fill_gap(ops: &mut Vec<EditOp>, from: (usize, usize), to: (usize, usize)) {
    let first_gap = to.0.saturating_sub(from.0);
    let second_gap = to.1.saturating_sub(from.1);
    if first_gap == 0 && second_gap == 0 {
        return;
    }
    if first_gap != second_gap {
        warn!(
            "uneven gap before position ({}, {}): {} vs {} events replaced",
            to.0, to.1, first_gap, second_gap
        );
        ops.extend((from.0..to.0).map(EditOp::delete));
        ops.extend((from.1..to.1).map(EditOp::add));
        return;
    }
    for offset in 0..first_gap {
        ops.push(EditOp::common(from.0 + offset, from.1 + offset));
    }
}

/// Check that every index of both traces is covered once, in order
fn verify_coverage(
    script: &EditScript,
    first_len: usize,
    second_len: usize,
) -> Result<(), DiffError> {
    let mut next_first = 0usize;
    let mut next_second = 0usize;

    for op in &script.ops {
        if let Some(pos) = op.position_in_first {
            if pos != next_first {
                return Err(DiffError::Alignment(format!(
                    "first trace position {} out of order, expected {}",
                    pos, next_first
                )));
            }
            next_first += 1;
        }
        if let Some(pos) = op.position_in_second {
            if pos != next_second {
                return Err(DiffError::Alignment(format!(
                    "second trace position {} out of order, expected {}",
                    pos, next_second
                )));
            }
            next_second += 1;
        }
    }

    if next_first != first_len || next_second != second_len {
        return Err(DiffError::Alignment(format!(
            "script covers {}/{} first and {}/{} second events",
            next_first, first_len, next_second, second_len
        )));
    }
    Ok(())
}

/// Compute the shortest edit script from `a` to `b`
pub(crate) fn shortest_edit_script(a: &[u64], b: &[u64]) -> Result<Vec<SesOp>, DiffError> {
    let mut out = Vec::with_capacity(a.len().max(b.len()));
    conquer(a, 0, b, 0, &mut out)?;
    Ok(out)
}

fn conquer(
    a: &[u64],
    a_off: usize,
    b: &[u64],
    b_off: usize,
    out: &mut Vec<SesOp>,
) -> Result<(), DiffError> {
    let prefix = common_prefix_len(a, b);
    out.extend((0..prefix).map(|i| SesOp::Common(a_off + i, b_off + i)));

    let (a_rest, b_rest) = (&a[prefix..], &b[prefix..]);
    let suffix = common_suffix_len(a_rest, b_rest);
    let a_mid = &a_rest[..a_rest.len() - suffix];
    let b_mid = &b_rest[..b_rest.len() - suffix];
    let (a_mid_off, b_mid_off) = (a_off + prefix, b_off + prefix);

    if a_mid.is_empty() {
        out.extend((0..b_mid.len()).map(|j| SesOp::Add(b_mid_off + j)));
    } else if b_mid.is_empty() {
        out.extend((0..a_mid.len()).map(|i| SesOp::Delete(a_mid_off + i)));
    } else {
        let (x, y) = find_middle_snake(a_mid, b_mid).ok_or_else(|| {
            DiffError::Alignment(format!(
                "no middle snake between {} and {} events",
                a_mid.len(),
                b_mid.len()
            ))
        })?;
        let degenerate = (x == 0 && y == 0) || (x == a_mid.len() && y == b_mid.len());
        if x > a_mid.len() || y > b_mid.len() || degenerate {
            return Err(DiffError::Alignment(format!(
                "invalid split ({}, {}) of {}x{} subproblem",
                x,
                y,
                a_mid.len(),
                b_mid.len()
            )));
        }
        conquer(&a_mid[..x], a_mid_off, &b_mid[..y], b_mid_off, out)?;
        conquer(&a_mid[x..], a_mid_off + x, &b_mid[y..], b_mid_off + y, out)?;
    }

    let a_tail = a_mid_off + a_mid.len();
    let b_tail = b_mid_off + b_mid.len();
    out.extend((0..suffix).map(|i| SesOp::Common(a_tail + i, b_tail + i)));
    Ok(())
}

/// Furthest-reaching x per diagonal, indexable by negative diagonals
struct Diagonals {
    offset: isize,
    v: Vec<usize>,
}

impl Diagonals {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            v: vec![0; 2 * max_d + 1],
        }
    }
}

impl Index<isize> for Diagonals {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for Diagonals {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

/// Find a point on an optimal path splitting the problem in two
///
/// Searches forward from the start and backward from the end until the two
/// frontiers overlap.
fn find_middle_snake(a: &[u64], b: &[u64]) -> Option<(usize, usize)> {
    let n = a.len();
    let m = b.len();
    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;
    let max_d = (n + m + 1) / 2 + 1;

    let mut vf = Diagonals::new(max_d);
    let mut vb = Diagonals::new(max_d);

    for d in 0..max_d as isize {
        // forward
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vf[k - 1] < vf[k + 1]) {
                vf[k + 1]
            } else {
                vf[k - 1] + 1
            };
            let y = (x as isize - k) as usize;
            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix_len(&a[x..], &b[y..]);
            }
            vf[k] = x;
            if odd && (k - delta).abs() <= d - 1 && vf[k] + vb[-(k - delta)] >= n {
                return Some((x0, y0));
            }
        }

        // backward
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vb[k - 1] < vb[k + 1]) {
                vb[k + 1]
            } else {
                vb[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            if x < n && y < m {
                let advance = common_suffix_len(&a[..n - x], &b[..m - y]);
                x += advance;
                y += advance;
            }
            vb[k] = x;
            if !odd && (k - delta).abs() <= d && vb[k] + vf[-(k - delta)] >= n {
                return n.checked_sub(x).zip(m.checked_sub(y));
            }
        }
    }

    None
}

fn common_prefix_len(a: &[u64], b: &[u64]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix_len(a: &[u64], b: &[u64]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Edit distance of a script, for comparing against a reference LCS
    fn edit_distance(ses: &[SesOp]) -> usize {
        ses.iter()
            .filter(|op| !matches!(op, SesOp::Common(..)))
            .count()
    }

    fn lcs_len(a: &[u64], b: &[u64]) -> usize {
        let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
        for i in (0..a.len()).rev() {
            for j in (0..b.len()).rev() {
                dp[i][j] = if a[i] == b[j] {
                    dp[i + 1][j + 1] + 1
                } else {
                    dp[i + 1][j].max(dp[i][j + 1])
                };
            }
        }
        dp[0][0]
    }

    #[test]
    fn test_ses_is_minimal() {
        let cases: Vec<(Vec<u64>, Vec<u64>)> = vec![
            (vec![1, 2, 3, 1, 2, 2, 1], vec![3, 2, 1, 2, 1, 3]),
            (vec![1], vec![2, 3]),
            (vec![1, 2, 3], vec![4, 5, 6]),
            (vec![], vec![1, 2]),
            (vec![5, 6, 7, 8], vec![5, 7, 8, 6]),
        ];
        for (a, b) in cases {
            let ses = shortest_edit_script(&a, &b).unwrap();
            let expected = a.len() + b.len() - 2 * lcs_len(&a, &b);
            assert_eq!(edit_distance(&ses), expected, "a={:?} b={:?}", a, b);
            for op in &ses {
                if let SesOp::Common(i, j) = op {
                    assert_eq!(a[*i], b[*j]);
                }
            }
        }
    }

    #[test]
    fn test_compose_hunks_groups_common_runs() {
        let ses = vec![
            SesOp::Common(0, 0),
            SesOp::Common(1, 1),
            SesOp::Delete(2),
            SesOp::Add(2),
            SesOp::Common(3, 3),
        ];
        let hunks = compose_hunks(&ses);
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].common_len, 2);
        assert_eq!(hunks[0].changes, vec![EditKind::Delete, EditKind::Add]);
        assert_eq!((hunks[1].first_start, hunks[1].second_start), (3, 3));
        assert!(hunks[1].changes.is_empty());
    }

    #[test]
    fn test_leading_changes_start_at_origin() {
        let hunks = compose_hunks(&[SesOp::Add(0), SesOp::Common(0, 1)]);
        assert_eq!(hunks.len(), 2);
        assert_eq!((hunks[0].first_start, hunks[0].second_start), (0, 0));
        assert_eq!(hunks[0].common_len, 0);
        assert_eq!((hunks[1].first_start, hunks[1].second_start), (0, 1));
    }

    #[test]
    fn test_regressing_hunk_is_skipped() {
        let hunks = vec![
            Hunk {
                first_start: 0,
                second_start: 0,
                common_len: 2,
                changes: vec![EditKind::Add],
            },
            Hunk {
                first_start: 1,
                second_start: 1,
                common_len: 1,
                changes: vec![],
            },
            Hunk {
                first_start: 2,
                second_start: 3,
                common_len: 1,
                changes: vec![],
            },
        ];
        let script = script_from_hunks(hunks, 3, 4);
        assert_eq!(script.skipped_hunks, 1);
        assert_eq!(script.hunks.len(), 2);
        assert_eq!(
            script.ops,
            vec![
                EditOp::common(0, 0),
                EditOp::common(1, 1),
                EditOp::add(2),
                EditOp::common(2, 3),
            ]
        );
    }

    #[test]
    fn test_gap_between_hunks_filled() {
        let hunks = vec![Hunk {
            first_start: 2,
            second_start: 2,
            common_len: 0,
            changes: vec![EditKind::Delete],
        }];
        let script = script_from_hunks(hunks, 4, 3);
        assert!(verify_coverage(&script, 4, 3).is_ok());
        assert_eq!(script.ops[2], EditOp::delete(2));
        assert_eq!(script.ops[3], EditOp::common(3, 2));
    }

    #[test]
    fn test_skipped_hunk_with_changes_keeps_script_complete() {
        let hunks = vec![
            Hunk {
                first_start: 0,
                second_start: 0,
                common_len: 1,
                changes: vec![EditKind::Delete],
            },
            Hunk {
                first_start: 1,
                second_start: 0,
                common_len: 0,
                changes: vec![EditKind::Add, EditKind::Add],
            },
            Hunk {
                first_start: 3,
                second_start: 3,
                common_len: 1,
                changes: vec![],
            },
        ];
        let script = script_from_hunks(hunks, 4, 4);

        assert_eq!(script.skipped_hunks, 1);
        assert!(verify_coverage(&script, 4, 4).is_ok());
        assert_eq!(
            script.ops,
            vec![
                EditOp::common(0, 0),
                EditOp::delete(1),
                EditOp::delete(2),
                EditOp::add(1),
                EditOp::add(2),
                EditOp::common(3, 3),
            ]
        );
    }
}
