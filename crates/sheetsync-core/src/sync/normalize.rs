//! Turns raw sheet rows into community-grouped speaker programs.
//!
//! Column layout of the synced range (starting at C):
//!
//! | cell | field       |
//! |------|-------------|
//! | 0    | community   |
//! | 1    | time        |
//! | 2    | speaker     |
//! | 3    | company     |
//! | 4    | subject     |
//! | 5    | description |

use std::cmp::Ordering;

use crate::sync::types::{CommunityGroup, RawRow, Speaker};

/// Group rows by community, carrying a blank community forward from the
/// row above.
///
/// Never fails: short rows and non-string cells produce `None` fields.
pub fn normalize(rows: &[RawRow]) -> Vec<CommunityGroup> {
    let (_, groups) = rows.iter().fold(
        (None, Vec::new()),
        |(carried, mut groups): (Option<String>, Vec<CommunityGroup>), row| {
            let community = resolve_community(row, carried);
            place_speaker(&mut groups, &community, speaker_from_row(row));
            (community, groups)
        },
    );
    groups
}

/// Trimmed cell value, `None` when the cell is missing.
fn cell(row: &RawRow, index: usize) -> Option<String> {
    row.get(index)
        .and_then(|c| c.as_deref())
        .map(|s| s.trim().to_string())
}

fn resolve_community(row: &RawRow, carried: Option<String>) -> Option<String> {
    match cell(row, 0) {
        Some(value) if value.is_empty() => carried,
        // A missing cell resolves to None and resets the carry.
        other => other,
    }
}

fn speaker_from_row(row: &RawRow) -> Speaker {
    Speaker {
        time: cell(row, 1),
        speaker: cell(row, 2),
        company: cell(row, 3),
        subject: cell(row, 4),
        description: cell(row, 5),
        photo: None,
    }
}

fn place_speaker(groups: &mut Vec<CommunityGroup>, community: &Option<String>, speaker: Speaker) {
    match groups.iter_mut().find(|g| &g.community == community) {
        Some(group) => insert_by_time(&mut group.program, speaker),
        None => groups.push(CommunityGroup {
            community: community.clone(),
            program: vec![speaker],
        }),
    }
}

/// Append, then walk the new entry left past every strictly later `time`.
///
/// The program is re-ordered after every insertion. An entry without a time
/// compares equal to everything, so it never moves and nothing moves past it.
/// When every entry has a time, this is the order a stable full re-sort gives.
fn insert_by_time(program: &mut Vec<Speaker>, speaker: Speaker) {
    program.push(speaker);
    let mut i = program.len() - 1;
    while i > 0 && compare_time(&program[i], &program[i - 1]) == Ordering::Less {
        program.swap(i, i - 1);
        i -= 1;
    }
}

fn compare_time(a: &Speaker, b: &Speaker) -> Ordering {
    match (&a.time, &b.time) {
        (Some(a), Some(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
