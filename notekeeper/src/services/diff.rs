//! Incremental list updates
//!
//! Computes the edits that turn a rendered list into a newly loaded one,
//! so a grid only redraws the cards that actually changed.

use crate::database::Note;

/// One step of an edit script.
///
/// Indices refer to the list as it stands when the step is applied, with
/// steps applied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEdit<T> {
    Remove { index: usize },
    Insert { index: usize, item: T },
    /// Same item, different contents: redraw in place
    Change { index: usize, item: T },
}

/// Diff two lists using `same_item` for identity and `same_contents` for
/// equality of matched items.
///
/// Items are matched along a longest common subsequence of identities; a
/// moved item shows up as a removal plus an insertion.
pub fn diff_lists<T, I, C>(
    old: &[T],
    new: &[T],
    same_item: I,
    same_contents: C,
) -> Vec<ListEdit<T>>
where
    T: Clone,
    I: Fn(&T, &T) -> bool,
    C: Fn(&T, &T) -> bool,
{
    let (n, m) = (old.len(), new.len());

    // lcs[i][j]: common subsequence length of old[i..] and new[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if same_item(&old[i], &new[j]) {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut edits = Vec::new();
    let (mut i, mut j) = (0, 0);
    // Position in the partially edited list
    let mut cursor = 0;

    while i < n || j < m {
        if i < n && j < m && same_item(&old[i], &new[j]) {
            if !same_contents(&old[i], &new[j]) {
                edits.push(ListEdit::Change {
                    index: cursor,
                    item: new[j].clone(),
                });
            }
            i += 1;
            j += 1;
            cursor += 1;
        } else if j < m && (i == n || lcs[i][j + 1] >= lcs[i + 1][j]) {
            edits.push(ListEdit::Insert {
                index: cursor,
                item: new[j].clone(),
            });
            j += 1;
            cursor += 1;
        } else {
            edits.push(ListEdit::Remove { index: cursor });
            i += 1;
        }
    }

    edits
}

/// Diff note lists the way the card grid compares them: identity is id
/// plus text, contents is full equality including color.
pub fn diff_notes(old: &[Note], new: &[Note]) -> Vec<ListEdit<Note>> {
    diff_lists(old, new, Note::same_item, |a, b| a == b)
}

/// Apply an edit script produced by `diff_lists`
pub fn apply_edits<T>(list: &mut Vec<T>, edits: Vec<ListEdit<T>>) {
    for edit in edits {
        match edit {
            ListEdit::Remove { index } => {
                list.remove(index);
            }
            ListEdit::Insert { index, item } => list.insert(index, item),
            ListEdit::Change { index, item } => list[index] = item,
        }
    }
}
