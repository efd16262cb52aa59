use std::{cmp::Ordering, collections::BinaryHeap};

use super::GraphNodeMap;
use super::config::FrontierKind;


/// Heap entry, f value is frozen at push time
#[derive(Debug)]
pub(crate) struct Entry {
    index: usize, // index in the node map
    f_value: f64,
    seq: u64, // push order
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // flipped so the heap pops the lowest f first, ties go to the latest push
        other.f_value.total_cmp(&self.f_value)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Entry {}


/// Open list: discovered nodes waiting to be expanded
/// Holds node map indexes only, duplicates are allowed.
/// Both variants return the lowest f value first; among equal f values the
/// most recently pushed entry wins.
#[derive(Debug)]
pub(crate) enum OpenList {
    Sorted(Vec<usize>),
    Heap { heap: BinaryHeap<Entry>, seq: u64 },
}

impl OpenList {

    pub fn new(kind: FrontierKind) -> Self {
        match kind {
            FrontierKind::Sorted => OpenList::Sorted(Vec::new()),
            FrontierKind::Heap => OpenList::Heap { heap: BinaryHeap::new(), seq: 0 },
        }
    }

    pub fn push(&mut self, index: usize, f_value: f64) {
        match self {
            OpenList::Sorted(list) => list.push(index),
            OpenList::Heap { heap, seq } => {
                heap.push(Entry { index, f_value, seq: *seq });
                *seq += 1;
            }
        }
    }

    /// Remove and return the entry with the lowest f value
    /// The sorted variant reads current f values from `nodes`
    pub fn pop(&mut self, nodes: &GraphNodeMap) -> Option<usize> {
        match self {
            OpenList::Sorted(list) => {
                let f_value = |index: &usize| {
                    nodes.get_index(*index)
                        .map(|(_, record)| record.f_value())
                        .unwrap_or(f64::INFINITY)
                };
                // stable sort, descending, so the lowest f sits at the tail
                list.sort_by(|a, b| f_value(b).total_cmp(&f_value(a)));
                list.pop()
            }
            OpenList::Heap { heap, .. } => heap.pop().map(|entry| entry.index),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OpenList::Sorted(list) => list.len(),
            OpenList::Heap { heap, .. } => heap.len(),
        }
    }
}
