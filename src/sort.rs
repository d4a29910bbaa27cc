//
// Copyright (c) 2025 Nathan Fiedler
//

//! Partition-exchange sort used by the dynamic array.

use std::cmp::Ordering;

/// Sort the slice in place using quicksort with the middle element of each
/// range as the pivot.
///
/// The sort is not stable. After partitioning, the smaller side is sorted
/// recursively and the larger side is handled by the loop, which keeps the
/// stack depth logarithmic even when the partitions are badly unbalanced.
pub(crate) fn quick_sort<T, F>(slice: &mut [T], compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut slice = slice;
    while slice.len() > 1 {
        let pivot = partition(slice, compare);
        let (left, right) = std::mem::take(&mut slice).split_at_mut(pivot);
        // the pivot itself is already in its final position
        let right = &mut right[1..];
        if left.len() < right.len() {
            quick_sort(left, compare);
            slice = right;
        } else {
            quick_sort(right, compare);
            slice = left;
        }
    }
}

/// Partition the slice around its middle element and return the final
/// position of that pivot.
///
/// Everything left of the returned index compares less than the pivot, and
/// everything right of it does not. The slice must hold at least one element.
fn partition<T, F>(slice: &mut [T], compare: &mut F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    let high = slice.len() - 1;
    let middle = high / 2;
    slice.swap(middle, high);
    let (rest, pivot) = slice.split_at_mut(high);
    let pivot = &pivot[0];
    // every element before `store` is known to be less than the pivot
    let mut store = 0;
    for j in 0..high {
        if compare(&rest[j], pivot) == Ordering::Less {
            rest.swap(store, j);
            store += 1;
        }
    }
    slice.swap(store, high);
    store
}
