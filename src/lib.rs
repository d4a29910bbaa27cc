//
// Copyright (c) 2025 Nathan Fiedler
//

//! A growable array with explicit control over its capacity, positional
//! insert and remove, and an in-place quicksort driven by a comparator.
//!
//! The array owns a single contiguous buffer of `capacity` slots, of which
//! the first `len` are initialized. When a write would exceed the capacity,
//! a new buffer is allocated that is 30% larger (or exactly as large as
//! needed, whichever is greater), the live elements are copied over, and
//! the old buffer is released. The capacity never shrinks on its own.
//!
//! # Bounds
//!
//! Positional operations accept any index in `0..=len`. Inserting at `len` is
//! the same as pushing, while reading or removing at `len` finds the absent
//! slot just past the tail and yields `None` without touching the array.
//!
//! # Performance
//!
//! Amortized O(1) push, O(n) insert and remove, O(1) get. Sorting averages
//! O(n log n) and degrades to O(n²) for inputs that defeat the middle pivot.
//!
//! # Safety
//!
//! Because this data structure is allocating memory, copying bytes using raw
//! pointers, and de-allocating memory as needed, there are `unsafe` blocks
//! throughout the code.

use std::alloc::{Layout, alloc, dealloc, handle_alloc_error};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::ptr::{self, NonNull};
use std::slice;

use tracing::{debug, trace};

mod error;
mod sort;

pub use error::ArrayError;

/// Capacity used when none is given or the source sequence is empty.
pub const DEFAULT_CAPACITY: usize = 10;

// capacity grows by a factor of 13/10
const GROWTH_NUMERATOR: usize = 13;
const GROWTH_DENOMINATOR: usize = 10;

/// Slots kept in reserve below the largest possible allocation so that index
/// arithmetic near the limit cannot overflow.
const SAFETY_MARGIN: usize = 8;

/// Resizable array which stores its elements contiguously and grows by 30%
/// whenever it runs out of room.
pub struct DynamicArray<T> {
    /// allocated buffer of size `capacity`
    buffer: NonNull<T>,
    /// number of slots allocated in the buffer
    capacity: usize,
    /// number of elements, all stored in `[0, count)`
    count: usize,
    _marker: PhantomData<T>,
}

impl<T> DynamicArray<T> {
    /// Return an empty array with the default capacity.
    pub fn new() -> Self {
        Self::allocated(DEFAULT_CAPACITY)
    }

    /// Return an empty array with room for exactly `capacity` elements.
    ///
    /// A capacity of zero selects the default capacity instead.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `capacity` exceeds [`Self::max_capacity`].
    pub fn with_capacity(capacity: usize) -> Result<Self, ArrayError> {
        if capacity > Self::max_capacity() {
            return Err(ArrayError::InvalidArgument { capacity });
        }
        if capacity == 0 {
            debug!("zero capacity requested, using default of {DEFAULT_CAPACITY}");
            Ok(Self::allocated(DEFAULT_CAPACITY))
        } else {
            Ok(Self::allocated(capacity))
        }
    }

    /// Largest capacity this array will ever allocate for its element type.
    pub fn max_capacity() -> usize {
        let size = std::mem::size_of::<T>();
        if size == 0 {
            isize::MAX as usize - SAFETY_MARGIN
        } else {
            (isize::MAX as usize / size).saturating_sub(SAFETY_MARGIN)
        }
    }

    fn allocated(capacity: usize) -> Self {
        Self {
            buffer: Self::allocate(capacity),
            capacity,
            count: 0,
            _marker: PhantomData,
        }
    }

    /// Allocate an uninitialized buffer of the given number of slots.
    fn allocate(capacity: usize) -> NonNull<T> {
        if capacity == 0 || std::mem::size_of::<T>() == 0 {
            return NonNull::dangling();
        }
        let Ok(layout) = Layout::array::<T>(capacity) else {
            panic!("{}", ArrayError::CapacityOverflow { required: capacity });
        };
        unsafe {
            let ptr = alloc(layout).cast::<T>();
            match NonNull::new(ptr) {
                Some(ptr) => ptr,
                None => handle_alloc_error(layout),
            }
        }
    }

    /// Free a buffer without dropping any of its elements.
    fn release(buffer: NonNull<T>, capacity: usize) {
        if capacity == 0 || std::mem::size_of::<T>() == 0 {
            return;
        }
        // the layout was valid when the buffer was allocated
        if let Ok(layout) = Layout::array::<T>(capacity) {
            unsafe { dealloc(buffer.as_ptr().cast::<u8>(), layout) }
        }
    }

    /// Replace the buffer with a larger one that holds at least `required`
    /// elements, moving the existing elements over in order.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity would exceed [`Self::max_capacity`].
    fn grow(&mut self, required: usize) {
        let new_capacity = match grown_capacity(self.capacity, required, Self::max_capacity()) {
            Ok(new_capacity) => new_capacity,
            Err(err) => panic!("{err}"),
        };
        trace!(
            old_capacity = self.capacity,
            new_capacity,
            len = self.count,
            "growing dynamic array"
        );
        let buffer = Self::allocate(new_capacity);
        unsafe { ptr::copy_nonoverlapping(self.buffer.as_ptr(), buffer.as_ptr(), self.count) }
        Self::release(self.buffer, self.capacity);
        self.buffer = buffer;
        self.capacity = new_capacity;
    }

    /// Ensure there is room for one more element.
    fn reserve_one(&mut self) {
        if self.count == self.capacity {
            self.grow(self.count + 1);
        }
    }

    /// Reject any index beyond the slot just past the tail.
    fn check_range(&self, index: usize) -> Result<(), ArrayError> {
        if index > self.count {
            Err(ArrayError::IndexOutOfRange {
                index,
                len: self.count,
            })
        } else {
            Ok(())
        }
    }

    /// Appends an element to the back of the array.
    ///
    /// # Panics
    ///
    /// Panics if the array is full and cannot grow any further.
    ///
    /// # Time complexity
    ///
    /// Amortized constant time.
    pub fn push(&mut self, value: T) {
        self.reserve_one();
        unsafe { ptr::write(self.buffer.as_ptr().add(self.count), value) }
        self.count += 1;
    }

    /// Inserts an element at position `index` within the array, shifting all
    /// elements after it to the right.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index > len`, leaving the array as it was.
    ///
    /// # Time complexity
    ///
    /// O(n - index)
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), ArrayError> {
        self.check_range(index)?;
        self.reserve_one();
        unsafe {
            let slot = self.buffer.as_ptr().add(index);
            ptr::copy(slot, slot.add(1), self.count - index);
            ptr::write(slot, value);
        }
        self.count += 1;
        Ok(())
    }

    /// Appends clones of all the given elements, in order, growing the buffer
    /// at most once. Returns `false` if `items` is empty, in which case the
    /// array is not modified.
    ///
    /// # Panics
    ///
    /// Panics if the combined length cannot be accommodated.
    pub fn append_all(&mut self, items: &[T]) -> bool
    where
        T: Clone,
    {
        if items.is_empty() {
            return false;
        }
        let Some(required) = self.count.checked_add(items.len()) else {
            panic!("{}", ArrayError::CapacityOverflow { required: usize::MAX });
        };
        if required > self.capacity {
            self.grow(required);
        }
        for item in items {
            unsafe { ptr::write(self.buffer.as_ptr().add(self.count), item.clone()) }
            self.count += 1;
        }
        true
    }

    /// Clears the array, dropping all values. The capacity is unchanged.
    ///
    /// # Time complexity
    ///
    /// O(n) if elements are droppable, otherwise constant.
    pub fn clear(&mut self) {
        let elems: *mut [T] = self.as_mut_slice();
        // forget the elements first so a panicking drop cannot cause a double free
        self.count = 0;
        unsafe { ptr::drop_in_place(elems) }
    }

    /// Retrieve a reference to the element at the given offset.
    ///
    /// Reading at `index == len` succeeds with `None` since that slot is
    /// within bounds but holds no element.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index > len`.
    ///
    /// # Time complexity
    ///
    /// Constant time.
    pub fn get(&self, index: usize) -> Result<Option<&T>, ArrayError> {
        self.check_range(index)?;
        Ok(self.as_slice().get(index))
    }

    /// Returns a mutable reference to an element, with the same bounds as
    /// [`Self::get`].
    pub fn get_mut(&mut self, index: usize) -> Result<Option<&mut T>, ArrayError> {
        self.check_range(index)?;
        Ok(self.as_mut_slice().get_mut(index))
    }

    /// Removes and returns the element at position `index`, shifting all
    /// elements after it to the left.
    ///
    /// Removing at `index == len` finds no element, returns `None` and leaves
    /// the array unchanged.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index > len`.
    ///
    /// # Time complexity
    ///
    /// O(n - index)
    pub fn remove(&mut self, index: usize) -> Result<Option<T>, ArrayError> {
        self.check_range(index)?;
        if index == self.count {
            return Ok(None);
        }
        let value = unsafe {
            let slot = self.buffer.as_ptr().add(index);
            let value = ptr::read(slot);
            ptr::copy(slot.add(1), slot, self.count - index - 1);
            value
        };
        self.count -= 1;
        Ok(Some(value))
    }

    /// Removes the first element equal to `value`, returning `true` if one
    /// was found. The array is untouched when there is no match.
    ///
    /// # Time complexity
    ///
    /// O(n)
    pub fn remove_item(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        match self.iter().position(|elem| value == elem) {
            Some(index) => matches!(self.remove(index), Ok(Some(_))),
            None => false,
        }
    }

    /// Removes the last element from the array and returns it, or `None` if
    /// the array is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            None
        } else {
            self.count -= 1;
            unsafe { Some(ptr::read(self.buffer.as_ptr().add(self.count))) }
        }
    }

    /// Sorts the array in place with the given comparator.
    ///
    /// This sort is not stable: equal elements may be reordered.
    ///
    /// # Time complexity
    ///
    /// O(n log n) on average, O(n²) in the worst case.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if self.count <= 1 {
            return;
        }
        sort::quick_sort(self.as_mut_slice(), &mut compare);
    }

    /// Sorts the array in ascending order.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(|a, b| a.cmp(b));
    }

    /// Returns an iterator over the elements, from front to back.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// View the elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.buffer.as_ptr(), self.count) }
    }

    /// View the elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.buffer.as_ptr(), self.count) }
    }

    /// Return the number of elements in the array.
    ///
    /// # Time complexity
    ///
    /// Constant time.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns the total number of elements the array can hold without
    /// reallocating.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if the array has a length of 0.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Compute the capacity to grow to from `current` so that at least
/// `required` elements fit: 130% of the current capacity, rounded down, or
/// `required` if that is larger.
fn grown_capacity(current: usize, required: usize, limit: usize) -> Result<usize, ArrayError> {
    // floor(current * 13 / 10) without overflowing the intermediate product
    let scaled = (current / GROWTH_DENOMINATOR)
        .checked_mul(GROWTH_NUMERATOR)
        .and_then(|n| {
            n.checked_add(current % GROWTH_DENOMINATOR * GROWTH_NUMERATOR / GROWTH_DENOMINATOR)
        });
    let Some(scaled) = scaled else {
        return Err(ArrayError::CapacityOverflow { required });
    };
    let new_capacity = scaled.max(required);
    if new_capacity == 0 || new_capacity > limit {
        Err(ArrayError::CapacityOverflow {
            required: new_capacity,
        })
    } else {
        Ok(new_capacity)
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        self.clear();
        Self::release(self.buffer, self.capacity);
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    fn clone(&self) -> Self {
        let mut copy = Self::allocated(self.capacity);
        for value in self.iter() {
            copy.push(value.clone());
        }
        copy
    }
}

impl<T: PartialEq> PartialEq for DynamicArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: fmt::Display> fmt::Display for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, value) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Index<usize> for DynamicArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        let Some(item) = self.as_slice().get(index) else {
            panic!("index out of bounds: {}", index);
        };
        item
    }
}

impl<T> IndexMut<usize> for DynamicArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let Some(item) = self.as_mut_slice().get_mut(index) else {
            panic!("index out of bounds: {}", index);
        };
        item
    }
}

impl<T> From<Vec<T>> for DynamicArray<T> {
    /// Take ownership of the elements, sizing the buffer to fit them exactly.
    fn from(snapshot: Vec<T>) -> Self {
        let capacity = if snapshot.is_empty() {
            debug!("empty source sequence, using default capacity of {DEFAULT_CAPACITY}");
            DEFAULT_CAPACITY
        } else {
            snapshot.len()
        };
        let mut array = Self::allocated(capacity);
        for value in snapshot {
            array.push(value);
        }
        array
    }
}

impl<T: Clone> From<&[T]> for DynamicArray<T> {
    fn from(source: &[T]) -> Self {
        Self::from(source.to_vec())
    }
}

impl<A> FromIterator<A> for DynamicArray<A> {
    fn from_iter<T: IntoIterator<Item = A>>(iter: T) -> Self {
        let snapshot: Vec<A> = iter.into_iter().collect();
        Self::from(snapshot)
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
