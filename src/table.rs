use std::cmp::min;
use std::ops::Index;

use log::debug;

use crate::utils::MyHash;

/// Maximum number of bucket bits. Beyond this the chains just get longer.
const MAX_BUCKET_BITS: usize = 24;

#[derive(Clone)]
struct Entry<T> {
    value: T,
    next: usize,
}

impl<T> Entry<T> {
    /// Create a new cell with the given value.
    pub fn new(value: T) -> Self {
        Self { value, next: 0 }
    }
}

impl<T> Entry<T> {
    /// Get the reference to the value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Get the index of the next cell.
    pub fn next(&self) -> usize {
        self.next
    }
    /// Set the index of the next cell.
    pub fn set_next(&mut self, next: usize) {
        self.next = next;
    }
}

/// Append-only hash-consing table.
///
/// Values are stored in an arena and addressed by their index. Index `0` is a
/// sentry: it holds a default value, is never returned by [`Table::put`], and
/// terminates bucket chains. Cells are never freed, so an index handed out
/// once stays valid for the lifetime of the table.
pub struct Table<T> {
    data: Vec<Entry<T>>,

    buckets: Vec<usize>,
    bitmask: u64,
    /// Number of values reachable from the buckets.
    hashed: usize,
}

impl<T> Table<T>
where
    T: Default,
{
    /// Create a new table with initial capacity for `2^bits` cells.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Storage bits should be in the range 0..=31");

        let capacity = 1 << bits;
        let mut data: Vec<Entry<T>> = Vec::with_capacity(capacity);
        data.push(Entry::new(T::default())); // 0th cell is the sentry.

        let buckets_bits = min(bits, 16);
        let buckets_size = 1 << buckets_bits;
        let buckets = vec![0; buckets_size];
        let bitmask = (buckets_size - 1) as u64;

        Self {
            data,
            buckets,
            bitmask,
            hashed: 0,
        }
    }
}

impl<T> Table<T> {
    /// Get the capacity of the table.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }
    /// Get the number of stored values (not counting the sentry).
    pub fn size(&self) -> usize {
        self.data.len() - 1
    }
    /// Get the number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].value()
    }

    /// Get the index of the next cell in the same bucket.
    pub fn next(&self, index: usize) -> usize {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].next()
    }
    fn set_next(&mut self, index: usize, next: usize) {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].set_next(next);
    }

    /// Add a new value to the table without hashing it, and return its index.
    ///
    /// The value is not reachable via [`Table::put`].
    pub fn add(&mut self, value: T) -> usize {
        let index = self.data.len();
        assert!(index <= u32::MAX as usize, "Storage is full");
        self.data.push(Entry::new(value));
        index
    }
}

impl<T> Table<T>
where
    T: MyHash,
{
    fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Put a value into the table and return its index.
    ///
    /// If an equal value is already stored, its index is returned and the
    /// table is left untouched.
    pub fn put(&mut self, value: T) -> usize
    where
        T: Eq,
    {
        let bucket_index = self.bucket_index(&value);
        let mut index = self.buckets[bucket_index];

        if index == 0 {
            // Create new node and put it into the bucket.
            let i = self.add(value);
            self.buckets[bucket_index] = i;
            self.hashed += 1;
            self.maybe_grow();
            return i;
        }

        loop {
            assert!(index > 0);

            if &value == self.value(index) {
                // The node already exists.
                return index;
            }

            let next = self.next(index);

            if next == 0 {
                // Create new node and append it to the bucket.
                let i = self.add(value);
                self.set_next(index, i);
                self.hashed += 1;
                self.maybe_grow();
                return i;
            } else {
                // Go to the next node in the bucket.
                index = next;
            }
        }
    }

    /// Double the bucket array once the average chain length exceeds 2.
    fn maybe_grow(&mut self) {
        let bits = self.buckets.len().trailing_zeros() as usize;
        if self.hashed <= 2 * self.buckets.len() || bits >= MAX_BUCKET_BITS {
            return;
        }

        let new_size = self.buckets.len() * 2;
        debug!(
            "table: rehashing {} values into {} buckets",
            self.hashed, new_size
        );

        // Collect every hashed cell before relinking.
        let mut hashed = Vec::with_capacity(self.hashed);
        for &head in &self.buckets {
            let mut index = head;
            while index != 0 {
                hashed.push(index);
                index = self.data[index].next();
            }
        }

        self.buckets = vec![0; new_size];
        self.bitmask = (new_size - 1) as u64;
        for index in hashed {
            let bucket_index = self.bucket_index(self.value(index));
            let head = self.buckets[bucket_index];
            self.data[index].set_next(head);
            self.buckets[bucket_index] = index;
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}
