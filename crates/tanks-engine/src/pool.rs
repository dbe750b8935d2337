//! Reusable object pool for shells, cutting per-shot allocation. Generalizes
//! the teacher's paired-handle ownership discipline (a resource is either
//! checked out exactly once or sitting free, never both) to a free-list of
//! pooled shell slots.

pub struct Pool<T> {
    free: Vec<T>,
    make: Box<dyn Fn() -> T + Send>,
    released_count: u64,
    acquired_count: u64,
}

impl<T> Pool<T> {
    pub fn new(make: impl Fn() -> T + Send + 'static) -> Self {
        Self {
            free: Vec::new(),
            make: Box::new(make),
            released_count: 0,
            acquired_count: 0,
        }
    }

    pub fn acquire(&mut self) -> T {
        self.acquired_count += 1;
        self.free.pop().unwrap_or_else(|| (self.make)())
    }

    /// Mandatory on shell destruction (spec.md §5): returns the slot to the
    /// free list for reuse instead of dropping it.
    pub fn release(&mut self, value: T) {
        self.released_count += 1;
        self.free.push(value);
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn stats(&self) -> (u64, u64) {
        (self.acquired_count, self.released_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_values_are_reused() {
        let mut pool: Pool<Vec<u8>> = Pool::new(Vec::new);
        let a = pool.acquire();
        pool.release(a);
        assert_eq!(pool.free_count(), 1);
        let _b = pool.acquire();
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn acquire_without_free_slot_constructs_new() {
        let mut pool: Pool<u32> = Pool::new(|| 7);
        assert_eq!(pool.acquire(), 7);
    }
}
