//! Flat FIFO storage of fixed-width task vectors, one list per move-count bucket.

/// Append-only list of equally sized `u64` task vectors.
pub trait TaskList {
    /// Width of each task in `u64` words.
    fn task_size(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn add(&mut self, task: &[u64]);

    /// Removes the oldest task, copying it into `out`.
    fn fetch_first(&mut self, out: &mut [u64]) -> bool;

    fn peek_first(&self) -> Option<&[u64]>;

    /// Removes the newest task, copying it into `out`.
    fn fetch_last(&mut self, out: &mut [u64]) -> bool;

    fn peek_last(&self) -> Option<&[u64]>;

    /// Number of tasks removed from the front so far.
    fn fetched_first_count(&self) -> u64;
}

#[derive(Debug, Clone)]
pub struct TaskListNormal {
    task_size: usize,
    data: Vec<u64>,
    read_pos: usize,
    fetched: u64,
}

impl TaskListNormal {
    pub fn new(task_size: usize) -> Self {
        assert!(task_size > 0, "task size must be positive");
        TaskListNormal { task_size, data: Vec::new(), read_pos: 0, fetched: 0 }
    }

    /// Drops the consumed prefix once it dominates the buffer.
    fn compact(&mut self) {
        if self.read_pos == self.data.len() {
            self.data.clear();
            self.read_pos = 0;
        } else if self.read_pos > 4096 && self.read_pos * 2 > self.data.len() {
            self.data.drain(..self.read_pos);
            self.read_pos = 0;
        }
    }
}

impl TaskList for TaskListNormal {
    #[inline(always)]
    fn task_size(&self) -> usize {
        self.task_size
    }

    #[inline(always)]
    fn len(&self) -> usize {
        (self.data.len() - self.read_pos) / self.task_size
    }

    fn add(&mut self, task: &[u64]) {
        debug_assert_eq!(task.len(), self.task_size);
        self.data.extend_from_slice(task);
    }

    fn fetch_first(&mut self, out: &mut [u64]) -> bool {
        let Some(task) = self.peek_first() else {
            return false;
        };
        out.copy_from_slice(task);
        self.read_pos += self.task_size;
        self.fetched += 1;
        self.compact();
        true
    }

    fn peek_first(&self) -> Option<&[u64]> {
        if self.is_empty() {
            return None;
        }
        Some(&self.data[self.read_pos..self.read_pos + self.task_size])
    }

    fn fetch_last(&mut self, out: &mut [u64]) -> bool {
        let Some(task) = self.peek_last() else {
            return false;
        };
        out.copy_from_slice(task);
        self.data.truncate(self.data.len() - self.task_size);
        self.compact();
        true
    }

    fn peek_last(&self) -> Option<&[u64]> {
        if self.is_empty() {
            return None;
        }
        Some(&self.data[self.data.len() - self.task_size..])
    }

    fn fetched_first_count(&self) -> u64 {
        self.fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_and_lifo() {
        let mut list = TaskListNormal::new(2);
        list.add(&[1, 2]);
        list.add(&[3, 4]);
        list.add(&[5, 6]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.peek_first(), Some(&[1u64, 2][..]));
        assert_eq!(list.peek_last(), Some(&[5u64, 6][..]));

        let mut out = [0u64; 2];
        assert!(list.fetch_first(&mut out));
        assert_eq!(out, [1, 2]);
        assert!(list.fetch_last(&mut out));
        assert_eq!(out, [5, 6]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.fetched_first_count(), 1);

        assert!(list.fetch_first(&mut out));
        assert_eq!(out, [3, 4]);
        assert!(list.is_empty());
        assert!(!list.fetch_first(&mut out));
        assert!(!list.fetch_last(&mut out));
    }
}
