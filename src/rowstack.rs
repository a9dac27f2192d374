//
// mtfract - rowstack.rs - Row Stack
//
// Copyright (c) 2018 Brion Vibber
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.
//
// Lives entirely on the master's single poll-loop thread (see net/master.rs),
// so unlike everything in pool.rs this needs no synchronization at all --
// a plain `Vec` used as a LIFO (spec.md 4.6).
//

/// Bounded LIFO of pending row indices. Rows are handed out to workers
/// last-pushed-first so a worker that reconnects after a fault gets
/// recently-orphaned rows before ones that were never dispatched.
#[derive(Debug)]
pub struct RowStack {
    rows: Vec<u32>,
    capacity: usize,
}

impl RowStack {
    pub fn new(capacity: usize) -> RowStack {
        RowStack {
            rows: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes `row`, failing if the stack is already at capacity.
    pub fn push(&mut self, row: u32) -> bool {
        if self.rows.len() >= self.capacity {
            return false;
        }
        self.rows.push(row);
        true
    }

    pub fn pop(&mut self) -> Option<u32> {
        self.rows.pop()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_reverse_push_order() {
        let mut s = RowStack::new(4);
        assert!(s.push(1));
        assert!(s.push(2));
        assert!(s.push(3));
        assert_eq!(s.pop(), Some(3));
        assert_eq!(s.pop(), Some(2));
        assert_eq!(s.pop(), Some(1));
        assert_eq!(s.pop(), None);
    }

    #[test]
    fn respects_capacity() {
        let mut s = RowStack::new(2);
        assert!(s.push(1));
        assert!(s.push(2));
        assert!(!s.push(3));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn reports_empty() {
        let mut s = RowStack::new(1);
        assert!(s.is_empty());
        s.push(5);
        assert!(!s.is_empty());
    }
}
