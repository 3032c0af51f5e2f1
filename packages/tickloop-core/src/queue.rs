use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// A plain FIFO queue.
/// Ordering comes only from when items are inserted; the queue never reorders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Removes the front item. `None` on an empty queue.
    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Removes the first item matching `pred`, keeping the rest in order.
    pub fn remove_first(&mut self, pred: impl Fn(&T) -> bool) -> Option<T> {
        let index = self.items.iter().position(pred)?;
        self.items.remove(index)
    }
}

impl<T> FromIterator<T> for TaskQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// A LIFO stack. The scheduler never holds more than one frame, so the
/// single slot stays inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallStack<T> {
    frames: SmallVec<[T; 1]>,
}

impl<T> Default for CallStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CallStack<T> {
    pub fn new() -> Self {
        Self {
            frames: SmallVec::new(),
        }
    }

    pub fn push(&mut self, frame: T) {
        self.frames.push(frame);
    }

    /// `None` on an empty stack.
    pub fn pop(&mut self) -> Option<T> {
        self.frames.pop()
    }

    pub fn top(&self) -> Option<&T> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.frames.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.frames.iter()
    }
}
