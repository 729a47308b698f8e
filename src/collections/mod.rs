//! Generic collections used by the navigation searches.
//!
//! # Example
//!
//! ```rust
//! use waymark::collections::PriorityQueue;
//!
//! let mut queue = PriorityQueue::new();
//! queue.enqueue("far", 4.0);
//! queue.enqueue("near", 1.0);
//!
//! assert_eq!(queue.dequeue(), Some("near"));
//! assert_eq!(queue.size(), 1);
//! ```

pub mod priority_queue;


pub use priority_queue::PriorityQueue;
