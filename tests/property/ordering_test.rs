// tests/property/ordering_test.rs

//! Property-based tests for push/pop ordering of the uncapped collections.

use proptest::prelude::*;
use spinelqr::{Deque, ListStore, MemoryStore, Queue, Stack};
use std::sync::Arc;

fn store() -> Arc<dyn ListStore> {
    Arc::new(MemoryStore::new())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_deque_pushback_popfront_round_trip(element in ".{0,200}") {
        let deque = Deque::new("deque", store());
        tokio_test::block_on(async {
            deque.pushback(element.clone()).await.unwrap();
            assert_eq!(deque.popfront().await.unwrap(), Some(element));
            assert_eq!(deque.popfront().await.unwrap(), None);
        });
    }

    #[test]
    fn test_queue_is_fifo(elements in prop::collection::vec(".{0,50}", 0..50)) {
        let queue = Queue::new("queue", store());
        tokio_test::block_on(async {
            for e in &elements {
                queue.push(e.clone()).await.unwrap();
            }
            let mut popped = Vec::with_capacity(elements.len());
            for _ in 0..elements.len() {
                popped.push(queue.pop().await.unwrap().unwrap());
            }
            assert_eq!(popped, elements);
            assert_eq!(queue.pop().await.unwrap(), None);
        });
    }

    #[test]
    fn test_stack_is_lifo(elements in prop::collection::vec(".{0,50}", 0..50)) {
        let stack = Stack::new("stack", store());
        tokio_test::block_on(async {
            for e in &elements {
                stack.push(e.clone()).await.unwrap();
            }
            let mut popped = Vec::with_capacity(elements.len());
            while let Some(e) = stack.pop().await.unwrap() {
                popped.push(e);
            }
            let mut expected = elements.clone();
            expected.reverse();
            assert_eq!(popped, expected);
        });
    }

    #[test]
    fn test_elements_as_json_decodes_to_elements(
        elements in prop::collection::vec(any::<String>(), 0..30)
    ) {
        let deque = Deque::new("json", store());
        tokio_test::block_on(async {
            for (i, e) in elements.iter().enumerate() {
                if i % 2 == 0 {
                    deque.pushback(e.clone()).await.unwrap();
                } else {
                    deque.pushfront(e.clone()).await.unwrap();
                }
            }
            let listed = deque.elements().await.unwrap();
            let decoded: Vec<String> =
                serde_json::from_str(&deque.elements_as_json().await.unwrap()).unwrap();
            assert_eq!(decoded, listed);
            assert_eq!(listed.len(), elements.len());
        });
    }
}
