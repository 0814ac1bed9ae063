//! Queries from many OS threads on the first use of an entity type

use registrar::prelude::*;
use registrar::query::execute;
use std::sync::{Arc, Barrier};
use std::thread;

// Not referenced by any other test in this binary, so the accessor table
// is built inside the threads below.
impl_queryable_entity!(Locker, "locker", ["label"], {
    label: String,
    floor: i32,
});

#[test]
fn test_first_use_from_many_threads() {
    const THREADS: usize = 8;

    let source: Arc<Vec<Locker>> = Arc::new(
        ["b", "a", "c", "a", "e"]
            .iter()
            .enumerate()
            .map(|(floor, label)| Locker::new(label.to_string(), floor as i32))
            .collect(),
    );
    let expected_ids = vec![source[1].id, source[3].id, source[0].id];
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let source = Arc::clone(&source);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let schema = Locker::schema() as *const EntitySchema<Locker> as usize;
                let query =
                    ListQuery::new(PageRequest::new(1, 3).unwrap()).sort(SortSpec::asc("label"));
                let page = execute(source.iter().cloned(), &query).unwrap();
                (schema, page)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let first_schema = results[0].0;
    for (schema, page) in &results {
        assert_eq!(*schema, first_schema);
        let labels: Vec<_> = page.items.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "a", "b"]);
        let ids: Vec<Uuid> = page.items.iter().map(|l| l.id).collect();
        assert_eq!(ids, expected_ids);
        assert_eq!(page.meta.total, 5);
    }
    assert!(std::ptr::eq(Locker::schema(), first_schema as *const EntitySchema<Locker>));
}
