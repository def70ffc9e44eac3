use super::*;
use std::ops::Bound;

fn seeded() -> MemoryBackend {
    let mut backend = MemoryBackend::new();
    let mut batch = WriteBatch::new();
    for key in [b"a", b"b", b"c", b"d"] {
        batch.put(key.to_vec(), key.to_vec());
    }
    backend.commit(batch).expect("memory commit");

    backend
}

fn keys(rows: &[(Vec<u8>, Vec<u8>)]) -> Vec<&[u8]> {
    rows.iter().map(|(k, _)| k.as_slice()).collect()
}

#[test]
fn scan_honours_bounds_direction_and_limit() {
    let backend = seeded();

    let rows = backend
        .scan(
            Bound::Included(b"b".as_slice()),
            Bound::Excluded(b"d".as_slice()),
            Direction::Asc,
            None,
        )
        .expect("scan");
    assert_eq!(keys(&rows), vec![b"b".as_slice(), b"c".as_slice()]);

    let rows = backend
        .scan(Bound::Unbounded, Bound::Unbounded, Direction::Desc, Some(2))
        .expect("scan");
    assert_eq!(keys(&rows), vec![b"d".as_slice(), b"c".as_slice()]);
}

#[test]
fn inverted_envelope_scans_empty_instead_of_panicking() {
    let backend = seeded();

    let rows = backend
        .scan(
            Bound::Included(b"c".as_slice()),
            Bound::Excluded(b"b".as_slice()),
            Direction::Asc,
            None,
        )
        .expect("scan");
    assert!(rows.is_empty());

    let rows = backend
        .scan(
            Bound::Excluded(b"c".as_slice()),
            Bound::Excluded(b"c".as_slice()),
            Direction::Desc,
            None,
        )
        .expect("scan");
    assert!(rows.is_empty());
}

#[test]
fn commit_applies_ops_in_order() {
    let mut backend = seeded();
    let mut batch = WriteBatch::new();
    batch.delete(b"a".to_vec());
    batch.put(b"a".to_vec(), b"again".to_vec());
    batch.delete(b"b".to_vec());
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.summary(), "3 ops (1 put, 2 delete)");

    backend.commit(batch).expect("commit");

    assert_eq!(backend.get(b"a").expect("get"), Some(b"again".to_vec()));
    assert_eq!(backend.get(b"b").expect("get"), None);
    assert_eq!(backend.len(), 3);
}

#[test]
fn backend_errors_map_to_backend_class() {
    let err: InternalError = BackendError::Write("disk full".to_string()).into();

    assert!(err.is_backend());
    assert_eq!(err.origin, ErrorOrigin::Store);
}
