use super::*;

define_idx!(TestId);

#[test]
fn push_returns_sequential_indices() {
    let mut v: IndexVec<TestId, &str> = IndexVec::new();
    let a = v.push("a");
    let b = v.push("b");
    assert_eq!(a.index(), 0);
    assert_eq!(b.index(), 1);
    assert_eq!(v[a], "a");
    assert_eq!(v[b], "b");
}

#[test]
fn get_out_of_range_is_none() {
    let v: IndexVec<TestId, i32> = IndexVec::new();
    assert!(v.get(TestId(0)).is_none());
}

#[test]
fn iter_enumerated_matches_push_order() {
    let mut v: IndexVec<TestId, i32> = IndexVec::new();
    v.push(10);
    v.push(20);
    v.push(30);
    let collected: Vec<_> = v.iter_enumerated().map(|(i, x)| (i.index(), *x)).collect();
    assert_eq!(collected, vec![(0, 10), (1, 20), (2, 30)]);
}
