use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

#[declsynth::hashable_existential(access = Public)]
#[declsynth::hashable_optional_existential(access = Public)]
#[declsynth::hashable_mutable_existential(access = Public)]
#[declsynth::hashable_mutable_optional_existential(access = Public)]
#[declsynth::hashable_sequence_of_existential(access = Public)]
#[declsynth::hashable_mutable_sequence_of_existential(access = Public)]
pub trait Shape: declsynth::DynamicHashable {
    fn area(&self) -> u32;
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct Square {
    side: u32,
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct Rect {
    w: u32,
    h: u32,
}

/// Same layout as `Square`, different type.
#[derive(Debug, PartialEq, Eq, Hash)]
struct Tile {
    side: u32,
}

impl Shape for Square {
    fn area(&self) -> u32 {
        self.side * self.side
    }
}

impl Shape for Rect {
    fn area(&self) -> u32 {
        self.w * self.h
    }
}

impl Shape for Tile {
    fn area(&self) -> u32 {
        self.side * self.side
    }
}

fn square(side: u32) -> Box<dyn Shape> {
    Box::new(Square { side })
}

fn rect(w: u32, h: u32) -> Box<dyn Shape> {
    Box::new(Rect { w, h })
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut h = DefaultHasher::new();
    value.hash(&mut h);
    h.finish()
}

#[test]
fn single_compares_by_value_and_concrete_type() {
    let a = HashableShape::new(square(2));
    let b = HashableShape::new(square(2));
    let c = HashableShape::new(square(3));
    let d = HashableShape::new(Box::new(Tile { side: 2 }));

    assert!(a == b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert!(a != c);
    assert!(a != d, "equal fields of different types must not compare equal");
    assert_eq!(a.area(), 4);
}

#[test]
fn wrappers_deduplicate_in_hash_sets() {
    let mut set = HashSet::new();
    set.insert(HashableShape::new(square(1)));
    set.insert(HashableShape::new(square(1)));
    set.insert(HashableShape::new(Box::new(Tile { side: 1 })));
    set.insert(HashableShape::new(rect(1, 1)));
    assert_eq!(set.len(), 3);
}

#[test]
fn optional_absent_and_present() {
    let none_a = HashableOptionalShape::new(None);
    let none_b = HashableOptionalShape::new(None);
    let some = HashableOptionalShape::new(Some(square(2)));
    let same = HashableOptionalShape::new(Some(square(2)));

    assert!(none_a == none_b);
    assert_eq!(hash_of(&none_a), hash_of(&none_b));
    assert!(none_a != some);
    assert!(some != none_a);
    assert!(some == same);
    assert_eq!(hash_of(&some), hash_of(&same));
    assert!(none_a.is_none());
}

#[test]
fn sequence_length_matters() {
    let one = HashableSequenceOfShape::new(vec![square(1)]);
    let empty = HashableSequenceOfShape::new(Vec::new());
    assert!(one != empty);
    assert!(empty != one);

    let prefix = HashableSequenceOfShape::new(vec![square(1), square(2)]);
    let longer = HashableSequenceOfShape::new(vec![square(1), square(2), square(3)]);
    assert!(prefix != longer);
    assert!(longer != prefix);
}

#[test]
fn sequence_of_dynamically_equal_elements() {
    let a = HashableSequenceOfShape::new(vec![square(1), rect(2, 3)]);
    let b = HashableSequenceOfShape::new(vec![square(1), rect(2, 3)]);
    assert!(a == b);
    assert_eq!(hash_of(&a), hash_of(&b));

    let swapped = HashableSequenceOfShape::new(vec![rect(2, 3), square(1)]);
    assert!(a != swapped);

    let total: u32 = a.iter().map(|s| s.area()).sum();
    assert_eq!(total, 7);
}

#[test]
fn mutable_wrappers_deref_mut() {
    let mut single = HashableMutableShape::new(square(1));
    *single = square(5);
    assert_eq!(single.area(), 25);

    let mut optional = HashableMutableOptionalShape::new(None);
    assert!(optional.is_none());
    *optional = Some(square(2));
    assert!(optional == HashableMutableOptionalShape::new(Some(square(2))));

    let mut seq = HashableMutableSequenceOfShape::new(Vec::new());
    seq.push(square(1));
    seq.push(square(2));
    assert_eq!(seq.len(), 2);
    assert!(seq == HashableMutableSequenceOfShape::new(vec![square(1), square(2)]));
}

#[test]
fn projected_value_is_self() {
    let w = HashableShape::new(square(1));
    assert!(std::ptr::eq(w.projected_value(), &w));
}

#[test]
fn immutable_wrappers_expose_a_read_only_value() {
    let w = HashableShape::new(square(3));
    assert_eq!(w.wrapped_value().area(), 9);
    let s = HashableSequenceOfShape::new(vec![square(1), rect(1, 2)]);
    assert_eq!(s.wrapped_value().len(), 2);
}

mod restricted {
    #[declsynth::hashable_sequence_of_existential]
    #[declsynth::hashable_mutable_existential]
    pub(crate) trait Marker: declsynth::DynamicHashable {}

    #[derive(PartialEq, Eq, Hash)]
    pub(crate) struct Flag(pub(crate) bool);

    impl Marker for Flag {}

    pub(crate) fn flag(on: bool) -> Box<dyn Marker> {
        Box::new(Flag(on))
    }
}

#[test]
fn restricted_immutable_wrapper_is_built_with_new() {
    use restricted::{flag, HashableSequenceOfMarker};

    let a = HashableSequenceOfMarker::new(vec![flag(true)]);
    let b = HashableSequenceOfMarker::new(vec![flag(true)]);
    let c = HashableSequenceOfMarker::new(vec![flag(false)]);
    assert!(a == b);
    assert!(a != c);
    assert_eq!(a.wrapped_value().len(), 1);
}

#[test]
fn restricted_mutable_wrapper_is_built_with_a_struct_literal() {
    use restricted::{flag, HashableMutableMarker};

    let mut m = HashableMutableMarker {
        wrapped_value: flag(false),
    };
    assert!(m != HashableMutableMarker { wrapped_value: flag(true) });
    m.wrapped_value = flag(true);
    assert!(m == HashableMutableMarker { wrapped_value: flag(true) });
}
