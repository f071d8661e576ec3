mod common;

use common::{attrs, delta, doc};
use rich_delta::{compose, Delta, DeltaError, Operation};
use serde_json::json;

#[test]
fn compose_matrix() {
    let cases = [
        (
            "insert + insert",
            json!([{"insert": "A"}]),
            json!([{"insert": "B"}]),
            json!([{"insert": "BA"}]),
        ),
        (
            "insert + retain",
            json!([{"insert": "A"}]),
            json!([{"retain": 1, "attributes": {"bold": true, "color": "red", "font": null}}]),
            json!([{"insert": "A", "attributes": {"bold": true, "color": "red"}}]),
        ),
        (
            "insert + delete",
            json!([{"insert": "A"}]),
            json!([{"delete": 1}]),
            json!([]),
        ),
        (
            "delete + insert",
            json!([{"delete": 1}]),
            json!([{"insert": "B"}]),
            json!([{"insert": "B"}, {"delete": 1}]),
        ),
        (
            "delete + retain",
            json!([{"delete": 1}]),
            json!([{"retain": 1, "attributes": {"bold": true}}]),
            json!([{"delete": 1}, {"retain": 1, "attributes": {"bold": true}}]),
        ),
        (
            "delete + delete",
            json!([{"delete": 1}]),
            json!([{"delete": 1}]),
            json!([{"delete": 2}]),
        ),
        (
            "retain + insert",
            json!([{"retain": 1, "attributes": {"color": "blue"}}]),
            json!([{"insert": "B"}]),
            json!([{"insert": "B"}, {"retain": 1, "attributes": {"color": "blue"}}]),
        ),
        (
            "retain + retain",
            json!([{"retain": 1, "attributes": {"color": "blue"}}]),
            json!([{"retain": 1, "attributes": {"bold": true, "color": "red", "font": null}}]),
            json!([{"retain": 1, "attributes": {"bold": true, "color": "red", "font": null}}]),
        ),
        (
            "retain + delete",
            json!([{"retain": 1, "attributes": {"color": "blue"}}]),
            json!([{"delete": 1}]),
            json!([{"delete": 1}]),
        ),
        (
            "insert in middle of text",
            json!([{"insert": "Hello"}]),
            json!([{"retain": 3}, {"insert": "X"}]),
            json!([{"insert": "HelXlo"}]),
        ),
        (
            "insert and delete ordering",
            json!([{"insert": "Hello"}]),
            json!([{"retain": 3}, {"insert": "X"}, {"delete": 1}]),
            json!([{"insert": "HelXo"}]),
        ),
        (
            "insert embed",
            json!([{"insert": {"image": "a.png"}, "attributes": {"alt": "x"}}]),
            json!([{"retain": 1, "attributes": {"src": "b.png"}}]),
            json!([{"insert": {"image": "a.png"}, "attributes": {"alt": "x", "src": "b.png"}}]),
        ),
        (
            "delete entire text",
            json!([{"retain": 4}, {"insert": "Hello"}]),
            json!([{"delete": 9}]),
            json!([{"delete": 4}]),
        ),
        (
            "retain more than length of text",
            json!([{"insert": "Hello"}]),
            json!([{"retain": 10}]),
            json!([{"insert": "Hello"}]),
        ),
        (
            "remove attribute from insert",
            json!([{"insert": "A", "attributes": {"bold": true}}]),
            json!([{"retain": 1, "attributes": {"bold": null}}]),
            json!([{"insert": "A"}]),
        ),
        (
            "retain start optimisation",
            json!([
                {"insert": "A", "attributes": {"bold": true}},
                {"insert": "B"},
                {"insert": "C", "attributes": {"bold": true}},
                {"delete": 1}
            ]),
            json!([{"retain": 3}, {"insert": "D"}]),
            json!([
                {"insert": "A", "attributes": {"bold": true}},
                {"insert": "B"},
                {"insert": "C", "attributes": {"bold": true}},
                {"insert": "D"},
                {"delete": 1}
            ]),
        ),
    ];

    for (name, a, b, expected) in cases {
        let (a, b, expected) = (delta(a), delta(b), delta(expected));
        assert_eq!(compose(&a, &b).unwrap(), expected, "{name}");
    }
}

#[test]
fn compose_does_not_mutate_inputs() {
    let a = delta(json!([{"insert": "Test", "attributes": {"bold": true}}]));
    let b = delta(json!([{"retain": 1, "attributes": {"color": "red"}}, {"delete": 2}]));
    let (a_copy, b_copy) = (a.clone(), b.clone());
    let expected = delta(json!([
        {"insert": "T", "attributes": {"color": "red", "bold": true}},
        {"insert": "t", "attributes": {"bold": true}}
    ]));
    assert_eq!(a.compose(&b).unwrap(), expected);
    assert_eq!(a, a_copy);
    assert_eq!(b, b_copy);
}

#[test]
fn compose_retain_tombstone_reaches_base() {
    let bold = attrs(json!({"bold": true}));
    let unbold = attrs(json!({"bold": null}));
    let a = Delta::builder().retain(3, bold.clone()).build();
    let b = Delta::builder().retain(3, unbold.clone()).build();
    let composed = compose(&a, &b).unwrap();
    assert_eq!(composed, Delta::builder().retain(3, unbold).build());

    // Applied to already-bold text the composite must still remove bold.
    let base = Delta::builder().insert("abc", bold).build();
    let stepwise = b.apply(&a.apply(&base).unwrap()).unwrap();
    assert_eq!(composed.apply(&base).unwrap(), stepwise);
    assert_eq!(stepwise, doc("abc"));
}

#[test]
fn compose_identity() {
    let a = delta(json!([
        {"insert": "Hello", "attributes": {"bold": true}},
        {"insert": {"image": "x.png"}},
        {"insert": " world\n"}
    ]));
    let identity = Delta::builder().retain(a.length(), None).build();
    assert_eq!(compose(&a, &identity).unwrap(), a);
    assert_eq!(compose(&identity, &a).unwrap(), a);
}

#[test]
fn apply_rejects_edits_built_for_longer_documents() {
    let edit = delta(json!([{"retain": 5}, {"insert": "!"}]));
    assert_eq!(
        edit.apply(&doc("abc")),
        Err(DeltaError::LengthMismatch {
            expected: 3,
            actual: 5
        })
    );
    assert_eq!(edit.apply(&doc("Hello")).unwrap(), doc("Hello!"));
}

#[test]
fn compose_long_insert_against_many_short_retains() {
    // Each retain cuts one char off the same insert; the walk must not rescan
    // the text for every piece.
    let n = 100_000;
    let text: String = "aé€😀".chars().cycle().take(n).collect();
    let bold = attrs(json!({"bold": true}));
    let a = Delta::builder().insert(text.as_str(), None).build();
    let mut b = Delta::builder();
    let mut expected = Delta::builder();
    for (i, c) in text.chars().enumerate() {
        let formatted = (i % 2 == 0).then(|| bold.clone());
        b.push(Operation::retain(1).with_attributes(formatted.clone().unwrap_or_default()));
        expected.push(Operation::insert(c).with_attributes(formatted.unwrap_or_default()));
    }
    let (b, expected) = (b.build(), expected.build());
    let composed = compose(&a, &b).unwrap();
    assert_eq!(composed.ops().len(), n);
    assert_eq!(composed, expected);
    assert_eq!(b.apply(&a).unwrap(), expected);
    assert_eq!(b.invert(&a).unwrap().apply(&composed).unwrap(), a);
    assert_eq!(composed.slice(n - 3, None).unwrap().length(), 3);
}

#[test]
fn compose_does_not_check_lengths_but_apply_does() {
    let text = doc("ab");
    let edit = delta(json!([{"retain": 1}, {"delete": 5}]));
    assert_eq!(
        compose(&text, &edit).unwrap(),
        delta(json!([{"insert": "a"}, {"delete": 4}]))
    );
    assert_eq!(
        edit.apply(&text),
        Err(DeltaError::LengthMismatch {
            expected: 2,
            actual: 6
        })
    );
}
