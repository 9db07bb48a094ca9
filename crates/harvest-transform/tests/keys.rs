use harvest_transform::{ProjectRecord, composite_key};
use proptest::prelude::*;

proptest! {
    #[test]
    fn distinct_parts_never_collide(
        a in prop::collection::vec("[a-c\\-\\\\]{0,4}", 1..4),
        b in prop::collection::vec("[a-c\\-\\\\]{0,4}", 1..4),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(composite_key(&a), composite_key(&b));
    }

    #[test]
    fn same_parts_same_key(parts in prop::collection::vec(".{0,8}", 0..5)) {
        prop_assert_eq!(composite_key(&parts), composite_key(parts.clone()));
    }
}

#[test]
fn key_does_not_depend_on_field_order_of_the_source() {
    let one: ProjectRecord = serde_json::from_str(
        r#"{"projectNumber": "P-1", "unit": "FG12", "title": "Surveillance"}"#,
    )
    .expect("parse");
    let two: ProjectRecord = serde_json::from_str(
        r#"{"title": "Surveillance", "unit": "FG12", "projectNumber": "P-1"}"#,
    )
    .expect("parse");
    let key = |record: &ProjectRecord| {
        composite_key([&record.project_number, &record.unit, &record.title])
    };
    assert_eq!(key(&one), key(&two));
    insta::assert_snapshot!(key(&one), @r"P\-1-FG12-Surveillance");
}
