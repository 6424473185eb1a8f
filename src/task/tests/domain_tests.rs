//! Tests for wire decoding, field coercion and queue entries.

use crate::task::domain::{
    DataField, FieldMode, FieldType, FieldValue, PropertyTree, QueueElement, Step, StepAction,
    TaskDomainError, ValidationError,
};
use rstest::rstest;
use serde_json::{json, Value};

use super::fixtures::queue;

#[rstest]
#[case(json!(1), FieldType::Integer)]
#[case(json!(2), FieldType::Text)]
#[case(json!(16), FieldType::DateTime)]
#[case(json!("time"), FieldType::DateTime)]
#[case(json!(8), FieldType::Unsupported(8))]
fn field_type_decodes_codes_and_names(#[case] wire: Value, #[case] expected: FieldType) {
    let decoded: FieldType = serde_json::from_value(wire).expect("decodable type");
    assert_eq!(decoded, expected);
}

#[rstest]
fn unsupported_field_type_keeps_its_code_on_the_wire() {
    let encoded = serde_json::to_value(FieldType::Unsupported(8)).expect("encodable type");
    assert_eq!(encoded, json!(8));
}

#[rstest]
fn data_field_without_mode_is_read_write() {
    let field: DataField =
        serde_json::from_value(json!({"type": 2, "value": "x"})).expect("decodable field");

    assert_eq!(field.mode(), FieldMode::READ_WRITE);
    assert!(field.mode().is_writable());
}

#[rstest]
#[case(FieldMode::READ, false)]
#[case(FieldMode::WRITE, true)]
#[case(FieldMode::READ_WRITE, true)]
fn only_modes_with_the_write_bit_are_writable(#[case] mode: FieldMode, #[case] writable: bool) {
    assert_eq!(mode.is_writable(), writable);
}

#[rstest]
fn date_time_values_are_normalised_to_utc() {
    let value = FieldValue::coerce("Deadline", FieldType::DateTime, &json!("2026-10-18T11:30:00+02:00"))
        .expect("valid date");

    assert_eq!(value.to_json(), json!("2026-10-18T09:30:00Z"));
}

#[rstest]
#[case(FieldType::Integer, json!("5"))]
#[case(FieldType::Integer, json!(2.5))]
#[case(FieldType::Text, json!(5))]
#[case(FieldType::DateTime, json!("18/10/2026"))]
fn mismatched_values_are_rejected(#[case] declared: FieldType, #[case] input: Value) {
    let result = FieldValue::coerce("Field", declared, &input);

    assert_eq!(
        result,
        Err(ValidationError::FieldType {
            field: "Field".to_owned(),
            expected: declared,
        })
    );
}

#[rstest]
fn unsupported_types_cannot_be_written() {
    let result = FieldValue::coerce("Blob", FieldType::Unsupported(8), &json!("x"));

    assert!(matches!(
        result,
        Err(ValidationError::UnsupportedFieldType { code: 8, .. })
    ));
}

#[rstest]
fn step_round_trip_preserves_unmodelled_members() {
    let wire = json!({
        "stepName": "Review",
        "systemProperties": {
            "workObjectNumber": "A1B2",
            "canReassign": true,
            "responses": null,
            "queueName": "Inbox"
        },
        "dataFields": {
            "Amount": {"type": 1, "value": 5, "mode": 3, "desc": "Claim amount"}
        },
        "workflowGroups": null
    });

    let step: Step = serde_json::from_value(wire).expect("decodable step");
    let encoded = serde_json::to_value(&step).expect("encodable step");

    assert!(step.system_properties().responses().is_empty());
    assert!(step.workflow_groups().is_empty());
    assert_eq!(encoded["stepName"], json!("Review"));
    assert_eq!(encoded["systemProperties"]["queueName"], json!("Inbox"));
    assert_eq!(encoded["dataFields"]["Amount"]["desc"], json!("Claim amount"));
}

#[rstest]
fn empty_comment_reads_as_absent() {
    let step: Step = serde_json::from_value(json!({"systemProperties": {"comment": ""}}))
        .expect("decodable step");

    assert_eq!(step.system_properties().comment(), None);
}

#[rstest]
fn blank_selected_response_still_requires_one() {
    let step: Step = serde_json::from_value(json!({
        "systemProperties": {"responses": ["Approve"], "selectedResponse": ""}
    }))
    .expect("decodable step");

    assert_eq!(step.system_properties().selected_response(), None);
    assert!(step.system_properties().requires_response());
}

#[rstest]
fn reassign_action_names_its_participant() {
    let action = StepAction::Reassign {
        participant: "alice".to_owned(),
    };

    assert_eq!(
        action.query_pairs(),
        vec![
            ("action", "reassign".to_owned()),
            ("participant", "alice".to_owned())
        ]
    );
    assert!(!action.carries_body());
}

#[rstest]
fn queue_element_converts_to_task() {
    let element: QueueElement = serde_json::from_value(json!({
        "workObjectNumber": " 5F3C ",
        "stepElement": "queues/Inbox/stepelements/9",
        "ETag": "\"4\"",
        "subject": "Claim 17",
        "milestones": "workobjects/5F3C/milestones"
    }))
    .expect("decodable element");

    let task = element.to_task(&queue("Inbox")).expect("complete element");

    assert_eq!(task.work_object_number().as_str(), "5F3C");
    assert_eq!(task.queue_name().as_str(), "Inbox");
    assert_eq!(task.version_token().map(|token| token.as_str()), Some("\"4\""));
    assert_eq!(task.subject(), Some("Claim 17"));
    assert_eq!(task.milestones(), Some("workobjects/5F3C/milestones"));
}

#[rstest]
fn queue_element_without_step_uri_is_incomplete() {
    let element = QueueElement {
        work_object_number: Some("5F3C".to_owned()),
        ..QueueElement::default()
    };

    assert_eq!(
        element.to_task(&queue("Inbox")),
        Err(TaskDomainError::IncompleteQueueElement("stepElement"))
    );
}

#[rstest]
fn property_tree_lists_leaves_with_paths() {
    let tree = PropertyTree::from_json(&json!({
        "systemProperties": {"comment": "ok", "canReassign": false},
        "stepName": "Review"
    }));

    let paths: Vec<String> = tree.leaves().into_iter().map(|(path, _)| path).collect();

    assert!(paths.contains(&"systemProperties.comment".to_owned()));
    assert!(paths.contains(&"stepName".to_owned()));
    assert_eq!(tree.lookup("systemProperties"), None);
}
