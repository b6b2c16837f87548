use studydesk_core::{NewTask, Priority, ProgressBand, Task, TaskValidationError};

fn sample_task() -> Task {
    NewTask::new("Essay", "English", "2025-06-01")
        .with_priority(Priority::High)
        .with_progress(75)
        .into_task(|| "1717171717171".to_string())
        .unwrap()
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let task = sample_task();

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": "1717171717171",
            "title": "Essay",
            "course": "English",
            "deadline": "2025-06-01",
            "priority": "High",
            "progress": 75
        })
    );

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn deserialize_rejects_blank_title() {
    let value = serde_json::json!({
        "id": "1",
        "title": "  ",
        "course": "English",
        "deadline": "2025-06-01",
        "priority": "Low",
        "progress": 0
    });

    let err = serde_json::from_value::<Task>(value).unwrap_err();
    assert!(
        err.to_string().contains("task title"),
        "unexpected error: {err}"
    );
}

#[test]
fn missing_priority_reads_as_normal() {
    let value = serde_json::json!({
        "id": "1",
        "title": "Essay",
        "course": "English",
        "deadline": "2025-06-01",
        "progress": 10
    });

    let task: Task = serde_json::from_value(value).unwrap();
    assert_eq!(task.priority, Priority::Normal);
    assert_eq!(task.progress_band(), ProgressBand::Behind);
}

#[test]
fn draft_validation_reports_first_failing_field() {
    let err = NewTask::new("", "", "nope")
        .into_task(|| "x".to_string())
        .unwrap_err();
    assert_eq!(err, TaskValidationError::EmptyTitle);

    let err = NewTask::new("Essay", "English", "2025-13-01")
        .into_task(|| "x".to_string())
        .unwrap_err();
    assert_eq!(
        err,
        TaskValidationError::InvalidDeadline("2025-13-01".to_string())
    );
}
