//! Persona selection against a scripted model.

use questioncrafter_core::fakes::ScriptedModel;
use questioncrafter_core::{
    select_personas, CrafterError, ModelError, PersonaCatalog, PersonaDefinition,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const QUESTION: &str = "How should I plan my career?";

fn catalog() -> PersonaCatalog {
    PersonaCatalog::from_definitions(["Ada", "Grace", "Alan"].map(|key| PersonaDefinition {
        role: format!("{key} role"),
        ..PersonaDefinition::stub(key)
    }))
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

const COMPLETE: &str = r#"{
    "persona1": "Ada",
    "persona2": "Grace",
    "persona3": "Alan",
    "rationale": {"Ada": "math", "Grace": "code", "Alan": "logic"}
}"#;

#[tokio::test]
async fn complete_reply_needs_one_call() {
    let model = ScriptedModel::with_texts([COMPLETE]);
    let selection = select_personas(&model, &catalog(), QUESTION, &mut rng())
        .await
        .unwrap();

    let names: Vec<_> = selection.personas.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Ada", "Grace", "Alan"]);
    assert_eq!(selection.personas[0].role, "Ada role");
    for persona in &selection.personas {
        assert!(!selection.rationale_for(persona).unwrap().is_empty());
    }
    assert_eq!(model.calls(), 1);

    let request = &model.requests()[0];
    assert!(request.expects_json);
    let prompt = request.last_prompt().unwrap();
    assert!(prompt.contains(QUESTION));
    assert!(prompt.contains("Ada, Grace, Alan"));
    assert!(prompt.contains("\"persona3\": string"));
}

#[tokio::test]
async fn fenced_reply_matches_bare_reply() {
    let bare = ScriptedModel::with_texts([COMPLETE]);
    let fenced = ScriptedModel::with_texts([format!("```json\n{COMPLETE}\n```")]);

    let a = select_personas(&bare, &catalog(), QUESTION, &mut rng())
        .await
        .unwrap();
    let b = select_personas(&fenced, &catalog(), QUESTION, &mut rng())
        .await
        .unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn payload_wrapped_under_output_is_accepted() {
    let wrapped = serde_json::json!({ "output": COMPLETE }).to_string();
    let model = ScriptedModel::with_texts([wrapped]);

    let selection = select_personas(&model, &catalog(), QUESTION, &mut rng())
        .await
        .unwrap();
    let expected = select_personas(
        &ScriptedModel::with_texts([COMPLETE]),
        &catalog(),
        QUESTION,
        &mut rng(),
    )
    .await
    .unwrap();
    assert_eq!(selection, expected);
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn missing_rationale_is_repaired() {
    let model = ScriptedModel::with_texts([
        r#"{"persona1": "Ada", "persona2": "Grace", "persona3": "Alan",
            "rationale": {"Grace": "code", "Alan": "logic"}}"#,
        r#"{"Ada": "because X"}"#,
    ]);
    let selection = select_personas(&model, &catalog(), QUESTION, &mut rng())
        .await
        .unwrap();

    assert_eq!(selection.rationales["Ada"], "because X");
    assert_eq!(selection.rationales["Grace"], "code");
    assert_eq!(selection.rationales["Alan"], "logic");
    assert_eq!(model.calls(), 2);

    let repair = model.requests()[1].last_prompt().unwrap().to_string();
    assert!(repair.contains("Ada"));
    assert!(!repair.contains("Grace"));
}

#[tokio::test]
async fn fenced_repair_reply_is_accepted() {
    let model = ScriptedModel::with_texts([
        r#"{"persona1": "Ada", "persona2": "Grace", "persona3": "Alan", "rationale": "n/a"}"#,
        "```json\n{\"Ada\": \"a\", \"Grace\": \"g\", \"Alan\": \"l\"}\n```",
    ]);
    let selection = select_personas(&model, &catalog(), QUESTION, &mut rng())
        .await
        .unwrap();
    assert_eq!(selection.rationales.len(), 3);
}

#[tokio::test]
async fn missing_slot_names_the_field() {
    let model = ScriptedModel::with_texts([
        r#"{"persona1": "Ada", "persona2": "Grace", "rationale": {}}"#,
    ]);
    let err = select_personas(&model, &catalog(), QUESTION, &mut rng())
        .await
        .unwrap_err();
    match err {
        CrafterError::MissingField { field } => assert_eq!(field, "persona3"),
        other => panic!("expected MissingField, got {other:?}"),
    }
}

#[tokio::test]
async fn prose_reply_is_a_schema_error() {
    let model = ScriptedModel::with_texts(["I would pick Ada, Grace and Alan."]);
    let err = select_personas(&model, &catalog(), QUESTION, &mut rng())
        .await
        .unwrap_err();
    assert!(matches!(err, CrafterError::SchemaParse { .. }));
}

#[tokio::test]
async fn unparsable_repair_fails() {
    let model = ScriptedModel::with_texts([
        r#"{"persona1": "Ada", "persona2": "Grace", "persona3": "Alan",
            "rationale": {"Grace": "code", "Alan": "logic"}}"#,
        "Ada is great at math.",
    ]);
    let err = select_personas(&model, &catalog(), QUESTION, &mut rng())
        .await
        .unwrap_err();
    assert!(matches!(err, CrafterError::RepairFailure { .. }));
}

#[tokio::test]
async fn incomplete_repair_fails() {
    let model = ScriptedModel::with_texts([
        r#"{"persona1": "Ada", "persona2": "Grace", "persona3": "Alan",
            "rationale": {"Alan": "logic"}}"#,
        r#"{"Grace": "code"}"#,
    ]);
    let err = select_personas(&model, &catalog(), QUESTION, &mut rng())
        .await
        .unwrap_err();
    match err {
        CrafterError::RepairFailure { reason } => assert!(reason.contains("Ada")),
        other => panic!("expected RepairFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn invented_persona_is_replaced() {
    let catalog = catalog();
    let model = ScriptedModel::with_texts([
        r#"{"persona1": "Ada", "persona2": "Grace", "persona3": "Nobody",
            "rationale": {"Ada": "a", "Grace": "g", "Alan": "l", "Nobody": "n"}}"#,
    ]);
    let selection = select_personas(&model, &catalog, QUESTION, &mut rng())
        .await
        .unwrap();

    assert_eq!(selection.personas.len(), 3);
    let third = &selection.personas[2].original_role;
    assert!(catalog.contains(third));
    assert!(selection.rationale_for(&selection.personas[2]).is_some());
}

#[tokio::test]
async fn model_failure_is_upstream() {
    let model = ScriptedModel::new();
    model.push_error(ModelError::Status {
        status: 500,
        body: "boom".to_string(),
    });
    let err = select_personas(&model, &catalog(), QUESTION, &mut rng())
        .await
        .unwrap_err();
    assert!(matches!(err, CrafterError::Upstream(_)));
}

#[tokio::test]
async fn records_carry_rationales() {
    let model = ScriptedModel::with_texts([COMPLETE]);
    let records = select_personas(&model, &catalog(), QUESTION, &mut rng())
        .await
        .unwrap()
        .to_records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].name(), "Grace");
    assert_eq!(records[1].rationale, "code");
}
