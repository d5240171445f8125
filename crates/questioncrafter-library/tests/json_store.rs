//! File-backed library store behaviour.

use questioncrafter_core::IndividualAnswer;
use questioncrafter_library::{
    EntryStatus, JsonFileLibrary, LibraryError, LibraryStore, NewComment, NewLibraryEntry,
    SubmittedAnswer, SubmittedAnswers,
};

fn make_store() -> (tempfile::TempDir, JsonFileLibrary) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileLibrary::new(dir.path().join("library_entries.json"));
    (dir, store)
}

fn career_entry() -> NewLibraryEntry {
    let mut entry = NewLibraryEntry::new(
        "How should I plan my career?",
        "What work would you keep choosing, and how could you test it cheaply?",
        vec!["Ada".into(), "Grace".into(), "Alan".into()],
    );
    entry.category = "Career".into();
    entry.best_answer = Some("Run small experiments.".into());
    entry.individual_answers = SubmittedAnswers::List(vec![
        SubmittedAnswer::Named(IndividualAnswer::new("Grace", "ship")),
        SubmittedAnswer::Text("loose answer".into()),
    ]);
    entry
}

#[tokio::test]
async fn submit_creates_the_file() {
    let (_dir, store) = make_store();
    assert!(store.list().await.unwrap().is_empty());

    let id = store.submit(career_entry()).await.unwrap();
    assert!(store.path().exists());

    let entries = store.list().await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.id, id);
    assert_eq!(entry.status, EntryStatus::User);
    assert_eq!(entry.individual_answers[1].name, "Ada");
    assert_eq!(
        entry.podcast.summary,
        "A question was transformed using the following experts: Ada, Grace, Alan. \
         The refinement focuses on career aspects."
    );
}

#[tokio::test]
async fn file_uses_camel_case_document_layout() {
    let (_dir, store) = make_store();
    store.submit(career_entry()).await.unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &value["entries"][0];
    assert_eq!(entry["originalQuestion"], "How should I plan my career?");
    assert_eq!(entry["bestAnswer"], "Run small experiments.");
    assert_eq!(entry["commentList"], serde_json::json!([]));
    assert_eq!(entry["status"], "user");
}

#[tokio::test]
async fn get_counts_views_persistently() {
    let (_dir, store) = make_store();
    let id = store.submit(career_entry()).await.unwrap();

    assert_eq!(store.get(id).await.unwrap().views, 1);
    assert_eq!(store.get(id).await.unwrap().views, 2);
    assert_eq!(store.list().await.unwrap()[0].views, 2);
}

#[tokio::test]
async fn upvote_counts_vote_and_view() {
    let (_dir, store) = make_store();
    let id = store.submit(career_entry()).await.unwrap();

    let entry = store.upvote(id).await.unwrap();
    assert_eq!((entry.votes, entry.views), (1, 1));
}

#[tokio::test]
async fn comments_are_persisted() {
    let (_dir, store) = make_store();
    let id = store.submit(career_entry()).await.unwrap();

    let mut comment = NewComment::new(id, "Helpful reframing");
    comment.author = "Sam".into();
    store.comment(comment).await.unwrap();
    store.comment(NewComment::new(id, "+1")).await.unwrap();

    let entry = &store.list().await.unwrap()[0];
    assert_eq!(entry.comments, 2);
    assert_eq!(entry.comment_list[0].author, "Sam");
    assert_eq!(entry.comment_list[1].author, "Anonymous");
    assert_ne!(entry.comment_list[0].id, entry.comment_list[1].id);
}

#[tokio::test]
async fn edits_without_a_file_are_not_found() {
    let (_dir, store) = make_store();
    assert!(store.get(1).await.unwrap_err().is_not_found());
    assert!(store.upvote(1).await.unwrap_err().is_not_found());
    assert!(store
        .comment(NewComment::new(1, "hi"))
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (_dir, store) = make_store();
    let id = store.submit(career_entry()).await.unwrap();
    assert!(matches!(
        store.upvote(id + 10).await,
        Err(LibraryError::NotFound { .. })
    ));
}

#[tokio::test]
async fn corrupt_file_lists_empty_and_rejects_edits() {
    let (_dir, store) = make_store();
    std::fs::write(store.path(), "{ this is not json").unwrap();

    assert!(store.list().await.unwrap().is_empty());
    assert!(matches!(
        store.upvote(1).await,
        Err(LibraryError::Corrupt(_))
    ));

    let id = store.submit(career_entry()).await.unwrap();
    assert_eq!(store.list().await.unwrap()[0].id, id);
}

#[tokio::test]
async fn rapid_submissions_get_unique_ids() {
    let (_dir, store) = make_store();
    let a = store.submit(career_entry()).await.unwrap();
    let b = store.submit(career_entry()).await.unwrap();
    assert_ne!(a, b);
}
