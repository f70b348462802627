use brief_wizard::core::database::NewBrief;
use brief_wizard::core::Database;
use brief_wizard::SessionId;

fn brief(session_id: SessionId, title: &str, markdown: &str) -> NewBrief {
    NewBrief {
        session_id,
        title: Some(title.to_string()),
        language: "fr".to_string(),
        seniority: "Senior".to_string(),
        sections: vec!["titre_job_family".to_string(), "contexte".to_string()],
        markdown: markdown.to_string(),
    }
}

#[tokio::test]
async fn test_archive_creates_database_and_stores_brief() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("briefs.db");

    let db = Database::new(&db_path).await.unwrap();
    assert!(db_path.exists());

    let session = SessionId::new();
    let saved = db
        .briefs()
        .save(&brief(session, "Développeur Rust", "# Développeur Rust"))
        .await
        .unwrap();

    assert_eq!(saved.session_id, session.to_string());
    assert_eq!(saved.section_slugs(), vec!["titre_job_family", "contexte"]);

    let found = db
        .briefs()
        .find_by_session(&session.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.markdown, "# Développeur Rust");
    assert_eq!(found.title.as_deref(), Some("Développeur Rust"));

    assert!(db.briefs().find_by_session("unknown").await.unwrap().is_none());
}

#[tokio::test]
async fn test_saving_same_session_keeps_latest_document() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(&dir.path().join("briefs.db")).await.unwrap();

    let session = SessionId::new();
    db.briefs().save(&brief(session, "Dev", "v1")).await.unwrap();
    db.briefs().save(&brief(session, "Lead Dev", "v2")).await.unwrap();

    let all = db.briefs().list(10).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].markdown, "v2");
    assert_eq!(all[0].title.as_deref(), Some("Lead Dev"));
}

#[tokio::test]
async fn test_list_is_most_recent_first_and_limited() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(&dir.path().join("briefs.db")).await.unwrap();

    let first = SessionId::new();
    let second = SessionId::new();
    let third = SessionId::new();
    db.briefs().save(&brief(first, "A", "a")).await.unwrap();
    db.briefs().save(&brief(second, "B", "b")).await.unwrap();
    db.briefs().save(&brief(third, "C", "c")).await.unwrap();

    let latest = db.briefs().list(2).await.unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].session_id, third.to_string());
    assert_eq!(latest[1].session_id, second.to_string());
}
