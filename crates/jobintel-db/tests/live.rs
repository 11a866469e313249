//! Live integration tests for jobintel-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/jobintel-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::NaiveDate;
use jobintel_core::NormalizedJob;
use jobintel_db::{
    create_ingest_run, fail_ingest_run, finalize_ingest_run, get_ingest_run,
    insert_raw_job_if_new, link_skills, list_ingest_runs, list_job_skills, list_recent_jobs,
    skill_frequency, start_ingest_run, upsert_job, DbError, JobSearchFilter, RunCounters,
};

const ENV: &str = "test";

fn make_job(url: &str, title: &str, dedup_hash: &str) -> NormalizedJob {
    NormalizedJob {
        title: title.to_string(),
        company: Some("Acme".to_string()),
        location: Some("Remote".to_string()),
        url: url.to_string(),
        posted_at: NaiveDate::from_ymd_opt(2026, 8, 1),
        description: Some("Backend work".to_string()),
        dedup_hash: dedup_hash.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Section 1: Raw ingestion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn raw_insert_is_idempotent_on_content_hash(pool: sqlx::PgPool) {
    let payload = serde_json::json!({"title": "Backend Engineer", "company": "Acme"});

    let (first, was_new) = insert_raw_job_if_new(&pool, "remotive", &payload, "hash-1", ENV)
        .await
        .expect("first insert failed");
    assert!(was_new, "first insert should create the row");

    let (second, was_new) = insert_raw_job_if_new(&pool, "remotive", &payload, "hash-1", ENV)
        .await
        .expect("second insert failed");
    assert!(!was_new, "second insert should hit the existing row");
    assert_eq!(first.id, second.id);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM raw_jobs")
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn raw_insert_stores_payload_and_environment(pool: sqlx::PgPool) {
    let payload = serde_json::json!({"title": "Rust Engineer", "tags": ["rust"]});

    let (row, _) = insert_raw_job_if_new(&pool, "arbeitnow", &payload, "hash-2", ENV)
        .await
        .expect("insert failed");

    assert_eq!(row.source, "arbeitnow");
    assert_eq!(row.environment, ENV);
    assert_eq!(row.payload["title"], "Rust Engineer");
}

// ---------------------------------------------------------------------------
// Section 2: Job upserts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_job_dedups_by_url_and_updates_fields(pool: sqlx::PgPool) {
    let url = "https://example.com/jobs/1";

    let (first, was_new) = upsert_job(&pool, "remotive", &make_job(url, "Engineer", "h1"), ENV)
        .await
        .expect("first upsert failed");
    assert!(was_new);

    let (second, was_new) = upsert_job(
        &pool,
        "remotive",
        &make_job(url, "Senior Engineer", "h2"),
        ENV,
    )
    .await
    .expect("second upsert failed");
    assert!(!was_new, "same URL should update, not insert");
    assert_eq!(first.id, second.id);
    assert_eq!(second.title, "Senior Engineer");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_job_treats_hash_conflict_as_duplicate(pool: sqlx::PgPool) {
    let (first, _) = upsert_job(
        &pool,
        "remotive",
        &make_job("https://example.com/jobs/1", "Engineer", "same-hash"),
        ENV,
    )
    .await
    .expect("first upsert failed");

    // Same posting republished under a new URL: same dedup hash, new URL.
    let (second, was_new) = upsert_job(
        &pool,
        "remoteok",
        &make_job("https://example.com/jobs/2", "Engineer", "same-hash"),
        ENV,
    )
    .await
    .expect("hash-conflict upsert failed");

    assert!(!was_new);
    assert_eq!(first.id, second.id);
    assert_eq!(
        second.url, "https://example.com/jobs/1",
        "original row should be returned untouched"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn url_update_refreshes_the_dedup_hash(pool: sqlx::PgPool) {
    let url = "https://example.com/jobs/1";

    let (first, _) = upsert_job(&pool, "remotive", &make_job(url, "Engineer", "h1"), ENV)
        .await
        .expect("first upsert failed");

    // Title change on the same URL changes the posting's identity hash.
    let (updated, _) = upsert_job(&pool, "remotive", &make_job(url, "Senior Engineer", "h2"), ENV)
        .await
        .expect("update failed");
    assert_eq!(updated.dedup_hash, "h2", "hash must track the updated fields");

    // The updated posting republished under a new URL must still collide.
    let (dup, was_new) = upsert_job(
        &pool,
        "remoteok",
        &make_job("https://example.com/jobs/2", "Senior Engineer", "h2"),
        ENV,
    )
    .await
    .expect("republished upsert failed");

    assert!(!was_new, "stale hash would let a duplicate row in here");
    assert_eq!(dup.id, first.id);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn url_update_colliding_with_another_rows_hash_is_a_duplicate(pool: sqlx::PgPool) {
    let (_, _) = upsert_job(
        &pool,
        "remotive",
        &make_job("https://example.com/jobs/1", "Engineer", "h1"),
        ENV,
    )
    .await
    .expect("first upsert failed");
    let (owner, _) = upsert_job(
        &pool,
        "remotive",
        &make_job("https://example.com/jobs/2", "Senior Engineer", "h2"),
        ENV,
    )
    .await
    .expect("second upsert failed");

    // Updating URL 1 to the identity already stored at URL 2 must not
    // violate hash uniqueness; the existing hash owner is returned instead.
    let (row, was_new) = upsert_job(
        &pool,
        "remotive",
        &make_job("https://example.com/jobs/1", "Senior Engineer", "h2"),
        ENV,
    )
    .await
    .expect("colliding update failed");

    assert!(!was_new);
    assert_eq!(row.id, owner.id);

    // The URL 1 row is left untouched rather than half-updated.
    let title: String =
        sqlx::query_scalar("SELECT title FROM jobs WHERE url = 'https://example.com/jobs/1'")
            .fetch_one(&pool)
            .await
            .expect("fetch failed");
    assert_eq!(title, "Engineer");
}

// ---------------------------------------------------------------------------
// Section 3: Skill links
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn link_skills_is_idempotent_and_counts_new_links(pool: sqlx::PgPool) {
    let (job, _) = upsert_job(
        &pool,
        "remotive",
        &make_job("https://example.com/jobs/1", "Engineer", "h1"),
        ENV,
    )
    .await
    .expect("upsert failed");

    let inserted = link_skills(&pool, job.id, ["Rust", "Postgres"])
        .await
        .expect("first link failed");
    assert_eq!(inserted, 2);

    let inserted = link_skills(&pool, job.id, ["Rust", "Docker"])
        .await
        .expect("second link failed");
    assert_eq!(inserted, 1, "only the new skill should count");

    let skills = list_job_skills(&pool, job.id).await.expect("list failed");
    assert_eq!(skills, vec!["Docker", "Postgres", "Rust"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleting_a_job_cascades_to_its_skills(pool: sqlx::PgPool) {
    let (job, _) = upsert_job(
        &pool,
        "remotive",
        &make_job("https://example.com/jobs/1", "Engineer", "h1"),
        ENV,
    )
    .await
    .expect("upsert failed");
    link_skills(&pool, job.id, ["Rust"]).await.expect("link failed");

    sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(job.id)
        .execute(&pool)
        .await
        .expect("delete failed");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_skills")
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(count, 0);
}

// ---------------------------------------------------------------------------
// Section 4: Ingest run lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn ingest_run_lifecycle_pending_to_success(pool: sqlx::PgPool) {
    let sources = vec!["remotive".to_string(), "remoteok".to_string()];
    let run = create_ingest_run(&pool, &sources, Some("rust"), 100, ENV)
        .await
        .expect("create failed");

    assert_eq!(run.status, "pending");
    assert_eq!(run.sources, sources);
    assert!(run.started_at.is_none());
    assert!(run.finished_at.is_none());

    start_ingest_run(&pool, run.id).await.expect("start failed");

    let counters = RunCounters {
        fetched: 10,
        inserted_raw: 8,
        inserted_jobs: 6,
        updated_jobs: 2,
        inserted_skills: 14,
    };
    finalize_ingest_run(&pool, run.id, "success", counters, &[], None)
        .await
        .expect("finalize failed");

    let fetched = get_ingest_run(&pool, run.id).await.expect("get failed");
    assert_eq!(fetched.status, "success");
    assert!(fetched.started_at.is_some());
    assert!(fetched.finished_at.is_some());
    assert_eq!(fetched.fetched, 10);
    assert_eq!(fetched.inserted_raw, 8);
    assert_eq!(fetched.inserted_jobs, 6);
    assert_eq!(fetched.updated_jobs, 2);
    assert_eq!(fetched.inserted_skills, 14);
    assert!(fetched.error.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn ingest_run_records_warnings_on_partial_failure(pool: sqlx::PgPool) {
    let run = create_ingest_run(&pool, &["remotive".to_string()], None, 50, ENV)
        .await
        .expect("create failed");
    start_ingest_run(&pool, run.id).await.expect("start failed");

    let warnings = vec!["[remoteok] fetch failed: connection refused".to_string()];
    finalize_ingest_run(
        &pool,
        run.id,
        "partial_failure",
        RunCounters::default(),
        &warnings,
        None,
    )
    .await
    .expect("finalize failed");

    let fetched = get_ingest_run(&pool, run.id).await.expect("get failed");
    assert_eq!(fetched.status, "partial_failure");
    assert_eq!(fetched.warnings, warnings);
}

#[sqlx::test(migrations = "../../migrations")]
async fn start_rejects_non_pending_run(pool: sqlx::PgPool) {
    let run = create_ingest_run(&pool, &["remotive".to_string()], None, 50, ENV)
        .await
        .expect("create failed");
    start_ingest_run(&pool, run.id).await.expect("start failed");

    let err = start_ingest_run(&pool, run.id).await.unwrap_err();
    assert!(matches!(
        err,
        DbError::InvalidRunTransition { expected_status: "pending", .. }
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn finalize_rejects_run_that_never_started(pool: sqlx::PgPool) {
    let run = create_ingest_run(&pool, &["remotive".to_string()], None, 50, ENV)
        .await
        .expect("create failed");

    let err = finalize_ingest_run(&pool, run.id, "success", RunCounters::default(), &[], None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::InvalidRunTransition { expected_status: "running", .. }
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn fail_works_from_pending_and_running_but_not_terminal(pool: sqlx::PgPool) {
    let run = create_ingest_run(&pool, &["remotive".to_string()], None, 50, ENV)
        .await
        .expect("create failed");

    fail_ingest_run(&pool, run.id, "boom").await.expect("fail from pending");

    let fetched = get_ingest_run(&pool, run.id).await.expect("get failed");
    assert_eq!(fetched.status, "failed");
    assert_eq!(fetched.error.as_deref(), Some("boom"));

    // Terminal runs stay terminal.
    let err = fail_ingest_run(&pool, run.id, "again").await.unwrap_err();
    assert!(matches!(err, DbError::InvalidRunTransition { .. }));
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_ingest_runs_is_environment_scoped_and_newest_first(pool: sqlx::PgPool) {
    let first = create_ingest_run(&pool, &["remotive".to_string()], None, 50, ENV)
        .await
        .expect("create failed");
    let second = create_ingest_run(&pool, &["remoteok".to_string()], None, 50, ENV)
        .await
        .expect("create failed");
    create_ingest_run(&pool, &["remotive".to_string()], None, 50, "production")
        .await
        .expect("create failed");

    let runs = list_ingest_runs(&pool, ENV, 10).await.expect("list failed");
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].id, second.id);
    assert_eq!(runs[1].id, first.id);
}

// ---------------------------------------------------------------------------
// Section 5: Analytics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn skill_frequency_counts_and_orders_by_count(pool: sqlx::PgPool) {
    for (i, skills) in [vec!["Rust", "Postgres"], vec!["Rust"], vec!["Python"]]
        .iter()
        .enumerate()
    {
        let (job, _) = upsert_job(
            &pool,
            "remotive",
            &make_job(
                &format!("https://example.com/jobs/{i}"),
                &format!("Engineer {i}"),
                &format!("h{i}"),
            ),
            ENV,
        )
        .await
        .expect("upsert failed");
        link_skills(&pool, job.id, skills).await.expect("link failed");
    }

    let counts = skill_frequency(&pool, ENV, None, 10).await.expect("frequency failed");
    assert_eq!(counts[0].skill, "Rust");
    assert_eq!(counts[0].job_count, 2);
    assert_eq!(counts.len(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_recent_jobs_filters_by_skill_and_source(pool: sqlx::PgPool) {
    let (rust_job, _) = upsert_job(
        &pool,
        "remotive",
        &make_job("https://example.com/jobs/rust", "Rust Engineer", "h1"),
        ENV,
    )
    .await
    .expect("upsert failed");
    link_skills(&pool, rust_job.id, ["Rust", "Docker"]).await.expect("link failed");

    let (py_job, _) = upsert_job(
        &pool,
        "remoteok",
        &make_job("https://example.com/jobs/py", "Python Engineer", "h2"),
        ENV,
    )
    .await
    .expect("upsert failed");
    link_skills(&pool, py_job.id, ["Python"]).await.expect("link failed");

    let filter = JobSearchFilter {
        skill: Some("Rust".to_string()),
        ..JobSearchFilter::default()
    };
    let jobs = list_recent_jobs(&pool, ENV, &filter, 10).await.expect("list failed");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, "Rust Engineer");
    assert_eq!(jobs[0].skills, vec!["Docker", "Rust"]);

    let filter = JobSearchFilter {
        source: Some("remoteok".to_string()),
        ..JobSearchFilter::default()
    };
    let jobs = list_recent_jobs(&pool, ENV, &filter, 10).await.expect("list failed");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, "Python Engineer");
}
