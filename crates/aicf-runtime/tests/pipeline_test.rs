use aicf_providers::SourceRoots;
use aicf_runtime::ops::{InitMode, init};
use aicf_runtime::{CycleOptions, run_cycle};
use aicf_store::{StoreLayout, session};
use aicf_testing::{TestWorld, augment_exchange, claude_events, seed_augment_store, seed_claude_session};
use aicf_types::{Source, Tier};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

fn roots_for(world: &TestWorld) -> SourceRoots {
    SourceRoots {
        augment_storage_roots: vec![world.vscode_storage_root().unwrap()],
        claude_projects_root: world.claude_projects_root().unwrap(),
        claude_desktop_roots: vec![world.desktop_root().unwrap()],
        warp_db_paths: vec![world.warp_db_path()],
    }
}

fn init_project(project: &Path, sources: Vec<Source>, roots: &SourceRoots) {
    init(project, InitMode::Manual(sources), false, roots).unwrap();
}

fn options(roots: &SourceRoots, today: &str) -> CycleOptions {
    CycleOptions {
        sources: None,
        today: Some(NaiveDate::parse_from_str(today, "%Y-%m-%d").unwrap()),
        roots: Some(roots.clone()),
    }
}

fn session_path(project: &Path, date: &str) -> PathBuf {
    StoreLayout::new(project)
        .tier_dir(Tier::Sessions)
        .join(format!("{}-session.aicf", date))
}

#[test]
fn test_s1_happy_path_two_exchanges_one_session() {
    let world = TestWorld::new().unwrap();
    let project = world.project_dir("alpha").unwrap();
    let roots = roots_for(&world);

    seed_augment_store(
        &world.vscode_storage_root().unwrap(),
        "ws-alpha",
        &project,
        &[
            augment_exchange(
                "c-1",
                "2025-10-21T09:00:00Z",
                "implement the session consolidation",
                "Implemented session consolidation with per-day grouping.",
            ),
            augment_exchange(
                "c-2",
                "2025-10-21T10:00:00Z",
                "add workspace isolation tests",
                "Added the isolation tests.",
            ),
        ],
    )
    .unwrap();

    init_project(&project, vec![Source::Augment], &roots);
    let report = run_cycle(&project, &options(&roots, "2025-10-21")).unwrap();

    let augment = report
        .sources
        .iter()
        .find(|s| s.source == Source::Augment)
        .unwrap();
    assert_eq!(augment.records_read, 2);
    assert_eq!(augment.staged, 2);
    assert_eq!(report.consolidation.materialized, 2);
    assert_eq!(report.sessions.files_written, 1);

    let text = std::fs::read_to_string(session_path(&project, "2025-10-21")).unwrap();
    assert!(text.contains("- Total conversations: 2"));
    assert!(text.contains("- Unique conversations: 2"));
    assert!(text.contains("- Duplicates removed: 0"));

    // recent/ fully absorbed, cache fully drained
    let layout = StoreLayout::new(&project);
    assert_eq!(std::fs::read_dir(layout.recent_dir()).unwrap().count(), 0);
    assert!(aicf_store::list_staged(&layout).unwrap().chunks.is_empty());
}

#[test]
fn test_s2_duplicate_capture_is_suppressed() {
    let world = TestWorld::new().unwrap();
    let project = world.project_dir("alpha").unwrap();
    let roots = roots_for(&world);

    seed_augment_store(
        &world.vscode_storage_root().unwrap(),
        "ws-alpha",
        &project,
        &[augment_exchange(
            "c-1",
            "2025-10-21T09:00:00Z",
            "repeat the capture",
            "Same payload twice.",
        )],
    )
    .unwrap();

    init_project(&project, vec![Source::Augment], &roots);
    run_cycle(&project, &options(&roots, "2025-10-21")).unwrap();

    // Second cycle re-reads the same store: everything is a duplicate.
    let report = run_cycle(&project, &options(&roots, "2025-10-21")).unwrap();
    let augment = report
        .sources
        .iter()
        .find(|s| s.source == Source::Augment)
        .unwrap();
    assert_eq!(augment.records_read, 1);
    assert_eq!(augment.staged, 0);
    assert_eq!(augment.duplicates + report.consolidation.duplicates, 1);

    let text = std::fs::read_to_string(session_path(&project, "2025-10-21")).unwrap();
    assert!(text.contains("- Unique conversations: 1"));
}

#[test]
fn test_s3_no_cross_workspace_leak() {
    let world = TestWorld::new().unwrap();
    let alpha = world.project_dir("alpha").unwrap();
    let experiments = world.project_dir("alpha-experiments").unwrap();
    let roots = roots_for(&world);

    seed_augment_store(
        &world.vscode_storage_root().unwrap(),
        "ws-alpha",
        &alpha,
        &[augment_exchange(
            "alpha-conv",
            "2025-10-21T09:00:00Z",
            "work inside alpha",
            "Done inside alpha.",
        )],
    )
    .unwrap();
    seed_augment_store(
        &world.vscode_storage_root().unwrap(),
        "ws-exp",
        &experiments,
        &[augment_exchange(
            "experiments-conv",
            "2025-10-21T09:30:00Z",
            "work inside alpha-experiments",
            "Done elsewhere.",
        )],
    )
    .unwrap();

    init_project(&alpha, vec![Source::Augment], &roots);
    run_cycle(&alpha, &options(&roots, "2025-10-21")).unwrap();

    // Nothing anywhere under alpha's store may reference the neighbour.
    let layout = StoreLayout::new(&alpha);
    for entry in walk_files(&layout.aicf_dir()) {
        let text = std::fs::read_to_string(&entry).unwrap_or_default();
        assert!(
            !text.contains("experiments"),
            "leak in {}",
            entry.display()
        );
    }
}

#[test]
fn test_multi_source_cycle() {
    let world = TestWorld::new().unwrap();
    let project = world.project_dir("alpha").unwrap();
    let roots = roots_for(&world);

    seed_augment_store(
        &world.vscode_storage_root().unwrap(),
        "ws-alpha",
        &project,
        &[augment_exchange(
            "aug-1",
            "2025-10-21T09:00:00Z",
            "augment-side work",
            "Implemented the augment part.",
        )],
    )
    .unwrap();
    seed_claude_session(
        &world.claude_projects_root().unwrap(),
        &project,
        "cli-session",
        &claude_events(
            "cli-session",
            &project,
            "2025-10-21T11:00:00Z",
            "cli-side work on the parser",
            "Fixed the parser.",
        ),
    )
    .unwrap();

    init_project(&project, vec![Source::Augment, Source::ClaudeCli], &roots);
    let report = run_cycle(&project, &options(&roots, "2025-10-21")).unwrap();

    assert_eq!(report.consolidation.materialized, 2);

    let text = std::fs::read_to_string(session_path(&project, "2025-10-21")).unwrap();
    let parsed = session::parse(
        &text,
        NaiveDate::parse_from_str("2025-10-21", "%Y-%m-%d").unwrap(),
    )
    .unwrap();
    assert_eq!(parsed.rows.len(), 2);
}

#[test]
fn test_cycle_is_idempotent_on_disk() {
    let world = TestWorld::new().unwrap();
    let project = world.project_dir("alpha").unwrap();
    let roots = roots_for(&world);

    seed_augment_store(
        &world.vscode_storage_root().unwrap(),
        "ws-alpha",
        &project,
        &[augment_exchange(
            "c-1",
            "2025-10-21T09:00:00Z",
            "one conversation",
            "Implemented it.",
        )],
    )
    .unwrap();

    init_project(&project, vec![Source::Augment], &roots);
    run_cycle(&project, &options(&roots, "2025-10-21")).unwrap();
    let first = std::fs::read_to_string(session_path(&project, "2025-10-21")).unwrap();

    run_cycle(&project, &options(&roots, "2025-10-21")).unwrap();
    let second = std::fs::read_to_string(session_path(&project, "2025-10-21")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_s6_every_store_file_parses() {
    let world = TestWorld::new().unwrap();
    let project = world.project_dir("alpha").unwrap();
    let roots = roots_for(&world);

    seed_augment_store(
        &world.vscode_storage_root().unwrap(),
        "ws-alpha",
        &project,
        &[
            augment_exchange(
                "c-1",
                "2025-10-21T09:00:00Z",
                "write the schema checker",
                "Implemented the checker for api behavior.",
            ),
            augment_exchange(
                "c-2",
                "2025-10-19T10:00:00Z",
                "older conversation from before",
                "Created older work.",
            ),
        ],
    )
    .unwrap();

    init_project(&project, vec![Source::Augment], &roots);
    run_cycle(&project, &options(&roots, "2025-10-21")).unwrap();

    let layout = StoreLayout::new(&project);
    let mut parsed_any = false;
    for path in walk_files(&layout.aicf_dir()) {
        if path.extension().is_none_or(|e| e != "aicf") {
            continue;
        }
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let text = std::fs::read_to_string(&path).unwrap();
        let date = aicf_store::SessionFile::parse_file_date(&name)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        session::parse(&text, date).unwrap_or_else(|e| panic!("{}: {}", name, e));
        parsed_any = true;
    }
    assert!(parsed_any);
}

#[test]
fn test_old_conversation_drops_straight_to_its_tier() {
    let world = TestWorld::new().unwrap();
    let project = world.project_dir("alpha").unwrap();
    let roots = roots_for(&world);

    seed_augment_store(
        &world.vscode_storage_root().unwrap(),
        "ws-alpha",
        &project,
        &[augment_exchange(
            "ancient",
            "2025-10-01T09:00:00Z",
            "work from twenty days ago",
            "Implemented it back then.",
        )],
    )
    .unwrap();

    init_project(&project, vec![Source::Augment], &roots);
    run_cycle(&project, &options(&roots, "2025-10-21")).unwrap();

    let layout = StoreLayout::new(&project);
    let archive = layout
        .tier_dir(Tier::Archive)
        .join("2025-10-01-session.aicf");
    assert!(archive.exists());

    let text = std::fs::read_to_string(archive).unwrap();
    assert!(text.starts_with("@SESSION|2025-10-01|Age: 20 days"));
}

fn walk_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            files.extend(walk_files(&path));
        } else {
            files.push(path);
        }
    }
    files
}
