//! Age-based dropoff: move session files to narrower tiers as they age.
//!
//! Ages are computed against an injected `today`, never the wall clock
//! directly, so the agent is testable and a cycle is reproducible. Archive
//! files are final; they are never re-compressed or merged, one file per
//! original session day forever.

use crate::Result;
use crate::report::{DropoffMove, DropoffReport};
use aicf_store::{SessionFile, StoreLayout, session, write_atomic};
use aicf_types::Tier;
use chrono::NaiveDate;

pub fn run_dropoff(layout: &StoreLayout, today: NaiveDate) -> Result<DropoffReport> {
    let mut report = DropoffReport::default();

    // Archive is terminal, so only the first three tiers are scanned.
    for tier in [Tier::Sessions, Tier::Medium, Tier::Old] {
        let dir = layout.tier_dir(tier);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(date) = SessionFile::parse_file_date(&name) else {
                continue;
            };

            let age = (today - date).num_days();
            let target = Tier::for_age(age);
            if target <= tier {
                continue;
            }

            let text = std::fs::read_to_string(entry.path())?;
            let file = match session::parse(&text, date) {
                Ok(file) => file,
                Err(err) => {
                    report
                        .diagnostics
                        .push(format!("unparseable session file {}: {}", name, err));
                    continue;
                }
            };

            let projected = file.project(target);
            let rendered = session::render(&projected, target, today);
            let target_path = layout.tier_dir(target).join(&name);

            write_atomic(&target_path, &rendered)?;
            std::fs::remove_file(entry.path())?;

            report.moves.push(DropoffMove {
                date,
                from: tier,
                to: target,
            });
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aicf_store::{SessionNotes, SessionRow};
    use aicf_types::SessionStatus;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 21).unwrap()
    }

    fn full_file(date: NaiveDate) -> SessionFile {
        SessionFile {
            date,
            rows: vec![
                SessionRow {
                    timestamp: format!("{}T09:00:00Z", date.format("%Y-%m-%d")),
                    title: "substantive work".to_string(),
                    summary: "Implemented a thing.".to_string(),
                    model: "model-x".to_string(),
                    decisions: vec!["We chose X.".to_string()],
                    actions: vec!["Created Y.".to_string()],
                    status: SessionStatus::Completed,
                },
                SessionRow {
                    timestamp: format!("{}T10:00:00Z", date.format("%Y-%m-%d")),
                    title: "idle chat".to_string(),
                    summary: String::new(),
                    model: "model-x".to_string(),
                    decisions: Vec::new(),
                    actions: Vec::new(),
                    status: SessionStatus::Ongoing,
                },
            ],
            notes: SessionNotes {
                total: 2,
                unique: 2,
                duration: "09:00..10:00".to_string(),
                focus: None,
            },
        }
    }

    fn seed(layout: &StoreLayout, tier: Tier, date: NaiveDate) {
        let file = full_file(date);
        let text = session::render(&file.project(tier), tier, today());
        write_atomic(
            &layout.tier_dir(tier).join(SessionFile::file_name(date)),
            &text,
        )
        .unwrap();
    }

    fn world() -> (tempfile::TempDir, StoreLayout) {
        let tmp = tempfile::TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());
        layout.ensure_skeleton().unwrap();
        (tmp, layout)
    }

    fn date_days_ago(days: i64) -> NaiveDate {
        today() - chrono::Duration::days(days)
    }

    #[test]
    fn test_ladder_placement() {
        let (_tmp, layout) = world();
        seed(&layout, Tier::Sessions, date_days_ago(0));
        seed(&layout, Tier::Sessions, date_days_ago(3));
        seed(&layout, Tier::Sessions, date_days_ago(8));
        seed(&layout, Tier::Sessions, date_days_ago(20));

        let report = run_dropoff(&layout, today()).unwrap();
        assert_eq!(report.moves.len(), 3);

        let name = |d: i64| SessionFile::file_name(date_days_ago(d));
        assert!(layout.tier_dir(Tier::Sessions).join(name(0)).exists());
        assert!(layout.tier_dir(Tier::Medium).join(name(3)).exists());
        assert!(layout.tier_dir(Tier::Old).join(name(8)).exists());
        assert!(layout.tier_dir(Tier::Archive).join(name(20)).exists());

        // sources removed
        assert!(!layout.tier_dir(Tier::Sessions).join(name(3)).exists());
        assert!(!layout.tier_dir(Tier::Sessions).join(name(8)).exists());
        assert!(!layout.tier_dir(Tier::Sessions).join(name(20)).exists());
    }

    #[test]
    fn test_summary_tier_keeps_only_substantive_rows() {
        let (_tmp, layout) = world();
        seed(&layout, Tier::Sessions, date_days_ago(3));

        run_dropoff(&layout, today()).unwrap();

        let text = std::fs::read_to_string(
            layout
                .tier_dir(Tier::Medium)
                .join(SessionFile::file_name(date_days_ago(3))),
        )
        .unwrap();
        let parsed = session::parse(&text, date_days_ago(3)).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].title, "substantive work");
    }

    #[test]
    fn test_archive_file_is_single_line_schema() {
        let (_tmp, layout) = world();
        seed(&layout, Tier::Sessions, date_days_ago(20));

        run_dropoff(&layout, today()).unwrap();

        let text = std::fs::read_to_string(
            layout
                .tier_dir(Tier::Archive)
                .join(SessionFile::file_name(date_days_ago(20))),
        )
        .unwrap();
        assert!(text.starts_with("@SESSION|"));
        assert!(text.contains("Age: 20 days"));
    }

    #[test]
    fn test_archive_is_never_touched_again() {
        let (_tmp, layout) = world();
        seed(&layout, Tier::Archive, date_days_ago(40));

        let report = run_dropoff(&layout, today()).unwrap();
        assert!(report.moves.is_empty());
    }

    #[test]
    fn test_medium_ages_to_old() {
        let (_tmp, layout) = world();
        seed(&layout, Tier::Medium, date_days_ago(9));

        let report = run_dropoff(&layout, today()).unwrap();
        assert_eq!(
            report.moves,
            vec![DropoffMove {
                date: date_days_ago(9),
                from: Tier::Medium,
                to: Tier::Old,
            }]
        );
    }

    #[test]
    fn test_fresh_file_stays_put() {
        let (_tmp, layout) = world();
        seed(&layout, Tier::Sessions, date_days_ago(1));

        let report = run_dropoff(&layout, today()).unwrap();
        assert!(report.moves.is_empty());
    }
}
