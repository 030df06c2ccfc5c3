#![allow(dead_code)]

use hansard_browser::config::Config;
use hansard_browser::{db, migrate};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Two sittings, three sections, one bill, two members, two ministries.
///
/// Section `sec-housing` has its speakers inserted Lim Hui first, so
/// speaking order differs from alphabetical order.
pub const SEED: &str = r#"
INSERT INTO ministries (id, name, acronym) VALUES
    ('mnd', 'Ministry of National Development', 'MND'),
    ('mof', 'Ministry of Finance', 'MOF');

INSERT INTO members (id, name, summary) VALUES
    ('m-tan', 'Tan Wei Ming', 'Member for Bukit Timah.'),
    ('m-lim', 'Lim Hui', 'Nominated Member.');

INSERT INTO sessions (id, date, sitting_no, parliament, session_no, volume_no, format, url, summary) VALUES
    ('s-march', '2024-03-15', 12, 14, 2, 95, 'new', 'https://hansard.example/2024-03-15', 'Questions on housing and the budget.'),
    ('s-jan', '2024-01-10', 5, 14, 2, 95, 'new', NULL, 'First reading of the housing bill.');

INSERT INTO bills (id, title, ministry_id, first_reading_date, first_reading_session_id, summary) VALUES
    ('b-housing', 'Housing Amendment Bill', 'mnd', '2024-01-10', 's-jan', 'Amends resale levy rules.');

INSERT INTO sections (id, session_id, ministry_id, bill_id, category, section_type, section_title, content_plain, section_order, source_url) VALUES
    ('sec-housing', 's-march', 'mnd', NULL, 'question', 'oral_answer', 'Public Housing Supply', 'The Minister answered questions on flat supply and waiting times.', 1, NULL),
    ('sec-budget', 's-march', 'mof', NULL, 'motion', 'budget', 'Budget Debate', 'Members debated the fiscal position and transfers.', 2, NULL),
    ('sec-bill', 's-jan', 'mnd', 'b-housing', 'bill', 'bill_introduction', 'Housing Amendment Bill', 'The bill was read a first time.', 1, NULL);

INSERT INTO section_speakers (section_id, member_id) VALUES
    ('sec-housing', 'm-lim'),
    ('sec-housing', 'm-tan'),
    ('sec-budget', 'm-tan');
"#;

pub fn test_config(tmp: &TempDir) -> Config {
    test_config_with_port(tmp, 0)
}

pub fn test_config_with_port(tmp: &TempDir, port: u16) -> Config {
    let config_content = format!(
        r#"
[db]
path = "{}"

[server]
bind = "127.0.0.1:{}"

[browser]
page_size = 2
"#,
        tmp.path().join("hansard.sqlite").display(),
        port
    );
    toml::from_str(&config_content).unwrap()
}

/// A migrated, seeded database in `tmp`.
pub async fn seeded_pool(tmp: &TempDir) -> (Config, SqlitePool) {
    let cfg = test_config(tmp);
    let pool = db::connect(&cfg).await.unwrap();
    migrate::apply(&pool).await.unwrap();
    sqlx::raw_sql(SEED).execute(&pool).await.unwrap();
    (cfg, pool)
}
