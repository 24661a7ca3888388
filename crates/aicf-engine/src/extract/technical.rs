use crate::conversation::Conversation;
use crate::text::contains_word;
use aicf_types::TechnicalWork;

/// Technology markers and their canonical names.
const TECHNOLOGIES: [(&str, &str); 22] = [
    ("rust", "Rust"),
    ("typescript", "TypeScript"),
    ("javascript", "JavaScript"),
    ("python", "Python"),
    ("go", "Go"),
    ("react", "React"),
    ("node", "Node.js"),
    ("tokio", "Tokio"),
    ("sqlite", "SQLite"),
    ("postgres", "PostgreSQL"),
    ("redis", "Redis"),
    ("leveldb", "LevelDB"),
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("graphql", "GraphQL"),
    ("webpack", "webpack"),
    ("serde", "serde"),
    ("cargo", "Cargo"),
    ("npm", "npm"),
    ("git", "Git"),
    ("terraform", "Terraform"),
    ("kafka", "Kafka"),
];

/// Architectural categories referenced in the discussion.
const CATEGORIES: [&str; 12] = [
    "api",
    "database",
    "frontend",
    "backend",
    "cli",
    "pipeline",
    "cache",
    "schema",
    "testing",
    "deployment",
    "authentication",
    "migration",
];

/// Config-file markers that identify the stack even when no language is
/// named.
const CONFIG_FILES: [&str; 6] = [
    "package.json",
    "Cargo.toml",
    "tsconfig.json",
    "pyproject.toml",
    "go.mod",
    "Dockerfile",
];

/// Record primary technologies and architectural categories referenced.
///
/// Entries use the conversation timestamp, so the same technology named in
/// five messages collapses to one entry at dedup time.
pub fn extract(conversation: &Conversation) -> Vec<TechnicalWork> {
    let mut work = Vec::new();
    let full_text: String = conversation
        .messages
        .iter()
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    for (marker, name) in TECHNOLOGIES {
        if contains_word(&full_text, marker) {
            work.push(TechnicalWork {
                timestamp: conversation.timestamp.clone(),
                kind: "technology".to_string(),
                description: name.to_string(),
            });
        }
    }

    for category in CATEGORIES {
        if contains_word(&full_text, category) {
            work.push(TechnicalWork {
                timestamp: conversation.timestamp.clone(),
                kind: "category".to_string(),
                description: category.to_string(),
            });
        }
    }

    for config in CONFIG_FILES {
        if full_text.contains(config) {
            work.push(TechnicalWork {
                timestamp: conversation.timestamp.clone(),
                kind: "config".to_string(),
                description: config.to_string(),
            });
        }
    }

    work
}
