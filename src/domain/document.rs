use std::path::PathBuf;

use crate::domain::change_request::ChangeRequestId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document(pub String);

impl Document {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Whether the model authors a fresh document or revises an existing one.
#[derive(Debug, Clone)]
pub enum GenerationMode {
    Create,
    Update { prior: Document },
}

impl GenerationMode {
    pub fn prior(&self) -> Option<&Document> {
        match self {
            GenerationMode::Create => None,
            GenerationMode::Update { prior } => Some(prior),
        }
    }
}

pub fn default_output_path(id: &ChangeRequestId) -> PathBuf {
    PathBuf::from(format!(
        "{}-{}-pr-{}.md",
        sanitize(&id.repo.owner),
        sanitize(&id.repo.name),
        id.number
    ))
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::change_request::RepoId;

    #[test]
    fn derives_output_path_from_identifiers() {
        let id = ChangeRequestId {
            repo: RepoId::new("demo", "repo"),
            number: 7,
        };
        assert_eq!(default_output_path(&id), PathBuf::from("demo-repo-pr-7.md"));
    }

    #[test]
    fn sanitizes_unusual_names() {
        let id = ChangeRequestId {
            repo: RepoId::new("acme corp", "tool:kit"),
            number: 12,
        };
        assert_eq!(
            default_output_path(&id),
            PathBuf::from("acme-corp-tool-kit-pr-12.md")
        );
    }

    #[test]
    fn update_mode_exposes_prior() {
        let mode = GenerationMode::Update {
            prior: Document("# Old".to_string()),
        };
        assert_eq!(mode.prior().map(Document::as_str), Some("# Old"));
        assert!(GenerationMode::Create.prior().is_none());
    }
}
