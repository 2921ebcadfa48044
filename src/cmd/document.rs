use std::path::PathBuf;

use clap::Args;

use crate::config::ConfigOverrides;
use crate::context::AppContext;
use crate::domain::change_request::{ChangeRequestId, RepoId};
use crate::error::AppResult;
use crate::workflow::document::{
    DocumentOutcome, GenerateRequest, UpdateRequest, generate_document, update_document,
};

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Repository as owner/name or a GitHub URL.
    #[arg(short, long)]
    pub repo: RepoId,
    /// Pull request number.
    #[arg(short, long)]
    pub pr: u64,
    /// Free-text guidance on emphasis or tone.
    #[arg(short, long)]
    pub direction: Option<String>,
    /// Override the language model.
    #[arg(long)]
    pub model: Option<String>,
}

impl SourceArgs {
    pub fn change_request(&self) -> ChangeRequestId {
        ChangeRequestId {
            repo: self.repo.clone(),
            number: self.pr,
        }
    }

    pub fn overrides(&self, timeout_secs: Option<u64>) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model.clone(),
            timeout_secs,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output path (default: <owner>-<name>-pr-<number>.md).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Skip the web search step.
    #[arg(long)]
    pub no_research: bool,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Existing document to revise.
    pub document: PathBuf,
    #[command(flatten)]
    pub source: SourceArgs,
    /// Write the revision here instead of over the existing document.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn generate(ctx: &AppContext, args: GenerateArgs) -> AppResult<DocumentOutcome> {
    let request = GenerateRequest {
        id: args.source.change_request(),
        direction: args.source.direction,
        research: !args.no_research,
        output: args.output,
    };
    generate_document(ctx, request).await
}

pub async fn update(ctx: &AppContext, args: UpdateArgs) -> AppResult<DocumentOutcome> {
    let request = UpdateRequest {
        id: args.source.change_request(),
        document: args.document,
        direction: args.source.direction,
        output: args.output,
    };
    update_document(ctx, request).await
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use clap::Parser;

    use super::*;
    use crate::services::testing::{
        FakeModel, FakeSearch, FakeVersionControl, sample_results, test_context,
    };

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: GenerateArgs,
    }

    #[test]
    fn parses_generate_flags() {
        let harness = Harness::try_parse_from([
            "scribe",
            "--repo",
            "demo/repo",
            "--pr",
            "7",
            "--no-research",
            "--model",
            "gpt-test",
        ])
        .unwrap();
        let args = harness.args;
        assert_eq!(args.source.repo, RepoId::new("demo", "repo"));
        assert_eq!(args.source.change_request().number, 7);
        assert!(args.no_research);
        assert_eq!(args.source.overrides(Some(5)).model.as_deref(), Some("gpt-test"));
    }

    #[test]
    fn rejects_bad_repository() {
        assert!(Harness::try_parse_from(["scribe", "--repo", "demo", "--pr", "7"]).is_err());
    }

    #[tokio::test]
    async fn demo_scenario_writes_model_output_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("demo-repo-pr-7.md");
        let search = Arc::new(FakeSearch::returning(sample_results(2)));
        let ctx = test_context(
            Arc::new(FakeVersionControl::default()),
            search.clone(),
            Arc::new(FakeModel::replying("# Demo\nBody")),
        );
        let harness = Harness::try_parse_from([
            "scribe",
            "--repo",
            "demo/repo",
            "--pr",
            "7",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let outcome = generate(&ctx, harness.args).await.unwrap();

        assert_eq!(outcome.research_results, 2);
        assert_eq!(search.calls(), 1);
        assert_eq!(fs::read_to_string(output).unwrap(), "# Demo\nBody");
    }
}
