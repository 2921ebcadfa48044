use std::fmt::{self, Write as _};

use crate::domain::change_request::SourceBundle;
use crate::domain::document::GenerationMode;
use crate::domain::research::ResearchResult;
use crate::error::{AppError, AppResult};
use crate::services::Prompt;

pub const PRIOR_DOCUMENT_HEADER: &str = "## Existing article";
pub const DIRECTION_HEADER: &str = "## Direction from the author";
pub const RESEARCH_HEADER: &str = "## Related web resources";

const KEY_FILES: usize = 5;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

const CREATE_ROLE: &str =
    "You are a technical writer creating a blog post about code changes in a GitHub pull request.";
const UPDATE_ROLE: &str =
    "You are a technical writer revising an existing blog post about a GitHub pull request.";

pub struct GenerationContext<'a> {
    pub source: &'a SourceBundle,
    pub research: Option<&'a [ResearchResult]>,
    pub direction: Option<&'a str>,
    pub mode: &'a GenerationMode,
}

pub fn build_prompt(ctx: &GenerationContext<'_>) -> AppResult<Prompt> {
    let system = match ctx.mode {
        GenerationMode::Create => CREATE_ROLE,
        GenerationMode::Update { .. } => UPDATE_ROLE,
    };

    let mut user = String::new();
    write_user(&mut user, ctx)
        .map_err(|err| AppError::Generation(format!("failed to render prompt: {err}")))?;

    Ok(Prompt {
        system: system.to_string(),
        user,
    })
}

fn write_user(out: &mut String, ctx: &GenerationContext<'_>) -> fmt::Result {
    write_instructions(out, ctx.mode)?;
    write_metadata(out, ctx.source)?;
    write_commits(out, ctx.source)?;
    write_statistics(out, ctx.source)?;

    if let Some(prior) = ctx.mode.prior() {
        writeln!(out, "\n{PRIOR_DOCUMENT_HEADER}\n\n{}", prior.as_str().trim_end())?;
    }

    let direction = ctx
        .direction
        .map(str::trim)
        .filter(|direction| !direction.is_empty());
    if let Some(direction) = direction {
        writeln!(out, "\n{DIRECTION_HEADER}\n\n{direction}")?;
    }

    let research = ctx.research.filter(|results| !results.is_empty());
    if let Some(results) = research {
        writeln!(out, "\n{RESEARCH_HEADER}\n")?;
        for result in results {
            writeln!(out, "- [{}]({}): {}", result.title, result.url, result.snippet)?;
        }
    }

    write_output_format(out, ctx.mode, research.is_some())
}

fn write_instructions(out: &mut String, mode: &GenerationMode) -> fmt::Result {
    let text = match mode {
        GenerationMode::Create => {
            "Write a technical blog post about the following GitHub pull request."
        }
        GenerationMode::Update { .. } => {
            "Revise the existing blog post below using the latest data for the pull request. \
             Keep what is still accurate, correct what changed \
             and follow the direction if one is given."
        }
    };
    writeln!(out, "{text}")
}

fn write_metadata(out: &mut String, source: &SourceBundle) -> fmt::Result {
    let change = &source.change;
    writeln!(out, "\n## Pull request\n")?;
    writeln!(out, "Repository: {}", change.id.repo)?;
    writeln!(out, "Number: #{}", change.id.number)?;
    writeln!(out, "Title: {}", change.title)?;
    writeln!(out, "Author: {}", change.author)?;
    writeln!(out, "State: {}", change.state)?;
    writeln!(out, "Branches: {} <- {}", change.base_ref, change.head_ref)?;
    writeln!(out, "Created: {}", change.created_at.format(DATE_FORMAT))?;
    writeln!(out, "Updated: {}", change.updated_at.format(DATE_FORMAT))?;
    writeln!(out, "URL: {}", change.url)?;
    let description = change.description.trim();
    if description.is_empty() {
        writeln!(out, "\nDescription: (none provided)")?;
    } else {
        writeln!(out, "\nDescription:\n{description}")?;
    }
    Ok(())
}

fn write_commits(out: &mut String, source: &SourceBundle) -> fmt::Result {
    writeln!(out, "\n## Commits\n")?;
    if source.commits.is_empty() {
        return writeln!(out, "No commits found.");
    }
    for (index, commit) in source.commits.iter().enumerate() {
        writeln!(
            out,
            "{}. {} {} ({})",
            index + 1,
            commit.short_id,
            commit.headline(),
            commit.author
        )?;
    }
    Ok(())
}

fn write_statistics(out: &mut String, source: &SourceBundle) -> fmt::Result {
    let stats = &source.stats;
    writeln!(out, "\n## Diff statistics\n")?;
    writeln!(out, "- Files changed: {}", stats.files_changed)?;
    writeln!(out, "- Additions: {}", stats.additions)?;
    writeln!(out, "- Deletions: {}", stats.deletions)?;

    if !stats.language_breakdown.is_empty() {
        let languages = stats
            .language_breakdown
            .iter()
            .map(|(ext, lines)| format!("{ext} ({lines} lines)"))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "- Languages by extension: {languages}")?;
    }

    let key_files = stats.key_files(KEY_FILES);
    if !key_files.is_empty() {
        writeln!(out, "- Key files:")?;
        for file in key_files {
            writeln!(out, "  - {} (+{} -{})", file.path, file.additions, file.deletions)?;
        }
    }
    Ok(())
}

fn write_output_format(
    out: &mut String,
    mode: &GenerationMode,
    has_research: bool,
) -> fmt::Result {
    writeln!(out, "\n## Output format\n")?;
    if matches!(mode, GenerationMode::Update { .. }) {
        writeln!(out, "Return the complete revised blog post, not a list of edits.")?;
    }
    writeln!(out, "Format the blog post in Markdown. It should:")?;
    writeln!(out, "1. Start with a single `#` heading holding a catchy title")?;
    writeln!(out, "2. Open with an introduction explaining the purpose of the changes")?;
    writeln!(out, "3. Use `##` sections for the key technical aspects")?;
    writeln!(out, "4. Explain the impact or benefits of the changes")?;
    writeln!(out, "5. Include short code examples where relevant")?;
    writeln!(out, "6. End with a conclusion")?;
    if has_research {
        writeln!(
            out,
            "7. Finish with a \"Related Resources\" section \
             linking the most relevant resources above"
        )?;
    }
    Ok(())
}
