use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::context::AppContext;
use crate::domain::change_request::{ChangeRequestId, SourceBundle};
use crate::domain::document::{Document, GenerationMode, default_output_path};
use crate::error::{AppError, AppResult};
use crate::services::web_search::research_query;
use crate::workflow::policy::{Stage, settle};
use crate::workflow::prompt::{GenerationContext, build_prompt};

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub id: ChangeRequestId,
    pub direction: Option<String>,
    pub research: bool,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub id: ChangeRequestId,
    pub document: PathBuf,
    pub direction: Option<String>,
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub research_results: usize,
}

pub async fn generate_document(
    ctx: &AppContext,
    request: GenerateRequest,
) -> AppResult<DocumentOutcome> {
    let source = fetch_source(ctx, &request.id).await?;

    let research = if request.research {
        let query = research_query(&source.change, &source.stats);
        info!(query = %query, "Searching for related material");
        let found = ctx
            .web_search
            .search(&query, ctx.config.research_limit)
            .await;
        settle(Stage::Research, found).into_optional()?
    } else {
        debug!("Web research disabled");
        None
    };

    let mode = GenerationMode::Create;
    let document = generate(
        ctx,
        &GenerationContext {
            source: &source,
            research: research.as_deref(),
            direction: request.direction.as_deref(),
            mode: &mode,
        },
    )
    .await?;

    let path = request
        .output
        .unwrap_or_else(|| default_output_path(&request.id));
    settle(Stage::Write, write_document(&path, &document)).into_required()?;

    Ok(DocumentOutcome {
        path,
        research_results: research.map(|results| results.len()).unwrap_or(0),
    })
}

pub async fn update_document(
    ctx: &AppContext,
    request: UpdateRequest,
) -> AppResult<DocumentOutcome> {
    let prior = settle(Stage::ReadDocument, read_document(&request.document)).into_required()?;
    let source = fetch_source(ctx, &request.id).await?;

    let mode = GenerationMode::Update { prior };
    let document = generate(
        ctx,
        &GenerationContext {
            source: &source,
            research: None,
            direction: request.direction.as_deref(),
            mode: &mode,
        },
    )
    .await?;

    let path = request.output.unwrap_or(request.document);
    settle(Stage::Write, write_document(&path, &document)).into_required()?;

    Ok(DocumentOutcome {
        path,
        research_results: 0,
    })
}

async fn fetch_source(ctx: &AppContext, id: &ChangeRequestId) -> AppResult<SourceBundle> {
    info!(change = %id, "Fetching pull request");
    let fetched = ctx.version_control.fetch_change_request(id).await;
    let source = settle(Stage::FetchSource, fetched).into_required()?;
    debug!(
        commits = source.commits.len(),
        diff_bytes = source.diff.len(),
        "Source fetched"
    );
    Ok(source)
}

async fn generate(ctx: &AppContext, context: &GenerationContext<'_>) -> AppResult<Document> {
    let prompt = build_prompt(context)?;
    info!(model = %ctx.config.model, "Generating document");
    let completion = ctx.language_model.complete(&prompt).await;
    let document = Document(settle(Stage::Generate, completion).into_required()?);

    if document.is_blank() {
        return Err(AppError::Generation(
            "language model returned an empty document".to_string(),
        ));
    }
    if let Some(prior) = context.mode.prior() {
        if prior.as_str().trim() == document.as_str().trim() {
            return Err(AppError::Generation(
                "language model returned the document unchanged".to_string(),
            ));
        }
    }
    Ok(document)
}

fn read_document(path: &Path) -> AppResult<Document> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Document(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(AppError::DocumentNotFound(path.to_path_buf()))
        }
        Err(err) => Err(AppError::Io(err)),
    }
}

/// Writes through a sibling temporary file so the target is either fully
/// replaced or left untouched.
fn write_document(path: &Path, document: &Document) -> AppResult<()> {
    let write_err = |source: io::Error| AppError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| write_err(io::Error::new(io::ErrorKind::InvalidInput, "no file name")))?;
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, document.as_str()).map_err(write_err)?;
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(write_err(err));
    }
    debug!(path = %path.display(), bytes = document.as_str().len(), "Document written");
    Ok(())
}
