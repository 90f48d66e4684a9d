use std::collections::HashSet;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::ai::{parse_all, parse_candidates, AiResultCache, AiResultMerger, GenerationResponse};
use crate::canvas::CanvasSession;
use crate::config::CanvasConfig;
use crate::entity::{
    CanvasEntry, CanvasItem, ItemId, ItemKind, LinkedItem, RatedItem, Rating, UspCanvas,
};
use crate::error::{CanvasError, Result};
use crate::notice::{ConsoleNotifier, Notifier};
use crate::storage::{
    CanvasPersistence, FileKeyValueStore, KeyValueStore, LocalCanvasStorage, Project,
    SqliteCanvasRepository,
};

/// A loaded session plus the stores it saves through.
struct Workspace {
    session: CanvasSession,
    persistence: CanvasPersistence,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
}

fn current_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Find the project and its config, starting from the working directory.
pub fn find_project() -> Result<(Project, CanvasConfig)> {
    let project = Project::discover(&current_dir())?;
    let config = project.config()?;
    Ok((project, config))
}

async fn open_workspace(strategy: Option<String>) -> Result<Workspace> {
    let (project, config) = find_project()?;
    let strategy_id = strategy.unwrap_or_else(|| config.default_strategy.clone());

    let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::open(&project.local_dir())?);
    let repository = Arc::new(SqliteCanvasRepository::open(&project.remote_db())?);
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

    let persistence = CanvasPersistence::new(repository, notifier.clone())
        .with_policy(config.conflict_policy)
        .with_author(get_git_author());

    let mut session =
        CanvasSession::new(strategy_id).with_mirror(LocalCanvasStorage::new(store.clone()));
    let source = persistence.load(&mut session).await;
    tracing::debug!(strategy_id = %session.strategy_id(), ?source, "workspace opened");

    Ok(Workspace {
        session,
        persistence,
        store,
        notifier,
    })
}

pub async fn handle_init() -> Result<()> {
    let root = env::current_dir()?;

    let project = Project::init(&root)?;
    // Create the remote schema up front so later commands only open it.
    SqliteCanvasRepository::open(&project.remote_db())?;

    println!("Initialized usp-canvas project in {}", root.display());
    Ok(())
}

pub async fn handle_add(
    strategy: Option<String>,
    kind: String,
    content: String,
    rating: Option<String>,
    related: Vec<String>,
    json: bool,
) -> Result<()> {
    let kind = parse_kind(&kind)?;
    let content = require_content(content)?;
    let mut ws = open_workspace(strategy).await?;

    let item = if kind.is_profile() {
        if !related.is_empty() {
            return Err(CanvasError::Validation(format!(
                "--related only applies to value map items, not {}",
                kind
            )));
        }
        let rating = parse_rating(rating.as_deref())?;
        match kind {
            ItemKind::Job => CanvasItem::Job(ws.session.add_job(content, rating, false)),
            ItemKind::Pain => CanvasItem::Pain(ws.session.add_pain(content, rating, false)),
            _ => CanvasItem::Gain(ws.session.add_gain(content, rating, false)),
        }
    } else {
        if rating.is_some() {
            return Err(CanvasError::Validation(format!(
                "--rating only applies to profile items, not {}",
                kind
            )));
        }
        let related = resolve_related(&ws.session, kind, &related)?;
        match kind {
            ItemKind::Service => {
                CanvasItem::Service(ws.session.add_service(content, related, false))
            }
            ItemKind::Reliever => {
                CanvasItem::Reliever(ws.session.add_reliever(content, related, false))
            }
            _ => CanvasItem::Creator(ws.session.add_creator(content, related, false)),
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!("Added {} ({}) - {}", kind, short_id(item.id()), item.content());
    }

    Ok(())
}

pub async fn handle_update(
    strategy: Option<String>,
    kind: String,
    id: String,
    content: String,
    rating: Option<String>,
    related: Vec<String>,
) -> Result<()> {
    let kind = parse_kind(&kind)?;
    let content = require_content(content)?;
    let mut ws = open_workspace(strategy).await?;

    let id = resolve_id(&ws.session, kind, &id)?;
    let existing = ws
        .session
        .find(&id)
        .ok_or_else(|| CanvasError::ItemNotFound(id.to_string()))?;

    let changed = if kind.is_profile() {
        if !related.is_empty() {
            return Err(CanvasError::Validation(format!(
                "--related only applies to value map items, not {}",
                kind
            )));
        }
        let rating = match rating {
            Some(value) => parse_rating(Some(&value))?,
            None => current_rating(&existing),
        };
        match kind {
            ItemKind::Job => ws.session.update_job(&id, content, rating),
            ItemKind::Pain => ws.session.update_pain(&id, content, rating),
            _ => ws.session.update_gain(&id, content, rating),
        }
    } else {
        if rating.is_some() {
            return Err(CanvasError::Validation(format!(
                "--rating only applies to profile items, not {}",
                kind
            )));
        }
        let related = if related.is_empty() {
            current_links(&existing)
        } else {
            resolve_related(&ws.session, kind, &related)?
        };
        match kind {
            ItemKind::Service => ws.session.update_service(&id, content, related),
            ItemKind::Reliever => ws.session.update_reliever(&id, content, related),
            _ => ws.session.update_creator(&id, content, related),
        }
    };

    if changed {
        println!("Updated {} ({})", kind, short_id(&id));
    } else {
        println!("No changes to {} ({})", kind, short_id(&id));
    }
    Ok(())
}

pub async fn handle_delete(strategy: Option<String>, kind: String, id: String) -> Result<()> {
    let kind = parse_kind(&kind)?;
    let mut ws = open_workspace(strategy).await?;

    let id = resolve_id(&ws.session, kind, &id)?;
    let content = ws
        .session
        .find(&id)
        .map(|item| item.content().to_string())
        .unwrap_or_default();

    if !ws.session.delete_item(kind, &id) {
        return Err(CanvasError::ItemNotFound(id.to_string()));
    }

    println!("Deleted {} ({}) - {}", kind, short_id(&id), content);
    Ok(())
}

pub async fn handle_reorder(
    strategy: Option<String>,
    kind: String,
    ids: Vec<String>,
) -> Result<()> {
    let kind = parse_kind(&kind)?;
    let mut ws = open_workspace(strategy).await?;

    let order = ids
        .iter()
        .map(|id| resolve_id(&ws.session, kind, id))
        .collect::<Result<Vec<_>>>()?;

    let canvas = ws.session.canvas();
    match kind {
        ItemKind::Job => {
            let items = reordered(&canvas.customer_jobs, &order)?;
            ws.session.reorder_jobs(items);
        }
        ItemKind::Pain => {
            let items = reordered(&canvas.customer_pains, &order)?;
            ws.session.reorder_pains(items);
        }
        ItemKind::Gain => {
            let items = reordered(&canvas.customer_gains, &order)?;
            ws.session.reorder_gains(items);
        }
        ItemKind::Service => {
            let items = reordered(&canvas.product_services, &order)?;
            ws.session.reorder_services(items);
        }
        ItemKind::Reliever => {
            let items = reordered(&canvas.pain_relievers, &order)?;
            ws.session.reorder_relievers(items);
        }
        ItemKind::Creator => {
            let items = reordered(&canvas.gain_creators, &order)?;
            ws.session.reorder_creators(items);
        }
    }

    println!("Reordered {} {} item(s)", order.len(), kind);
    Ok(())
}

pub async fn handle_show(strategy: Option<String>, json: bool) -> Result<()> {
    let ws = open_workspace(strategy).await?;
    let canvas = ws.session.canvas();

    if json {
        println!("{}", serde_json::to_string_pretty(canvas)?);
        return Ok(());
    }

    let state = if ws.session.is_saved() {
        "saved"
    } else {
        "unsaved changes"
    };
    println!(
        "Canvas for strategy '{}' ({})",
        ws.session.strategy_id(),
        state
    );

    if canvas.is_empty() {
        println!("\nCanvas is empty.");
        return Ok(());
    }

    for kind in ItemKind::ALL {
        let items = canvas.items(kind);
        if items.is_empty() {
            continue;
        }
        println!("\n{}:", section_title(kind));
        for item in &items {
            println!("  {}", describe(canvas, item));
        }
    }

    Ok(())
}

pub async fn handle_save(strategy: Option<String>, is_final: bool) -> Result<()> {
    let mut ws = open_workspace(strategy).await?;

    let saved = if is_final {
        ws.persistence.save_final_version(&mut ws.session).await
    } else {
        ws.persistence.save_canvas(&mut ws.session).await
    };

    if !saved {
        return Err(CanvasError::Storage("canvas was not saved".to_string()));
    }
    Ok(())
}

pub async fn handle_history(strategy: Option<String>, json: bool) -> Result<()> {
    let ws = open_workspace(strategy).await?;
    let entries = ws.persistence.history(ws.session.strategy_id()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No saved versions found.");
        return Ok(());
    }

    println!("History for strategy '{}':\n", ws.session.strategy_id());
    for entry in entries {
        let label = if entry.is_final { "final" } else { "draft" };
        let author = entry
            .metadata
            .created_by
            .as_deref()
            .map(|name| format!(" by {}", name))
            .unwrap_or_default();
        println!(
            "  {} ({}) [{}] {} item(s){}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            &entry.id.to_string()[..7],
            label,
            entry.data.total_items(),
            author
        );
    }

    Ok(())
}

pub async fn handle_import(
    strategy: Option<String>,
    file: PathBuf,
    kind: Option<String>,
) -> Result<()> {
    let kind = kind.as_deref().map(parse_kind).transpose()?;
    let response = read_generation_response(&file)?;
    let mut ws = open_workspace(strategy).await?;

    AiResultCache::new(ws.store.clone()).store(ws.session.strategy_id(), &response);
    let data = response.into_result()?;

    let batch = match kind {
        Some(kind) => parse_candidates(kind, &data)?,
        None if data.is_array() => {
            return Err(CanvasError::Validation(
                "a bare list of suggestions needs --kind".to_string(),
            ))
        }
        None => parse_all(&data)?,
    };

    let mut merger = AiResultMerger::new(ws.notifier.clone());
    let report = merger.merge(&mut ws.session, batch);

    if report.rejected > 0 {
        eprintln!(
            "Warning: skipped {} suggestion(s) without content",
            report.rejected
        );
    }
    if report.duplicates > 0 {
        println!("  ({} duplicate(s) ignored)", report.duplicates);
    }
    Ok(())
}

pub async fn handle_reset(strategy: Option<String>, remote: bool, force: bool) -> Result<()> {
    let mut ws = open_workspace(strategy).await?;
    let strategy_id = ws.session.strategy_id().to_string();

    // Confirm reset unless --force is used
    if !force {
        let scope = if remote {
            "local and remote canvas"
        } else {
            "local canvas"
        };
        eprintln!("Reset the {} for strategy '{}'? [y/N] ", scope, strategy_id);

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(CanvasError::Validation(
                "Use --force to reset in non-interactive mode".to_string(),
            ));
        }
    }

    AiResultCache::new(ws.store.clone()).clear(&strategy_id);
    if !ws.persistence.reset(&mut ws.session, remote).await {
        return Err(CanvasError::Storage(
            "failed to delete the remote canvas".to_string(),
        ));
    }

    println!("Reset canvas for strategy '{}'", strategy_id);
    Ok(())
}

fn get_git_author() -> Option<String> {
    std::process::Command::new("git")
        .args(["config", "user.name"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            } else {
                None
            }
        })
}

fn parse_kind(value: &str) -> Result<ItemKind> {
    value
        .parse()
        .map_err(|_| CanvasError::InvalidItemKind(value.to_string()))
}

fn parse_rating(value: Option<&str>) -> Result<Rating> {
    match value {
        None => Ok(Rating::default()),
        Some(value) => value
            .parse()
            .map_err(|_| CanvasError::InvalidRating(value.to_string())),
    }
}

fn require_content(content: String) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CanvasError::Validation(
            "content must not be empty".to_string(),
        ));
    }
    Ok(content.to_string())
}

/// Match `query` against the ids of `kind`: an exact id first, then a unique prefix.
fn resolve_id(session: &CanvasSession, kind: ItemKind, query: &str) -> Result<ItemId> {
    let items = session.items(kind);

    if let Some(item) = items.iter().find(|item| item.id().as_str() == query) {
        return Ok(item.id().clone());
    }

    let matches: Vec<&CanvasItem> = items
        .iter()
        .filter(|item| item.id().as_str().starts_with(query))
        .collect();
    match matches.as_slice() {
        [item] => Ok(item.id().clone()),
        [] => Err(CanvasError::ItemNotFound(format!("{} {}", kind, query))),
        _ => Err(CanvasError::Validation(format!(
            "id prefix '{}' matches {} {} items",
            query,
            matches.len(),
            kind
        ))),
    }
}

fn resolve_related(
    session: &CanvasSession,
    kind: ItemKind,
    ids: &[String],
) -> Result<Vec<ItemId>> {
    let Some(target) = kind.linked_profile_kind() else {
        return Ok(Vec::new());
    };

    let mut resolved: Vec<ItemId> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = resolve_id(session, target, id)?;
        if !resolved.contains(&id) {
            resolved.push(id);
        }
    }
    Ok(resolved)
}

/// `items` in the order given by `order`, which must name each item exactly once.
fn reordered<T: CanvasEntry>(items: &[T], order: &[ItemId]) -> Result<Vec<T>> {
    let unique: HashSet<&ItemId> = order.iter().collect();
    if order.len() != items.len() || unique.len() != order.len() {
        return Err(CanvasError::Validation(format!(
            "reorder must list each of the {} item(s) exactly once",
            items.len()
        )));
    }

    order
        .iter()
        .map(|id| {
            items
                .iter()
                .find(|item| item.id() == id)
                .cloned()
                .ok_or_else(|| CanvasError::ItemNotFound(id.to_string()))
        })
        .collect()
}

fn current_rating(item: &CanvasItem) -> Rating {
    match item {
        CanvasItem::Job(job) => job.rating(),
        CanvasItem::Pain(pain) => pain.rating(),
        CanvasItem::Gain(gain) => gain.rating(),
        _ => Rating::default(),
    }
}

fn current_links(item: &CanvasItem) -> Vec<ItemId> {
    match item {
        CanvasItem::Service(service) => service.related_ids().to_vec(),
        CanvasItem::Reliever(reliever) => reliever.related_ids().to_vec(),
        CanvasItem::Creator(creator) => creator.related_ids().to_vec(),
        _ => Vec::new(),
    }
}

fn read_generation_response(path: &Path) -> Result<GenerationResponse> {
    let raw = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;

    let is_envelope = value
        .as_object()
        .map(|map| map.contains_key("data") || map.contains_key("error"))
        .unwrap_or(false);

    if is_envelope {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(GenerationResponse {
            data: Some(value),
            ..GenerationResponse::default()
        })
    }
}

fn short_id(id: &ItemId) -> String {
    id.as_str().chars().take(7).collect()
}

fn section_title(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Job => "Customer jobs",
        ItemKind::Pain => "Customer pains",
        ItemKind::Gain => "Customer gains",
        ItemKind::Service => "Products & services",
        ItemKind::Reliever => "Pain relievers",
        ItemKind::Creator => "Gain creators",
    }
}

fn describe(canvas: &UspCanvas, item: &CanvasItem) -> String {
    let ai = |flag: bool| if flag { " (AI)" } else { "" };
    let links = |ids: &[ItemId], target: ItemKind| {
        let shown: Vec<String> = ids
            .iter()
            .filter(|id| canvas.contains(target, id))
            .map(short_id)
            .collect();
        if shown.is_empty() {
            return String::new();
        }
        format!(" -> {}: {}", target, shown.join(", "))
    };

    match item {
        CanvasItem::Job(job) => format!(
            "({}) [{}] {}{}",
            short_id(&job.id),
            job.priority,
            job.content,
            ai(job.is_ai_generated)
        ),
        CanvasItem::Pain(pain) => format!(
            "({}) [{}] {}{}",
            short_id(&pain.id),
            pain.severity,
            pain.content,
            ai(pain.is_ai_generated)
        ),
        CanvasItem::Gain(gain) => format!(
            "({}) [{}] {}{}",
            short_id(&gain.id),
            gain.importance,
            gain.content,
            ai(gain.is_ai_generated)
        ),
        CanvasItem::Service(service) => format!(
            "({}) {}{}{}",
            short_id(&service.id),
            service.content,
            ai(service.is_ai_generated),
            links(&service.related_job_ids, ItemKind::Job)
        ),
        CanvasItem::Reliever(reliever) => format!(
            "({}) {}{}{}",
            short_id(&reliever.id),
            reliever.content,
            ai(reliever.is_ai_generated),
            links(&reliever.related_pain_ids, ItemKind::Pain)
        ),
        CanvasItem::Creator(creator) => format!(
            "({}) {}{}{}",
            short_id(&creator.id),
            creator.content,
            ai(creator.is_ai_generated),
            links(&creator.related_gain_ids, ItemKind::Gain)
        ),
    }
}
