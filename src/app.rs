//! Command handlers for the `ticklist` binary.
//!
//! Each invocation opens both repositories, runs one command against them
//! and writes human-readable output. Prompts go to stderr so stdout only
//! carries results.
use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio::runtime::RuntimeFlavor;

use ticklist::config::Config;
use ticklist::filter::ViewFilter;
use ticklist::model::{Category, CategoryChanges, Entity, Todo, TodoChanges, TodoDraft};
use ticklist::preferences::{
    PreferenceManager, CATEGORIES_FILTER, SELECTED_CATEGORY, TODOS_FILTER,
};
use ticklist::repository::{Repository, RepositoryError};
use ticklist::stats::TodoStats;
use ticklist::storage::{CollectionStore, Database, KeyValueStore};
use ticklist::undo::{Confirm, DeleteOutcome, Notify, UndoDelete};
use ticklist::util::{display_width, sanitize_label, strip_control_chars, truncate_to_width};

use crate::{CategoryCommand, Command};

/// Number of id characters shown in lists; any unique prefix is accepted back.
const SHORT_ID_LEN: usize = 8;

// ============================================================================
// Terminal prompts
// ============================================================================

/// Confirm and undo prompts on stdin/stderr.
struct TerminalPrompt {
    assume_yes: bool,
    confirm_delete: bool,
}

fn read_answer(prompt: &str) -> Option<String> {
    eprint!("{}", prompt);
    std::io::stderr().flush().ok();
    blocking_io(|| read_line_from(&mut std::io::stdin().lock()))
}

fn read_line_from(reader: &mut impl BufRead) -> Option<String> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// Run blocking terminal I/O without stalling the runtime's other tasks.
///
/// `block_in_place` is only available on the multi-threaded runtime; on a
/// current-thread runtime (or none) the closure runs inline.
fn blocking_io<T>(f: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

impl Confirm for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes || !self.confirm_delete {
            return true;
        }
        read_answer(&format!("{} [y/N] ", message))
            .is_some_and(|a| a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes"))
    }
}

impl Notify for TerminalPrompt {
    fn notify(&self, message: &str, actions: &[&str]) -> Option<usize> {
        if self.assume_yes || actions.is_empty() {
            eprintln!("{}", message);
            return None;
        }
        let answer = read_answer(&format!(
            "{} ({}, Enter to dismiss) ",
            message,
            actions.join("/")
        ))?
        .to_lowercase();
        if answer.is_empty() {
            return None;
        }
        // Accept the full action name or its first letter
        actions.iter().position(|action| {
            let action = action.to_lowercase();
            action == answer || (answer.chars().count() == 1 && action.starts_with(&answer))
        })
    }
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    db: Database,
    todos: Repository<Todo>,
    categories: Repository<Category>,
    prefs: PreferenceManager,
    list_width: usize,
    prompt: TerminalPrompt,
}

impl App {
    /// Load both collections and the merged preferences.
    pub async fn open(db: Database, config: Config, assume_yes: bool) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(db.clone());

        let todos = Repository::open_with_capacity(
            CollectionStore::new(Arc::clone(&store)),
            config.broadcast_capacity,
        )
        .await
        .context("Failed to load todos")?;
        let categories = Repository::open_with_capacity(
            CollectionStore::new(store),
            config.broadcast_capacity,
        )
        .await
        .context("Failed to load categories")?;

        let prefs = match PreferenceManager::load(&config, &db).await {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stored preferences, using config defaults");
                PreferenceManager::from_config(&config)
            }
        };

        Ok(Self {
            db,
            todos,
            categories,
            prompt: TerminalPrompt {
                assume_yes,
                confirm_delete: prefs.confirm_delete(),
            },
            prefs,
            list_width: config.list_width,
        })
    }

    pub async fn close(&self) {
        self.todos.close();
        self.categories.close();
        self.db.close().await;
    }

    pub async fn run(&mut self, command: Command, out: &mut dyn Write) -> Result<()> {
        match command {
            Command::Add {
                title,
                description,
                category,
            } => self.add(&title.join(" "), description, category, out).await,
            Command::List { filter, category } => {
                let mode = match filter {
                    Some(mode) => mode,
                    None => self
                        .prefs
                        .todos_filter()
                        .context("Saved todo filter is invalid")?,
                };
                let selector = match category {
                    Some(c) => Some(self.resolve_category(&c)?),
                    None => self.prefs.selected_category().map(str::to_string),
                };
                let mut view = ViewFilter::with_mode(self.todos.clone(), mode);
                view.set_grouping_selector(selector);
                self.print_todos(&view.filtered_view(), out)
            }
            Command::Show { id } => {
                let todo = self.todos.get_by_id(&self.resolve_todo(&id)?)?;
                self.print_todo_details(&todo, out)
            }
            Command::Edit {
                id,
                title,
                description,
                category,
                no_category,
            } => {
                self.edit(&id, title, description, category, no_category, out)
                    .await
            }
            Command::Done { id } => self.set_completed(&id, true, out).await,
            Command::Reopen { id } => self.set_completed(&id, false, out).await,
            Command::Rm { id } => {
                let id = self.resolve_todo(&id)?;
                let mut undo = UndoDelete::new(self.todos.clone());
                let outcome = undo.delete_with_prompts(&id, &self.prompt, &self.prompt).await?;
                print_delete_outcome(outcome, out)
            }
            Command::ClearCompleted => {
                let removed = self.todos.clear_completed().await?;
                writeln!(out, "Removed {}", plural(removed, "completed todo"))?;
                Ok(())
            }
            Command::CompleteAll { incomplete } => {
                let changed = self.todos.complete_all(!incomplete).await?;
                let state = if incomplete { "not completed" } else { "completed" };
                writeln!(out, "Marked {} {}", plural(changed, "todo"), state)?;
                Ok(())
            }
            Command::ToggleAll => {
                let changed = self.todos.toggle_all().await?;
                writeln!(out, "Toggled {}", plural(changed, "todo"))?;
                Ok(())
            }
            Command::Stats => {
                let stats = TodoStats::from_items(&self.todos.snapshot());
                writeln!(out, "Total:     {}", stats.total)?;
                writeln!(out, "Completed: {}", stats.completed)?;
                writeln!(out, "Active:    {}", stats.active)?;
                Ok(())
            }
            Command::Filter {
                mode,
                category,
                any_category,
            } => {
                self.prefs
                    .set(&self.db, TODOS_FILTER, &mode.to_string())
                    .await
                    .context("Failed to save filter")?;
                if let Some(category) = category {
                    let id = self.resolve_category(&category)?;
                    self.prefs
                        .set(&self.db, SELECTED_CATEGORY, &id)
                        .await
                        .context("Failed to save category selection")?;
                } else if any_category {
                    self.prefs
                        .clear(&self.db, SELECTED_CATEGORY)
                        .await
                        .context("Failed to clear category selection")?;
                }
                writeln!(out, "Default filter: {}", mode)?;
                Ok(())
            }
            Command::Category(command) => self.run_category(command, out).await,
        }
    }

    async fn run_category(&mut self, command: CategoryCommand, out: &mut dyn Write) -> Result<()> {
        match command {
            CategoryCommand::Add { name } => {
                let name =
                    sanitize_label(&name.join(" ")).context("Category name cannot be empty")?;
                let category = Category::new(name);
                self.categories.save(category.clone()).await?;
                writeln!(out, "Added category {}  {}", short_id(&category.id), category.name)?;
                Ok(())
            }
            CategoryCommand::List { filter } => {
                let mode = match filter {
                    Some(mode) => mode,
                    None => self
                        .prefs
                        .categories_filter()
                        .with_context(|| format!("Saved {} is invalid", CATEGORIES_FILTER))?,
                };
                let view = ViewFilter::with_mode(self.categories.clone(), mode);
                self.print_categories(&view.filtered_view(), out)
            }
            CategoryCommand::Rename { id, name } => {
                let id = self.resolve_category(&id)?;
                let name =
                    sanitize_label(&name.join(" ")).context("Category name cannot be empty")?;
                let renamed = self
                    .categories
                    .update(&id, |c| {
                        c.copy_with(CategoryChanges {
                            name: Some(name),
                            ..CategoryChanges::default()
                        })
                    })
                    .await?;
                writeln!(out, "Renamed category to '{}'", renamed.name)?;
                Ok(())
            }
            CategoryCommand::Activate { id } => self.set_category_active(&id, true, out).await,
            CategoryCommand::Deactivate { id } => self.set_category_active(&id, false, out).await,
            CategoryCommand::Rm { id } => {
                let id = self.resolve_category(&id)?;
                let mut undo = UndoDelete::new(self.categories.clone());
                let outcome = undo.delete_with_prompts(&id, &self.prompt, &self.prompt).await?;
                let deleted = matches!(outcome, DeleteOutcome::Deleted(_));
                print_delete_outcome(outcome, out)?;

                if deleted {
                    let orphans = self.todos.snapshot().iter().filter(|t| t.in_category(&id)).count();
                    if orphans > 0 {
                        writeln!(out, "{} still reference it", plural(orphans, "todo"))?;
                    }
                }
                Ok(())
            }
        }
    }

    // ========================================================================
    // Todo commands
    // ========================================================================

    async fn add(
        &self,
        title: &str,
        description: Option<String>,
        category: Option<String>,
        out: &mut dyn Write,
    ) -> Result<()> {
        let title = sanitize_label(title).context("Todo title cannot be empty")?;
        let category_id = category.map(|c| self.resolve_category(&c)).transpose()?;

        let todo = Todo::create(TodoDraft {
            id: None,
            title,
            description: description.unwrap_or_default().trim().to_string(),
            category_id,
        });
        self.todos.save(todo.clone()).await?;
        writeln!(out, "Added {}  {}", short_id(&todo.id), todo.title)?;
        Ok(())
    }

    async fn edit(
        &self,
        id: &str,
        title: Option<String>,
        description: Option<String>,
        category: Option<String>,
        no_category: bool,
        out: &mut dyn Write,
    ) -> Result<()> {
        let id = self.resolve_todo(id)?;

        let title = match title {
            Some(t) => Some(sanitize_label(&t).context("Todo title cannot be empty")?),
            None => None,
        };
        let category_id = match category {
            Some(c) => Some(Some(self.resolve_category(&c)?)),
            None if no_category => Some(None),
            None => None,
        };
        let changes = TodoChanges {
            title,
            description: description.map(|d| d.trim().to_string()),
            is_completed: None,
            category_id,
        };
        if changes.title.is_none() && changes.description.is_none() && changes.category_id.is_none()
        {
            bail!("Nothing to change: pass --title, --description, --category or --no-category");
        }

        let updated = self.todos.update(&id, |t| t.copy_with(changes)).await?;
        writeln!(out, "Updated {}  {}", short_id(&updated.id), updated.title)?;
        Ok(())
    }

    async fn set_completed(&self, id: &str, value: bool, out: &mut dyn Write) -> Result<()> {
        let id = self.resolve_todo(id)?;
        let todo = self.todos.set_completed(&id, value).await?;
        let verb = if value { "Completed" } else { "Reopened" };
        writeln!(out, "{} '{}'", verb, todo.title)?;
        Ok(())
    }

    async fn set_category_active(&self, id: &str, active: bool, out: &mut dyn Write) -> Result<()> {
        let id = self.resolve_category(id)?;
        let category = self
            .categories
            .update(&id, |c| {
                c.copy_with(CategoryChanges {
                    active: Some(active),
                    ..CategoryChanges::default()
                })
            })
            .await?;
        let state = if active { "active" } else { "inactive" };
        writeln!(out, "Category '{}' is now {}", category.name, state)?;
        Ok(())
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn category_name(&self, id: &str) -> Option<String> {
        self.categories.get_by_id(id).ok().map(|c| c.name)
    }

    fn print_todos(&self, todos: &[Todo], out: &mut dyn Write) -> Result<()> {
        if todos.is_empty() {
            writeln!(out, "No todos.")?;
            return Ok(());
        }

        for todo in todos {
            let mark = if todo.is_completed { "[x]" } else { "[ ]" };
            let prefix = format!("{} {}  ", mark, short_id(&todo.id));
            let suffix = todo
                .category_id
                .as_deref()
                .and_then(|id| self.category_name(id))
                .map(|name| format!("  @{}", strip_control_chars(&name)))
                .unwrap_or_default();
            let room = self
                .list_width
                .saturating_sub(display_width(&prefix) + display_width(&suffix));
            let title = strip_control_chars(&todo.title);
            writeln!(out, "{}{}{}", prefix, truncate_to_width(&title, room), suffix)?;
        }

        let stats = TodoStats::from_items(todos);
        writeln!(out, "{} active, {} completed", stats.active, stats.completed)?;
        Ok(())
    }

    fn print_todo_details(&self, todo: &Todo, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Id:          {}", todo.id)?;
        writeln!(out, "Title:       {}", strip_control_chars(&todo.title))?;
        if !todo.description.is_empty() {
            writeln!(out, "Description: {}", strip_control_chars(&todo.description))?;
        }
        writeln!(out, "Completed:   {}", if todo.is_completed { "yes" } else { "no" })?;
        if let Some(category_id) = &todo.category_id {
            let name = self
                .category_name(category_id)
                .unwrap_or_else(|| format!("(missing category {})", category_id));
            writeln!(out, "Category:    {}", strip_control_chars(&name))?;
        }
        Ok(())
    }

    fn print_categories(&self, categories: &[Category], out: &mut dyn Write) -> Result<()> {
        if categories.is_empty() {
            writeln!(out, "No categories.")?;
            return Ok(());
        }

        let todos = self.todos.snapshot();
        for category in categories {
            let count = todos.iter().filter(|t| t.in_category(&category.id)).count();
            let state = if category.active { "" } else { " (inactive)" };
            let prefix = format!("{}  ", short_id(&category.id));
            let suffix = format!("{}  {}", state, plural(count, "todo"));
            let room = self
                .list_width
                .saturating_sub(display_width(&prefix) + display_width(&suffix));
            let name = strip_control_chars(&category.name);
            writeln!(out, "{}{}{}", prefix, truncate_to_width(&name, room), suffix)?;
        }
        Ok(())
    }

    // ========================================================================
    // Id resolution
    // ========================================================================

    fn resolve_todo(&self, needle: &str) -> Result<String> {
        resolve_id(&self.todos, needle)
    }

    /// Resolve a category by id, unique id prefix, or exact name.
    /// Resolve a category by exact id, then by unique name, then by id prefix.
    fn resolve_category(&self, needle: &str) -> Result<String> {
        let needle = needle.trim();
        let snapshot = self.categories.snapshot();
        if snapshot.iter().any(|c| c.id == needle) {
            return Ok(needle.to_string());
        }

        let named: Vec<&Category> = snapshot
            .iter()
            .filter(|c| c.name.eq_ignore_ascii_case(needle))
            .collect();
        match named.as_slice() {
            [only] => Ok(only.id.clone()),
            [] => resolve_id(&self.categories, needle),
            many => bail!(
                "category name '{}' is ambiguous ({} matches), use an id",
                needle,
                many.len()
            ),
        }
    }
}

/// Resolve a full id or a unique id prefix to the stored id.
fn resolve_id<E: Entity>(repo: &Repository<E>, needle: &str) -> Result<String> {
    let needle = needle.trim();
    let snapshot = repo.snapshot();
    if snapshot.iter().any(|e| e.id() == needle) {
        return Ok(needle.to_string());
    }

    let matches: Vec<&E> = if needle.is_empty() {
        Vec::new()
    } else {
        snapshot.iter().filter(|e| e.id().starts_with(needle)).collect()
    };
    match matches.as_slice() {
        [only] => Ok(only.id().to_string()),
        [] => Err(RepositoryError::NotFound {
            kind: E::KIND,
            id: needle.to_string(),
        }
        .into()),
        many => bail!(
            "{} id prefix '{}' is ambiguous ({} matches)",
            E::KIND,
            needle,
            many.len()
        ),
    }
}

fn print_delete_outcome<E: Entity>(outcome: DeleteOutcome<E>, out: &mut dyn Write) -> Result<()> {
    match outcome {
        DeleteOutcome::Cancelled => writeln!(out, "Nothing deleted")?,
        DeleteOutcome::Deleted(removed) => writeln!(out, "Deleted '{}'", removed.entity.label())?,
        DeleteOutcome::Restored(entity) => writeln!(out, "Restored '{}'", entity.label())?,
    }
    Ok(())
}

fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ticklist::filter::TodosViewFilter;

    async fn test_app() -> App {
        let db = Database::open(":memory:").await.unwrap();
        App::open(db, Config::default(), true).await.unwrap()
    }

    async fn run(app: &mut App, command: Command) -> String {
        let mut out = Vec::new();
        app.run(command, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    fn add(title: &str) -> Command {
        Command::Add {
            title: title.split(' ').map(str::to_string).collect(),
            description: None,
            category: None,
        }
    }

    fn list() -> Command {
        Command::List {
            filter: None,
            category: None,
        }
    }

    fn todo_id(app: &App, title: &str) -> String {
        app.todos
            .snapshot()
            .iter()
            .find(|t| t.title == title)
            .map(|t| t.id.clone())
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let mut app = test_app().await;
        run(&mut app, add("Buy milk")).await;
        run(&mut app, add("Walk the dog")).await;

        let output = run(&mut app, list()).await;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[ ] "));
        assert!(lines[0].ends_with("Buy milk"));
        assert!(lines[1].ends_with("Walk the dog"));
        assert_eq!(lines[2], "2 active, 0 completed");
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let mut app = test_app().await;
        let mut out = Vec::new();
        let err = app.run(add("   "), &mut out).await.unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
        assert!(app.todos.is_empty());
    }

    #[tokio::test]
    async fn test_done_and_filtered_list() {
        let mut app = test_app().await;
        run(&mut app, add("one")).await;
        run(&mut app, add("two")).await;

        let id = todo_id(&app, "two");
        let output = run(&mut app, Command::Done { id: id[..6].to_string() }).await;
        assert_eq!(output, "Completed 'two'\n");

        let output = run(
            &mut app,
            Command::List {
                filter: Some(TodosViewFilter::CompletedOnly),
                category: None,
            },
        )
        .await;
        assert!(output.contains("[x] "));
        assert!(!output.contains("one"));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let mut app = test_app().await;
        let mut out = Vec::new();
        let err = app
            .run(Command::Done { id: "nope".to_string() }, &mut out)
            .await
            .unwrap_err();
        let repo_err = err.downcast_ref::<RepositoryError>().unwrap();
        assert!(repo_err.is_not_found());
    }

    #[tokio::test]
    async fn test_rm_with_assume_yes() {
        let mut app = test_app().await;
        run(&mut app, add("temporary")).await;
        let id = todo_id(&app, "temporary");

        let output = run(&mut app, Command::Rm { id }).await;
        assert_eq!(output, "Deleted 'temporary'\n");
        assert!(app.todos.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_commands() {
        let mut app = test_app().await;
        run(&mut app, add("a")).await;
        run(&mut app, add("b")).await;

        let output = run(&mut app, Command::ToggleAll).await;
        assert_eq!(output, "Toggled 2 todos\n");
        assert!(app.todos.snapshot().iter().all(|t| t.is_completed));

        run(&mut app, Command::CompleteAll { incomplete: true }).await;
        assert!(app.todos.snapshot().iter().all(|t| !t.is_completed));

        let id = todo_id(&app, "a");
        run(&mut app, Command::Done { id }).await;
        let output = run(&mut app, Command::ClearCompleted).await;
        assert_eq!(output, "Removed 1 completed todo\n");

        let output = run(&mut app, Command::Stats).await;
        assert_eq!(output, "Total:     1\nCompleted: 0\nActive:    1\n");
    }

    #[tokio::test]
    async fn test_categories_group_todos() {
        let mut app = test_app().await;
        run(
            &mut app,
            Command::Category(CategoryCommand::Add {
                name: vec!["Work".to_string()],
            }),
        )
        .await;
        run(
            &mut app,
            Command::Add {
                title: vec!["Report".to_string()],
                description: Some("quarterly".to_string()),
                category: Some("work".to_string()),
            },
        )
        .await;
        run(&mut app, add("Groceries")).await;

        let output = run(
            &mut app,
            Command::List {
                filter: None,
                category: Some("Work".to_string()),
            },
        )
        .await;
        assert!(output.contains("Report  @Work"));
        assert!(!output.contains("Groceries"));

        let output = run(
            &mut app,
            Command::Category(CategoryCommand::List { filter: None }),
        )
        .await;
        assert!(output.trim_end().ends_with("Work  1 todo"));
    }

    #[tokio::test]
    async fn test_saved_filter_applies_to_list() {
        let mut app = test_app().await;
        run(&mut app, add("open")).await;
        run(&mut app, add("closed")).await;
        let id = todo_id(&app, "closed");
        run(&mut app, Command::Done { id }).await;

        run(
            &mut app,
            Command::Filter {
                mode: TodosViewFilter::ActiveOnly,
                category: None,
                any_category: false,
            },
        )
        .await;
        assert_eq!(app.prefs.todos_filter(), Ok(TodosViewFilter::ActiveOnly));

        let output = run(&mut app, list()).await;
        assert!(output.contains("open"));
        assert!(!output.contains("closed"));
    }

    #[tokio::test]
    async fn test_edit_changes_fields() {
        let mut app = test_app().await;
        run(&mut app, add("draft")).await;
        let id = todo_id(&app, "draft");

        run(
            &mut app,
            Command::Edit {
                id: id.clone(),
                title: Some("final".to_string()),
                description: Some("  notes ".to_string()),
                category: None,
                no_category: false,
            },
        )
        .await;

        let todo = app.todos.get_by_id(&id).unwrap();
        assert_eq!(todo.title, "final");
        assert_eq!(todo.description, "notes");

        let mut out = Vec::new();
        let err = app
            .run(
                Command::Edit {
                    id,
                    title: None,
                    description: None,
                    category: None,
                    no_category: false,
                },
                &mut out,
            )
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Nothing to change"));
    }

    #[tokio::test]
    async fn test_category_resolution_order() {
        let mut app = test_app().await;
        let first = Category::new("Work");
        let second = Category::new("work");
        app.categories.save(first.clone()).await.unwrap();
        app.categories.save(second.clone()).await.unwrap();
        let home = Category::new("Home");
        app.categories.save(home.clone()).await.unwrap();

        // Exact id wins over names
        assert_eq!(app.resolve_category(&second.id).unwrap(), second.id);
        assert_eq!(app.resolve_category(" home ").unwrap(), home.id);

        let err = app.resolve_category("WORK").unwrap_err();
        assert!(err.to_string().contains("ambiguous (2 matches)"));

        let mut out = Vec::new();
        let err = app
            .run(
                Command::Add {
                    title: vec!["Report".to_string()],
                    description: None,
                    category: Some("Work".to_string()),
                },
                &mut out,
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
        assert!(app.todos.is_empty());
    }

    #[test]
    fn test_read_line_from_trims_and_detects_eof() {
        let mut input = std::io::Cursor::new("  yes \nsecond\n");
        assert_eq!(read_line_from(&mut input).as_deref(), Some("yes"));
        assert_eq!(read_line_from(&mut input).as_deref(), Some("second"));
        assert_eq!(read_line_from(&mut input), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_io_on_multi_thread_runtime() {
        assert_eq!(blocking_io(|| 40 + 2), 42);
    }

    #[tokio::test]
    async fn test_blocking_io_on_current_thread_runtime() {
        assert_eq!(blocking_io(|| "inline"), "inline");
    }

    #[test]
    fn test_plural_and_short_id() {
        assert_eq!(plural(1, "todo"), "1 todo");
        assert_eq!(plural(0, "todo"), "0 todos");
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
