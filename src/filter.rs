//! Derived, order-preserving views over a repository's collection.
//!
//! A view is a pure function of the filter mode, the grouping selector and
//! the repository's current snapshot. Filtering never reorders, only excludes.

use futures::Stream;
use std::fmt::{self, Debug, Display};
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::watch;

use crate::model::{Category, Entity, Todo};
use crate::repository::{Repository, Snapshot, Subscription};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The filter mode is not one this entity kind understands.
    #[error("Invalid {kind} filter mode: '{value}'")]
    InvalidMode { kind: &'static str, value: String },
}

// ============================================================================
// Filter Modes
// ============================================================================

/// A view filter mode for one entity kind.
pub trait FilterMode:
    Copy + Eq + Default + Debug + Display + FromStr<Err = FilterError> + Send + Sync + 'static
{
}

/// Filter modes for the todo list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TodosViewFilter {
    #[default]
    All,
    ActiveOnly,
    CompletedOnly,
}

/// Filter modes for the category list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoriesViewFilter {
    #[default]
    All,
    ActiveOnly,
    InactiveOnly,
}

impl FilterMode for TodosViewFilter {}
impl FilterMode for CategoriesViewFilter {}

fn invalid(kind: &'static str, value: impl Into<String>) -> FilterError {
    FilterError::InvalidMode {
        kind,
        value: value.into(),
    }
}

impl FromStr for TodosViewFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(Self::All),
            "active" | "activeOnly" | "active-only" => Ok(Self::ActiveOnly),
            "completed" | "completedOnly" | "completed-only" => Ok(Self::CompletedOnly),
            other => Err(invalid(Todo::KIND, other)),
        }
    }
}

impl FromStr for CategoriesViewFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(Self::All),
            "active" | "activeOnly" | "active-only" => Ok(Self::ActiveOnly),
            "inactive" | "inactiveOnly" | "inactive-only" => Ok(Self::InactiveOnly),
            other => Err(invalid(Category::KIND, other)),
        }
    }
}

/// Numeric modes as stored by older clients: 0 = all, 1 = active, 2 = completed.
impl TryFrom<u8> for TodosViewFilter {
    type Error = FilterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::All),
            1 => Ok(Self::ActiveOnly),
            2 => Ok(Self::CompletedOnly),
            other => Err(invalid(Todo::KIND, other.to_string())),
        }
    }
}

impl TryFrom<u8> for CategoriesViewFilter {
    type Error = FilterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::All),
            1 => Ok(Self::ActiveOnly),
            2 => Ok(Self::InactiveOnly),
            other => Err(invalid(Category::KIND, other.to_string())),
        }
    }
}

impl Display for TodosViewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::ActiveOnly => "active",
            Self::CompletedOnly => "completed",
        })
    }
}

impl Display for CategoriesViewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::ActiveOnly => "active",
            Self::InactiveOnly => "inactive",
        })
    }
}

// ============================================================================
// Filterable Entities
// ============================================================================

/// Entities that can be shown through a [`ViewFilter`].
pub trait Filterable: Entity {
    type Mode: FilterMode;

    fn matches_mode(&self, mode: Self::Mode) -> bool;

    /// Key compared against the grouping selector.
    fn group_key(&self) -> Option<&str>;
}

impl Filterable for Todo {
    type Mode = TodosViewFilter;

    fn matches_mode(&self, mode: TodosViewFilter) -> bool {
        match mode {
            TodosViewFilter::All => true,
            TodosViewFilter::ActiveOnly => !self.is_completed,
            TodosViewFilter::CompletedOnly => self.is_completed,
        }
    }

    fn group_key(&self) -> Option<&str> {
        self.category_id.as_deref()
    }
}

impl Filterable for Category {
    type Mode = CategoriesViewFilter;

    fn matches_mode(&self, mode: CategoriesViewFilter) -> bool {
        match mode {
            CategoriesViewFilter::All => true,
            CategoriesViewFilter::ActiveOnly => self.active,
            CategoriesViewFilter::InactiveOnly => !self.active,
        }
    }

    fn group_key(&self) -> Option<&str> {
        Some(&self.id)
    }
}

/// Keep the items matching `mode` and, when given, the grouping `selector`.
pub fn filter_items<E: Filterable>(items: &[E], mode: E::Mode, selector: Option<&str>) -> Vec<E> {
    items
        .iter()
        .filter(|item| item.matches_mode(mode))
        .filter(|item| match selector {
            Some(s) => item.group_key() == Some(s),
            None => true,
        })
        .cloned()
        .collect()
}

// ============================================================================
// ViewFilter
// ============================================================================

/// Mode and grouping selector a view is computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Criteria<M> {
    mode: M,
    selector: Option<String>,
}

/// Filter state over a repository. Holds no copy of the collection.
///
/// Filter changes are published to every [`ViewFilter::stream`], so streams
/// and [`ViewFilter::filtered_view`] always agree.
pub struct ViewFilter<E: Filterable> {
    repo: Repository<E>,
    criteria: watch::Sender<Criteria<E::Mode>>,
}

impl<E: Filterable> ViewFilter<E> {
    pub fn new(repo: Repository<E>) -> Self {
        Self::with_mode(repo, E::Mode::default())
    }

    pub fn with_mode(repo: Repository<E>, mode: E::Mode) -> Self {
        let (criteria, _) = watch::channel(Criteria {
            mode,
            selector: None,
        });
        Self { repo, criteria }
    }

    pub fn set_filter(&mut self, mode: E::Mode) {
        tracing::debug!(kind = E::KIND, %mode, "Set view filter");
        self.criteria.send_if_modified(|c| {
            let changed = c.mode != mode;
            c.mode = mode;
            changed
        });
    }

    pub fn filter(&self) -> E::Mode {
        self.criteria.borrow().mode
    }

    /// Restrict the view to one group (e.g. a category id), or lift the restriction.
    pub fn set_grouping_selector(&mut self, selector: Option<String>) {
        self.criteria.send_if_modified(|c| {
            let changed = c.selector != selector;
            c.selector = selector;
            changed
        });
    }

    pub fn grouping_selector(&self) -> Option<String> {
        self.criteria.borrow().selector.clone()
    }

    /// The filtered view of the repository's current snapshot.
    pub fn filtered_view(&self) -> Vec<E> {
        let criteria = self.criteria.borrow();
        filter_items(&self.repo.snapshot(), criteria.mode, criteria.selector.as_deref())
    }

    /// Filtered views starting with the current one, recomputed for every
    /// repository change and every filter or selector change.
    ///
    /// Ends when the repository closes. Once this `ViewFilter` is dropped the
    /// stream keeps its last criteria and follows repository changes only.
    pub fn stream(&self) -> impl Stream<Item = Vec<E>> + Send {
        let state = ViewStream {
            subscription: self.repo.get_all(),
            criteria: self.criteria.subscribe(),
            criteria_open: true,
            current: None,
        };
        futures::stream::unfold(state, |mut state| async move {
            state.next_view().await.map(|view| (view, state))
        })
    }
}

struct ViewStream<E: Filterable> {
    subscription: Subscription<E>,
    criteria: watch::Receiver<Criteria<E::Mode>>,
    criteria_open: bool,
    current: Option<Snapshot<E>>,
}

impl<E: Filterable> ViewStream<E> {
    async fn next_view(&mut self) -> Option<Vec<E>> {
        let snapshot = match self.current.take() {
            None => self.subscription.next().await?,
            Some(current) => loop {
                if !self.criteria_open {
                    break self.subscription.next().await?;
                }
                tokio::select! {
                    next = self.subscription.next() => break next?,
                    changed = self.criteria.changed() => {
                        if changed.is_ok() {
                            break current;
                        }
                        self.criteria_open = false;
                    }
                }
            },
        };

        let view = {
            let criteria = self.criteria.borrow_and_update();
            filter_items(&snapshot, criteria.mode, criteria.selector.as_deref())
        };
        self.current = Some(snapshot);
        Some(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryChanges, TodoChanges, TodoDraft};
    use crate::storage::{CollectionStore, MemoryStore};
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn todo(id: &str, completed: bool, category: Option<&str>) -> Todo {
        Todo::create(TodoDraft {
            id: Some(id.to_string()),
            title: format!("Todo {}", id),
            category_id: category.map(str::to_string),
            ..TodoDraft::default()
        })
        .copy_with(TodoChanges {
            is_completed: Some(completed),
            ..TodoChanges::default()
        })
    }

    async fn repo_with<E: Entity>(items: &[E]) -> Repository<E> {
        let store = CollectionStore::new(Arc::new(MemoryStore::new()));
        store.save_all(items).await.unwrap();
        Repository::open(store).await.unwrap()
    }

    #[tokio::test]
    async fn test_todo_filter_modes() {
        let one = todo("1", false, None);
        let two = todo("2", true, None);
        let mut view = ViewFilter::new(repo_with(&[one.clone(), two.clone()]).await);

        assert_eq!(view.filter(), TodosViewFilter::All);
        assert_eq!(view.filtered_view(), vec![one.clone(), two.clone()]);

        view.set_filter(TodosViewFilter::ActiveOnly);
        assert_eq!(view.filtered_view(), vec![one]);

        view.set_filter(TodosViewFilter::CompletedOnly);
        assert_eq!(view.filtered_view(), vec![two]);
    }

    #[tokio::test]
    async fn test_grouping_selector() {
        let items = [
            todo("1", false, Some("work")),
            todo("2", false, Some("home")),
            todo("3", true, Some("work")),
            todo("4", false, None),
        ];
        let mut view = ViewFilter::new(repo_with(&items).await);

        view.set_grouping_selector(Some("work".to_string()));
        let ids: Vec<_> = view.filtered_view().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["1", "3"]);

        view.set_filter(TodosViewFilter::ActiveOnly);
        let ids: Vec<_> = view.filtered_view().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["1"]);

        assert_eq!(view.grouping_selector().as_deref(), Some("work"));
        view.set_grouping_selector(None);
        assert_eq!(view.grouping_selector(), None);
        assert_eq!(view.filtered_view().len(), 3);
    }

    #[tokio::test]
    async fn test_view_tracks_repository_changes() {
        let repo = repo_with(&[todo("1", false, None)]).await;
        let view = ViewFilter::with_mode(repo.clone(), TodosViewFilter::CompletedOnly);
        assert!(view.filtered_view().is_empty());

        repo.complete_all(true).await.unwrap();
        assert_eq!(view.filtered_view().len(), 1);
    }

    #[tokio::test]
    async fn test_view_never_mutates_repository() {
        let repo = repo_with(&[todo("1", false, None), todo("2", true, None)]).await;
        let mut view = ViewFilter::new(repo.clone());
        view.set_filter(TodosViewFilter::ActiveOnly);
        let _ = view.filtered_view();

        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_stream_recomputes_on_change() {
        let repo = repo_with(&[todo("1", false, None)]).await;
        let mut view = ViewFilter::new(repo.clone());
        view.set_filter(TodosViewFilter::ActiveOnly);
        let mut stream = Box::pin(view.stream());

        assert_eq!(stream.next().await.unwrap().len(), 1);

        repo.save(todo("2", false, None)).await.unwrap();
        assert_eq!(stream.next().await.unwrap().len(), 2);

        repo.set_completed("1", true).await.unwrap();
        let ids: Vec<_> = stream.next().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[tokio::test]
    async fn test_stream_follows_filter_changes() {
        let repo = repo_with(&[todo("1", false, Some("work")), todo("2", true, None)]).await;
        let mut view = ViewFilter::new(repo.clone());
        let mut stream = Box::pin(view.stream());
        assert_eq!(stream.next().await.unwrap().len(), 2);

        view.set_filter(TodosViewFilter::CompletedOnly);
        let ids: Vec<_> = stream.next().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["2"]);

        // Later repository changes use the new mode too
        repo.save(todo("3", false, None)).await.unwrap();
        let next = stream.next().await.unwrap();
        assert_eq!(next, view.filtered_view());
        assert_eq!(next.len(), 1);

        view.set_filter(TodosViewFilter::All);
        view.set_grouping_selector(Some("work".to_string()));
        let ids: Vec<_> = stream.next().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[tokio::test]
    async fn test_stream_outlives_view_filter() {
        let repo = repo_with(&[todo("1", false, None)]).await;
        let mut view = ViewFilter::new(repo.clone());
        view.set_filter(TodosViewFilter::ActiveOnly);
        let mut stream = Box::pin(view.stream());
        assert_eq!(stream.next().await.unwrap().len(), 1);
        drop(view);

        repo.save(todo("2", true, None)).await.unwrap();
        assert_eq!(stream.next().await.unwrap().len(), 1);

        repo.close();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_category_filter_modes() {
        let work = Category::new("Work");
        let old = Category::new("Old").copy_with(CategoryChanges {
            active: Some(false),
            ..CategoryChanges::default()
        });
        let mut view = ViewFilter::new(repo_with(&[work.clone(), old.clone()]).await);

        view.set_filter(CategoriesViewFilter::ActiveOnly);
        assert_eq!(view.filtered_view(), vec![work.clone()]);

        view.set_filter(CategoriesViewFilter::InactiveOnly);
        assert_eq!(view.filtered_view(), vec![old]);

        view.set_filter(CategoriesViewFilter::All);
        view.set_grouping_selector(Some(work.id.clone()));
        assert_eq!(view.filtered_view(), vec![work]);
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("all".parse::<TodosViewFilter>(), Ok(TodosViewFilter::All));
        assert_eq!(
            "active".parse::<TodosViewFilter>(),
            Ok(TodosViewFilter::ActiveOnly)
        );
        assert_eq!(
            "completedOnly".parse::<TodosViewFilter>(),
            Ok(TodosViewFilter::CompletedOnly)
        );
        assert_eq!(
            "inactive".parse::<CategoriesViewFilter>(),
            Ok(CategoriesViewFilter::InactiveOnly)
        );
    }

    #[test]
    fn test_unknown_mode_is_rejected_not_defaulted() {
        let err = "done".parse::<TodosViewFilter>().unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidMode {
                kind: "todo",
                value: "done".to_string()
            }
        );
        // "completed" is a todo mode, not a category mode
        assert!("completed".parse::<CategoriesViewFilter>().is_err());
        assert!("".parse::<TodosViewFilter>().is_err());
    }

    #[test]
    fn test_numeric_modes() {
        assert_eq!(TodosViewFilter::try_from(2), Ok(TodosViewFilter::CompletedOnly));
        assert_eq!(CategoriesViewFilter::try_from(1), Ok(CategoriesViewFilter::ActiveOnly));
        assert!(TodosViewFilter::try_from(3).is_err());
        assert!(CategoriesViewFilter::try_from(255).is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for mode in [
            TodosViewFilter::All,
            TodosViewFilter::ActiveOnly,
            TodosViewFilter::CompletedOnly,
        ] {
            assert_eq!(mode.to_string().parse::<TodosViewFilter>(), Ok(mode));
        }
    }
}
