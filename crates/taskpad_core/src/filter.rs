//! Filter engine over a borrowed task collection.
//!
//! # Responsibility
//! - Select tasks by case-insensitive title substring and exact category.
//! - Aggregate the category choices offered to the user.
//!
//! # Invariants
//! - Filtering never mutates or reorders the source collection.
//! - A view borrows the collection, so it cannot outlive the next mutation.

use crate::model::task::Task;
use std::collections::BTreeSet;

/// Category sentinel that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Lazy, restartable filtered view.
///
/// Each call to [`TaskFilter::iter`] walks the source from the start.
#[derive(Debug, Clone)]
pub struct TaskFilter<'a> {
    tasks: &'a [Task],
    query: String,
    category: String,
}

impl<'a> TaskFilter<'a> {
    pub fn new(tasks: &'a [Task], query: &str, category: &str) -> Self {
        Self {
            tasks,
            query: query.to_lowercase(),
            category: category.to_string(),
        }
    }

    /// Returns whether one task passes both predicates.
    pub fn matches(&self, task: &Task) -> bool {
        let title_matches =
            self.query.is_empty() || task.title.to_lowercase().contains(&self.query);
        let category_matches = self.category == ALL_CATEGORIES || task.category == self.category;
        title_matches && category_matches
    }

    /// Matching tasks in source order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.tasks.iter().filter(move |task| self.matches(task))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn to_vec(&self) -> Vec<Task> {
        self.iter().cloned().collect()
    }
}

/// Builds a filtered view over `tasks`.
pub fn filter<'a>(tasks: &'a [Task], query: &str, category: &str) -> TaskFilter<'a> {
    TaskFilter::new(tasks, query, category)
}

/// Distinct non-empty categories plus [`ALL_CATEGORIES`].
pub fn available_categories(tasks: &[Task]) -> BTreeSet<String> {
    let mut categories = tasks
        .iter()
        .filter(|task| !task.is_uncategorized())
        .map(|task| task.category.clone())
        .collect::<BTreeSet<_>>();
    categories.insert(ALL_CATEGORIES.to_string());
    categories
}
