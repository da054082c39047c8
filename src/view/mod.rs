//! Stateless presentation of list state. `render` maps a controller snapshot to a
//! [`View`]; `Display` on the view gives the text rendering the command-line host prints.

mod tables;

use std::fmt;

use crate::api::pages_for;
use crate::controller::list::ListState;
use crate::models::Record;

/// Column layout for a record type.
pub trait Tabular {
    fn headers() -> Vec<&'static str>;

    fn cells(&self) -> Vec<String>;

    fn row_actions() -> &'static [RowAction] {
        &[RowAction::Edit, RowAction::Delete]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading,
    Error { message: String, retry: bool },
    Empty { message: String },
    Table(TableView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<RowView>,
    pub pager: Pager,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: String,
    pub cells: Vec<String>,
    pub deleting: bool,
    pub actions: Vec<RowAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Pager {
    /// Pager for a page that has rows on it, so there are always at least `page` pages.
    pub fn new(page: u32, total_pages: u32, total: u64) -> Self {
        let page = page.max(1);
        let total_pages = total_pages.max(page);
        Self {
            page,
            total_pages,
            total,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }
}

pub fn render<T: Record + Tabular>(state: &ListState<T>, empty_message: &str) -> View {
    if state.loading {
        return View::Loading;
    }

    // A failed load keeps the previous rows, but the failure is what gets shown
    if let Some(message) = &state.error {
        return View::Error {
            message: message.clone(),
            retry: true,
        };
    }

    if state.items.is_empty() {
        return View::Empty {
            message: empty_message.to_string(),
        };
    }

    let rows = state
        .items
        .iter()
        .map(|item| RowView {
            id: item.id().to_string(),
            cells: item.cells(),
            deleting: state.deleting.contains(item.id()),
            actions: T::row_actions().to_vec(),
        })
        .collect();

    let total_pages = if state.total_pages > 0 {
        state.total_pages
    } else {
        pages_for(state.total, state.limit)
    };

    View::Table(TableView {
        headers: T::headers().into_iter().map(str::to_string).collect(),
        rows,
        pager: Pager::new(
            state.page,
            total_pages,
            state.total.max(state.items.len() as u64),
        ),
    })
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Loading => writeln!(f, "Loading..."),
            View::Error { message, retry } => {
                writeln!(f, "Error: {}", message)?;
                if *retry {
                    writeln!(f, "Run the command again to retry.")?;
                }
                Ok(())
            }
            View::Empty { message } => writeln!(f, "{}", message),
            View::Table(table) => write!(f, "{}", table),
        }
    }
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut headers = vec!["ID".to_string()];
        headers.extend(self.headers.iter().cloned());

        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let id = if row.deleting {
                    format!("{} (deleting)", row.id)
                } else {
                    row.id.clone()
                };
                let mut cells = vec![id];
                cells.extend(row.cells.iter().cloned());
                cells
            })
            .collect();

        let widths: Vec<usize> = (0..headers.len())
            .map(|col| {
                body.iter()
                    .filter_map(|r| r.get(col))
                    .chain(std::iter::once(&headers[col]))
                    .map(|c| c.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{:<width$}", c, width = widths.get(i).copied().unwrap_or(0)))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        writeln!(f, "{}", line(&headers))?;
        for row in &body {
            writeln!(f, "{}", line(row))?;
        }

        let pager = &self.pager;
        writeln!(
            f,
            "Page {} of {} ({} total)",
            pager.page, pager.total_pages, pager.total
        )
    }
}
