pub mod form;
pub mod list;
pub mod query;

pub use form::{FormController, FormState};
pub use list::{ListController, ListState, LoadOutcome, MutationOutcome, Reconcile};
pub use query::{NoMirror, PageQuery, QueryMirror, SharedLocation};
