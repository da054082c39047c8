use std::sync::{Mutex, MutexGuard};

use super::list::{ListController, MutationOutcome};
use crate::api::FilePart;
use crate::error::{ClientError, ClientResult};
use crate::forms::{FieldErrors, FormDraft, FormMode, FormSpec, RecordOf};
use crate::models::Record;

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub open: bool,
    pub submitting: bool,
    pub mode: FormMode,
    pub draft: FormDraft,
    pub errors: FieldErrors,
    pub server_error: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            open: false,
            submitting: false,
            mode: FormMode::Create,
            draft: FormDraft::new(),
            errors: FieldErrors::new(),
            server_error: None,
        }
    }
}

/// Modal create/edit form bound to one resource.
pub struct FormController<F: FormSpec> {
    spec: F,
    state: Mutex<FormState>,
}

impl<F: FormSpec> FormController<F> {
    pub fn new(spec: F) -> Self {
        Self {
            spec,
            state: Mutex::new(FormState::default()),
        }
    }

    pub fn spec(&self) -> &F {
        &self.spec
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> FormState {
        self.lock().clone()
    }

    /// Edit mode seeded from `initial`, or an empty create form.
    pub fn open(&self, initial: Option<&RecordOf<F>>) {
        match initial {
            Some(record) => {
                let draft = self.spec.draft_from(record);
                self.open_with(FormMode::Edit(record.id().to_string()), draft);
            }
            None => self.open_with(FormMode::Create, FormDraft::new()),
        }
    }

    /// Opens with a prepared draft, e.g. a create form prefilled from stored defaults.
    pub fn open_with(&self, mode: FormMode, draft: FormDraft) {
        let mut state = self.lock();
        if state.submitting {
            return;
        }
        *state = FormState {
            open: true,
            mode,
            draft,
            ..FormState::default()
        };
    }

    pub fn set_field(&self, name: &str, value: impl Into<String>) {
        let mut state = self.lock();
        state.draft.set(name, value);
        state.errors.remove(name);
    }

    pub fn set_file(&self, file: FilePart) {
        let mut state = self.lock();
        state.errors.remove(&file.field);
        state.draft.set_file(file);
    }

    pub fn validate(&self) -> FieldErrors {
        let mut state = self.lock();
        let errors = self.spec.validate(&state.draft, &state.mode);
        state.errors = errors.clone();
        errors
    }

    /// Returns whether the form closed. Closing is refused while a submit is in flight.
    pub fn close(&self) -> bool {
        let mut state = self.lock();
        if state.submitting {
            return false;
        }
        state.open = false;
        state.errors = FieldErrors::new();
        state.server_error = None;
        true
    }

    /// Validates, then hands the payload to the list controller. Invalid drafts never reach
    /// the network. On success the form closes and clears; on failure it stays open with the
    /// draft intact and the server's message.
    pub async fn submit(
        &self,
        list: &ListController<F::Resource>,
    ) -> ClientResult<MutationOutcome<RecordOf<F>>> {
        let (mode, payload) = {
            let mut state = self.lock();
            if state.submitting {
                return Err(ClientError::Validation(FieldErrors::single(
                    "form",
                    "A submission is already in progress.",
                )));
            }

            let errors = self.spec.validate(&state.draft, &state.mode);
            if !errors.is_empty() {
                log::debug!("Form rejected locally: {}", errors);
                state.errors = errors.clone();
                return Err(ClientError::Validation(errors));
            }

            state.errors = FieldErrors::new();
            state.server_error = None;
            state.submitting = true;
            (state.mode.clone(), self.spec.to_payload(&state.draft))
        };

        let result = match &mode {
            FormMode::Create => list.create(payload).await,
            FormMode::Edit(id) => list.update(id, payload).await,
        };

        let mut state = self.lock();
        state.submitting = false;
        match &result {
            Ok(_) => {
                *state = FormState::default();
            }
            Err(e) => {
                state.server_error = Some(e.user_message());
            }
        }
        drop(state);

        result
    }
}
