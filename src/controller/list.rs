use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::query::{NoMirror, PageQuery, QueryMirror};
use crate::api::{ApiClient, ApiResponse, PageData, accepted, pages_for, parse_page};
use crate::config::{Config, DEFAULT_PAGE_LIMIT};
use crate::error::{ClientError, ClientResult};
use crate::forms::FieldErrors;
use crate::models::Record;
use crate::resources::Resource;
use crate::view::{self, View};

/// How an update is reflected locally before the server has the last word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reconcile {
    /// Apply the record the server returns (if any), then reload the current page.
    #[default]
    Refetch,
    /// Patch the local row before sending; roll back on failure, no reload on success.
    Optimistic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load started before this one settled; its result was dropped.
    Superseded,
    /// The controller was unmounted; nothing was written.
    Detached,
    /// Nothing to do (already on the first or last page).
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome<T> {
    pub message: Option<String>,
    pub record: Option<T>,
}

impl<T: DeserializeOwned> MutationOutcome<T> {
    pub fn from_body(body: &Value) -> Self {
        let envelope = ApiResponse::from_body(body);
        Self {
            record: envelope.data.and_then(|d| serde_json::from_value(d).ok()),
            message: envelope.message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub loading: bool,
    pub error: Option<String>,
    pub deleting: BTreeSet<String>,
    /// Non-list fields of the last list response (company, department, employee headers).
    pub context: Map<String, Value>,
    pub loaded: bool,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            total: 0,
            total_pages: 0,
            loading: false,
            error: None,
            deleting: BTreeSet::new(),
            context: Map::new(),
            loaded: false,
        }
    }
}

impl<T> ListState<T> {
    pub fn is_deleting(&self, id: &str) -> bool {
        self.deleting.contains(id)
    }

    pub fn query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Paginated view over one resource collection.
///
/// Every load takes a ticket from a monotonic counter and only writes state if it is still
/// the newest ticket when the response arrives. Mutations always end in an authoritative
/// reload, except updates under [`Reconcile::Optimistic`]. After [`ListController::unmount`]
/// settling requests no longer touch state.
pub struct ListController<R: Resource> {
    resource: R,
    api: ApiClient,
    state: Mutex<ListState<R::Record>>,
    load_seq: AtomicU64,
    mounted: AtomicBool,
    mirror: Box<dyn QueryMirror>,
    reconcile: Reconcile,
    max_limit: u32,
}

impl<R: Resource> ListController<R> {
    pub fn new(resource: R, api: ApiClient, config: &Config) -> Self {
        let query = PageQuery::bounded(1, config.page_limit, config.max_page_limit);
        Self::with_query(resource, api, config, query)
    }

    /// Takes the initial page and limit from a bookmarked location. Read once, here.
    pub fn from_location(resource: R, api: ApiClient, config: &Config, location: &str) -> Self {
        let query = PageQuery::parse(location, config.page_limit, config.max_page_limit);
        Self::with_query(resource, api, config, query)
    }

    fn with_query(resource: R, api: ApiClient, config: &Config, query: PageQuery) -> Self {
        let state = ListState {
            page: query.page,
            limit: query.limit,
            ..ListState::default()
        };

        Self {
            resource,
            api,
            state: Mutex::new(state),
            load_seq: AtomicU64::new(0),
            mounted: AtomicBool::new(true),
            mirror: Box::new(NoMirror),
            reconcile: Reconcile::default(),
            max_limit: config.max_page_limit,
        }
    }

    pub fn with_mirror(mut self, mirror: impl QueryMirror + 'static) -> Self {
        self.mirror = Box::new(mirror);
        self
    }

    pub fn with_reconcile(mut self, reconcile: Reconcile) -> Self {
        self.reconcile = reconcile;
        self
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn lock(&self) -> MutexGuard<'_, ListState<R::Record>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> ListState<R::Record> {
        self.lock().clone()
    }

    pub fn view(&self, empty_message: &str) -> View {
        let state = self.lock();
        view::render(&*state, empty_message)
    }

    pub fn query(&self) -> PageQuery {
        self.lock().query()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Detaches the controller from its host. In-flight requests still settle but are ignored.
    pub fn unmount(&self) {
        log::debug!("Unmounting {} list", R::NAME);
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub async fn load(&self, page: u32, limit: u32) -> ClientResult<LoadOutcome> {
        if !self.is_mounted() {
            return Ok(LoadOutcome::Detached);
        }

        let query = PageQuery::bounded(page, limit, self.max_limit);
        let ticket = {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
            self.load_seq.fetch_add(1, Ordering::SeqCst) + 1
        };

        log::debug!(
            "Loading {} page {} (limit {}), ticket {}",
            R::NAME,
            query.page,
            query.limit,
            ticket
        );

        let result = match self.api.send(self.resource.list_request(&query)).await {
            Ok(body) => parse_page::<R::Record>(body, self.resource.items_key(), &query),
            Err(e) if e.is_not_found() && self.resource.empty_on_not_found() => {
                Ok(PageData::empty(&query))
            }
            Err(e) => Err(e),
        };

        if !self.is_mounted() {
            return Ok(LoadOutcome::Detached);
        }

        // Tickets are taken under the same lock, so no newer load can start past this check
        let mut state = self.lock();
        if self.load_seq.load(Ordering::SeqCst) != ticket {
            log::debug!("Dropping superseded {} load, ticket {}", R::NAME, ticket);
            return Ok(LoadOutcome::Superseded);
        }
        state.loading = false;

        match result {
            Ok(page) => {
                state.items = page.items;
                state.page = page.page;
                state.limit = page.limit;
                state.total = page.total;
                state.total_pages = page.total_pages;
                state.context = page.context;
                state.loaded = true;
                drop(state);

                self.mirror.replace(&query);
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                log::warn!("Failed to load {} page {}: {}", R::NAME, query.page, e);
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub async fn reload(&self) -> ClientResult<LoadOutcome> {
        let query = self.query();
        self.load(query.page, query.limit).await
    }

    pub async fn set_page(&self, page: u32) -> ClientResult<LoadOutcome> {
        let limit = self.lock().limit;
        self.load(page, limit).await
    }

    pub async fn next_page(&self) -> ClientResult<LoadOutcome> {
        let (page, total_pages) = {
            let state = self.lock();
            (state.page, state.total_pages)
        };
        if page >= total_pages {
            return Ok(LoadOutcome::Unchanged);
        }
        self.set_page(page + 1).await
    }

    pub async fn prev_page(&self) -> ClientResult<LoadOutcome> {
        let page = self.lock().page;
        if page <= 1 {
            return Ok(LoadOutcome::Unchanged);
        }
        self.set_page(page - 1).await
    }

    /// Changing the page size restarts at page 1.
    pub async fn set_limit(&self, limit: u32) -> ClientResult<LoadOutcome> {
        self.load(1, limit).await
    }

    pub async fn create(&self, payload: R::Payload) -> ClientResult<MutationOutcome<R::Record>> {
        let request = self.resource.create_request(&payload)?;
        let body = self
            .api
            .send(request)
            .await
            .and_then(|body| accepted(body, &format!("Failed to create {}", R::NAME)))
            .map_err(Self::conflict_message)?;

        log::info!("Created {}", R::NAME);
        let outcome: MutationOutcome<R::Record> = MutationOutcome::from_body(&body);

        if self.is_mounted() {
            let limit = self.lock().limit;
            self.refresh(1, limit).await;
        }

        Ok(outcome)
    }

    pub async fn update(
        &self,
        id: &str,
        payload: R::Payload,
    ) -> ClientResult<MutationOutcome<R::Record>> {
        let request = self.resource.update_request(id, &payload)?;

        match self.reconcile {
            Reconcile::Refetch => {
                let body = self
                    .api
                    .send(request)
                    .await
                    .and_then(|body| accepted(body, &format!("Failed to update {}", R::NAME)))
                    .map_err(Self::conflict_message)?;
                log::info!("Updated {} {}", R::NAME, id);
                let outcome: MutationOutcome<R::Record> = MutationOutcome::from_body(&body);

                if self.is_mounted() {
                    let (page, limit) = {
                        let mut state = self.lock();
                        if let Some(record) = &outcome.record {
                            replace_item(&mut state.items, id, record.clone());
                        }
                        (state.page, state.limit)
                    };
                    self.refresh(page, limit).await;
                }

                Ok(outcome)
            }
            Reconcile::Optimistic => {
                let original = {
                    let mut state = self.lock();
                    state.items.iter().position(|i| i.id() == id).map(|pos| {
                        let original = state.items[pos].clone();
                        state.items[pos] = R::patch(&original, &payload);
                        original
                    })
                };

                let result = self
                    .api
                    .send(request)
                    .await
                    .and_then(|body| accepted(body, &format!("Failed to update {}", R::NAME)));
                match result {
                    Ok(body) => {
                        log::info!("Updated {} {}", R::NAME, id);
                        let outcome: MutationOutcome<R::Record> = MutationOutcome::from_body(&body);
                        if self.is_mounted() {
                            if let Some(record) = &outcome.record {
                                replace_item(&mut self.lock().items, id, record.clone());
                            }
                        }
                        Ok(outcome)
                    }
                    Err(e) => {
                        log::warn!("Update of {} {} failed, rolling back: {}", R::NAME, id, e);
                        if let (true, Some(original)) = (self.is_mounted(), original) {
                            replace_item(&mut self.lock().items, id, original);
                        }
                        Err(Self::conflict_message(e))
                    }
                }
            }
        }
    }

    /// Deletes one record. Deletes of different ids may run concurrently; a second delete of
    /// an id already in flight is rejected.
    pub async fn delete(&self, id: &str) -> ClientResult<MutationOutcome<R::Record>> {
        {
            let mut state = self.lock();
            if !state.deleting.insert(id.to_string()) {
                return Err(ClientError::Validation(FieldErrors::single(
                    "id",
                    format!("{} {} is already being deleted", R::NAME, id),
                )));
            }
        }

        let result = self
            .api
            .send(self.resource.delete_request(id))
            .await
            .and_then(|body| accepted(body, &format!("Failed to delete {}", R::NAME)));

        let next = {
            let mut state = self.lock();
            state.deleting.remove(id);

            match &result {
                Ok(_) if self.is_mounted() => {
                    let before = state.items.len();
                    state.items.retain(|item| item.id() != id);
                    if state.items.len() < before {
                        state.total = state.total.saturating_sub(1);
                        state.total_pages = pages_for(state.total, state.limit);
                    }
                    if state.items.is_empty() && state.page > 1 {
                        state.page -= 1;
                    }
                    Some((state.page, state.limit))
                }
                _ => None,
            }
        };

        let body = result.inspect_err(|e| {
            log::warn!("Failed to delete {} {}: {}", R::NAME, id, e);
        })?;
        log::info!("Deleted {} {}", R::NAME, id);

        if let Some((page, limit)) = next {
            self.refresh(page, limit).await;
        }

        Ok(MutationOutcome::from_body(&body))
    }

    /// Reload after a mutation. The mutation already succeeded, so a failed reload only
    /// shows up in `error`.
    async fn refresh(&self, page: u32, limit: u32) {
        if let Err(e) = self.load(page, limit).await {
            log::warn!("Reload after {} change failed: {}", R::NAME, e);
        }
    }

    fn conflict_message(error: ClientError) -> ClientError {
        match error {
            ClientError::Conflict {
                from_server: false, ..
            } => ClientError::Conflict {
                message: R::CONFLICT_MESSAGE.to_string(),
                from_server: false,
            },
            other => other,
        }
    }
}

fn replace_item<T: Record>(items: &mut [T], id: &str, record: T) {
    if let Some(slot) = items.iter_mut().find(|item| item.id() == id) {
        *slot = record;
    }
}
