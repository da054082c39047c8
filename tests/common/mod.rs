#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use fake::Fake;
use fake::faker::company::en::{CompanyName, Industry};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use futures::future::BoxFuture;
use reqwest::Method;
use serde_json::{Map, Value, json};
use tokio::sync::Semaphore;

use hrpanel::api::{ApiClient, ApiRequest, RequestBody, Transport};
use hrpanel::config::Config;
use hrpanel::error::{ClientError, ClientResult};

pub const FAKE_BASE_URL: &str = "http://hrpanel.test";

pub fn test_config() -> Config {
    Config::for_base_url(FAKE_BASE_URL)
}

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Where one collection lives on the fake server.
#[derive(Debug, Clone)]
pub struct CollectionRoutes {
    pub list: String,
    pub create: String,
    pub update_prefix: String,
    pub delete_prefix: String,
    pub items_key: String,
    /// Server-side `page`/`limit` handling with a `pagination` block.
    pub paginated: bool,
    /// Field whose duplicate value answers 409.
    pub unique_field: Option<String>,
    /// Whether PUT answers with the stored record in `data`.
    pub echo_record: bool,
}

impl CollectionRoutes {
    pub fn rest(base: &str, items_key: &str) -> Self {
        Self {
            list: base.to_string(),
            create: base.to_string(),
            update_prefix: base.to_string(),
            delete_prefix: base.to_string(),
            items_key: items_key.to_string(),
            paginated: true,
            unique_field: None,
            echo_record: true,
        }
    }

    pub fn companies() -> Self {
        Self {
            list: "/admin/get-companies".to_string(),
            create: "/admin/add-company".to_string(),
            update_prefix: "/admin/update-company".to_string(),
            delete_prefix: "/admin/delete-company".to_string(),
            items_key: "company".to_string(),
            paginated: false,
            unique_field: Some("companyName".to_string()),
            echo_record: true,
        }
    }

    pub fn employees(company: &str, dept: &str) -> Self {
        Self {
            unique_field: Some("employeeId".to_string()),
            ..Self::rest(
                &format!("/admin/companies/{}/departments/{}/employees", company, dept),
                "employees",
            )
        }
    }

    pub fn departments(company: &str) -> Self {
        let base = format!("/admin/companies/{}/departments", company);
        Self {
            create: "/admin/create-dept".to_string(),
            paginated: false,
            unique_field: Some("department".to_string()),
            ..Self::rest(&base, "departments")
        }
    }

    pub fn salary_slips(company: &str, dept: &str, employee: &str) -> Self {
        let base = format!(
            "/admin/companies/{}/departments/{}/employees/{}",
            company, dept, employee
        );
        Self {
            update_prefix: format!("{}/salaries", base),
            delete_prefix: format!("{}/salaries", base),
            ..Self::rest(&base, "data")
        }
    }

    pub fn careers() -> Self {
        Self {
            list: "/getCareers".to_string(),
            create: "/newCareer".to_string(),
            update_prefix: "/edit-career".to_string(),
            delete_prefix: "/deleteCareer".to_string(),
            items_key: "data".to_string(),
            paginated: false,
            unique_field: None,
            echo_record: true,
        }
    }

    pub fn without_echo(mut self) -> Self {
        self.echo_record = false;
        self
    }

    pub fn unpaginated(mut self) -> Self {
        self.paginated = false;
        self
    }
}

struct Collection {
    routes: CollectionRoutes,
    items: Vec<Value>,
    context: Map<String, Value>,
    next_id: usize,
}

struct ScriptedFailure {
    method: Method,
    fragment: String,
    outcome: Option<(u16, Value)>,
}

struct Gate {
    method: Method,
    fragment: String,
    semaphore: Arc<Semaphore>,
    arrived: Arc<AtomicUsize>,
    /// Answer computed on arrival rather than on release.
    snapshot: bool,
    /// Stops matching after this many requests.
    remaining: Option<usize>,
}

/// Holds matching requests until released.
#[derive(Clone)]
pub struct GateHandle {
    semaphore: Arc<Semaphore>,
    arrived: Arc<AtomicUsize>,
}

impl GateHandle {
    pub fn release(&self, n: usize) {
        self.semaphore.add_permits(n);
    }

    pub fn arrived(&self) -> usize {
        self.arrived.load(Ordering::SeqCst)
    }

    /// Waits until `n` requests are parked at the gate.
    pub async fn wait_arrived(&self, n: usize) {
        for _ in 0..500 {
            if self.arrived() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("only {} of {} requests reached the gate", self.arrived(), n);
    }
}

#[derive(Default)]
struct Inner {
    collections: Vec<Collection>,
    fixed: Vec<(Method, String, Value)>,
    failures: Vec<ScriptedFailure>,
    log: Vec<ApiRequest>,
    offline: bool,
}

/// In-memory stand-in for the admin backend.
#[derive(Default)]
pub struct FakeBackend {
    inner: Mutex<Inner>,
    gates: Mutex<Vec<Gate>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn client(self: &Arc<Self>) -> ApiClient {
        ApiClient::new(self.clone(), &test_config())
    }

    pub fn collection(&self, routes: CollectionRoutes, items: Vec<Value>) {
        let next_id = items.len() + 1;
        self.inner().collections.push(Collection {
            routes,
            items,
            context: Map::new(),
            next_id,
        });
    }

    /// Extra top-level fields sent with every list response of the collection at `list`.
    pub fn list_context(&self, list: &str, key: &str, value: Value) {
        let mut inner = self.inner();
        if let Some(collection) = inner.collections.iter_mut().find(|c| c.routes.list == list) {
            collection.context.insert(key.to_string(), value);
        }
    }

    /// Canned 200 body for `method path`.
    pub fn respond(&self, method: Method, path: &str, body: Value) {
        self.inner().fixed.push((method, path.to_string(), body));
    }

    pub fn fail_next(&self, method: Method, fragment: &str, status: u16, body: Value) {
        self.inner().failures.push(ScriptedFailure {
            method,
            fragment: fragment.to_string(),
            outcome: Some((status, body)),
        });
    }

    pub fn drop_next(&self, method: Method, fragment: &str) {
        self.inner().failures.push(ScriptedFailure {
            method,
            fragment: fragment.to_string(),
            outcome: None,
        });
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner().offline = offline;
    }

    pub fn hold(&self, method: Method, fragment: &str) -> GateHandle {
        self.add_gate(method, fragment, false, None)
    }

    /// Holds only the next matching request, with the response it would have got on arrival.
    /// Models a reply that left the server before later writes landed.
    pub fn hold_snapshot(&self, method: Method, fragment: &str) -> GateHandle {
        self.add_gate(method, fragment, true, Some(1))
    }

    fn add_gate(
        &self,
        method: Method,
        fragment: &str,
        snapshot: bool,
        remaining: Option<usize>,
    ) -> GateHandle {
        let gate = Gate {
            method,
            fragment: fragment.to_string(),
            semaphore: Arc::new(Semaphore::new(0)),
            arrived: Arc::new(AtomicUsize::new(0)),
            snapshot,
            remaining,
        };
        let handle = GateHandle {
            semaphore: gate.semaphore.clone(),
            arrived: gate.arrived.clone(),
        };
        self.gates.lock().unwrap().push(gate);
        handle
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner().log.clone()
    }

    /// `METHOD path?query` for every request seen, in order.
    pub fn targets(&self) -> Vec<String> {
        self.inner()
            .log
            .iter()
            .map(|r| format!("{} {}", r.method, r.target()))
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.inner().log.len()
    }

    pub fn count(&self, method: Method) -> usize {
        self.inner().log.iter().filter(|r| r.method == method).count()
    }

    pub fn items(&self, list: &str) -> Vec<Value> {
        self.inner()
            .collections
            .iter()
            .find(|c| c.routes.list == list)
            .map(|c| c.items.clone())
            .unwrap_or_default()
    }

    async fn handle(&self, request: ApiRequest) -> ClientResult<Value> {
        let target = request.target();
        let offline = {
            let mut inner = self.inner();
            inner.log.push(request.clone());
            inner.offline
        };
        if offline {
            return Err(ClientError::Network("connection refused".to_string()));
        }

        let gate = {
            let mut gates = self.gates.lock().unwrap();
            let pos = gates
                .iter()
                .position(|g| g.method == request.method && target.contains(&g.fragment));
            pos.map(|pos| {
                let gate = &mut gates[pos];
                let parked = (gate.semaphore.clone(), gate.arrived.clone(), gate.snapshot);
                let exhausted = match gate.remaining.as_mut() {
                    Some(remaining) => {
                        *remaining = remaining.saturating_sub(1);
                        *remaining == 0
                    }
                    None => false,
                };
                if exhausted {
                    gates.remove(pos);
                }
                parked
            })
        };

        let Some((semaphore, arrived, snapshot)) = gate else {
            return self.answer(&request, &target);
        };

        let early = snapshot.then(|| self.answer(&request, &target));
        arrived.fetch_add(1, Ordering::SeqCst);
        if let Ok(permit) = semaphore.acquire().await {
            permit.forget();
        }
        match early {
            Some(response) => response,
            None => self.answer(&request, &target),
        }
    }

    fn answer(&self, request: &ApiRequest, target: &str) -> ClientResult<Value> {
        let mut inner = self.inner();

        if let Some(pos) = inner
            .failures
            .iter()
            .position(|f| f.method == request.method && target.contains(&f.fragment))
        {
            let failure = inner.failures.remove(pos);
            return match failure.outcome {
                Some((status, body)) => Err(ClientError::from_status(status, &body)),
                None => Err(ClientError::Network("connection reset".to_string())),
            };
        }

        if let Some((_, _, body)) = inner
            .fixed
            .iter()
            .find(|(method, path, _)| *method == request.method && *path == request.path)
        {
            return Ok(body.clone());
        }

        for collection in inner.collections.iter_mut() {
            if let Some(result) = collection.handle(request) {
                return result;
            }
        }

        Err(ClientError::from_status(404, &json!({ "message": "Not found" })))
    }
}

impl Collection {
    fn handle(&mut self, request: &ApiRequest) -> Option<ClientResult<Value>> {
        let routes = &self.routes;
        let path = request.path.as_str();

        if request.method == Method::GET && path == routes.list {
            return Some(Ok(self.list(request)));
        }
        if request.method == Method::POST && path == routes.create {
            return Some(self.create(request));
        }
        if request.method == Method::PUT {
            if let Some(id) = member_id(path, &routes.update_prefix) {
                return Some(self.update(&id, request));
            }
        }
        if request.method == Method::DELETE {
            if let Some(id) = member_id(path, &routes.delete_prefix) {
                return Some(self.delete(&id));
            }
        }
        None
    }

    fn list(&self, request: &ApiRequest) -> Value {
        let mut body = self.context.clone();
        body.insert("success".to_string(), json!(true));

        if self.routes.paginated {
            let page: usize = request
                .query_value("page")
                .and_then(|p| p.parse().ok())
                .unwrap_or(1)
                .max(1);
            let limit: usize = request
                .query_value("limit")
                .and_then(|l| l.parse().ok())
                .unwrap_or(15)
                .max(1);
            let total = self.items.len();
            let items: Vec<Value> = self
                .items
                .iter()
                .skip((page - 1) * limit)
                .take(limit)
                .cloned()
                .collect();
            body.insert(self.routes.items_key.clone(), Value::Array(items));
            body.insert(
                "pagination".to_string(),
                json!({ "total": total, "page": page, "limit": limit, "pages": total.div_ceil(limit) }),
            );
        } else {
            body.insert(
                self.routes.items_key.clone(),
                Value::Array(self.items.clone()),
            );
        }

        Value::Object(body)
    }

    fn create(&mut self, request: &ApiRequest) -> ClientResult<Value> {
        let mut fields = body_fields(&request.body);

        if let Some(unique) = &self.routes.unique_field {
            let value = fields.get(unique).cloned();
            if value.is_some() && self.items.iter().any(|item| item.get(unique) == value.as_ref()) {
                return Err(ClientError::from_status(409, &json!({})));
            }
        }

        let id = format!("id-{}", self.next_id);
        self.next_id += 1;
        fields.insert("_id".to_string(), json!(id));
        let record = Value::Object(fields);
        self.items.insert(0, record.clone());

        Ok(json!({ "success": true, "message": "Created successfully", "data": record }))
    }

    fn update(&mut self, id: &str, request: &ApiRequest) -> ClientResult<Value> {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.get("_id").and_then(Value::as_str) == Some(id))
        else {
            return Err(ClientError::from_status(404, &json!({ "message": "Record not found" })));
        };

        if let Value::Object(stored) = item {
            for (key, value) in body_fields(&request.body) {
                stored.insert(key, value);
            }
        }

        if self.routes.echo_record {
            Ok(json!({ "success": true, "message": "Updated successfully", "data": item.clone() }))
        } else {
            Ok(json!({ "success": true, "message": "Updated successfully" }))
        }
    }

    fn delete(&mut self, id: &str) -> ClientResult<Value> {
        let before = self.items.len();
        self.items
            .retain(|item| item.get("_id").and_then(Value::as_str) != Some(id));
        if self.items.len() == before {
            return Err(ClientError::from_status(404, &json!({ "message": "Record not found" })));
        }
        Ok(json!({ "success": true, "message": "Deleted successfully" }))
    }
}

fn member_id(path: &str, prefix: &str) -> Option<String> {
    path.strip_prefix(prefix)?
        .strip_prefix('/')
        .filter(|id| !id.is_empty() && !id.contains('/'))
        .map(str::to_string)
}

fn body_fields(body: &Option<RequestBody>) -> Map<String, Value> {
    match body {
        Some(RequestBody::Json(Value::Object(map))) => map.clone(),
        Some(RequestBody::Multipart(form)) => form
            .fields
            .iter()
            .map(|(k, v)| {
                let value = serde_json::from_str::<Value>(v)
                    .ok()
                    .filter(Value::is_array)
                    .unwrap_or_else(|| Value::String(v.clone()));
                (k.clone(), value)
            })
            .collect(),
        _ => Map::new(),
    }
}

impl Transport for FakeBackend {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, ClientResult<Value>> {
        Box::pin(self.handle(request))
    }

    fn base_url(&self) -> &str {
        FAKE_BASE_URL
    }
}

pub fn company_json(i: usize) -> Value {
    json!({
        "_id": format!("company-{}", i),
        "companyName": format!("{} {}", CompanyName().fake::<String>(), i),
        "companyAddress": format!("{} Street {}", Industry().fake::<String>(), i),
        "companyEmail": SafeEmail().fake::<String>(),
    })
}

pub fn employee_json(i: usize) -> Value {
    json!({
        "_id": format!("emp-{}", i),
        "employeeName": Name().fake::<String>(),
        "employeeId": format!("E{:03}", i),
        "designation": "Associate",
        "email": SafeEmail().fake::<String>(),
        "mobileNumber": "9876543210",
    })
}

pub fn slip_json(i: usize, month: u32, year: u32) -> Value {
    json!({
        "_id": format!("slip-{}", i),
        "payMonth": month,
        "payYear": year,
        "basicSalary": 20000,
        "hra": "5000",
        "epf": 1800,
        "paidDays": 30,
        "totalWorkingDays": 30,
    })
}

pub fn employees(n: usize) -> Vec<Value> {
    (1..=n).map(employee_json).collect()
}

pub fn companies(n: usize) -> Vec<Value> {
    (1..=n).map(company_json).collect()
}

/// Employees of company `c1`, department `d1`.
pub fn employee_backend(n: usize) -> Arc<FakeBackend> {
    let backend = FakeBackend::new();
    backend.collection(CollectionRoutes::employees("c1", "d1"), employees(n));
    backend
}
