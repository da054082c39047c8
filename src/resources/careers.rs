use super::{Resource, multipart_fields};
use crate::api::{ApiRequest, path_of};
use crate::controller::query::PageQuery;
use crate::error::{ClientError, ClientResult};
use crate::models::{Applicant, CareerInput, CareerPosting};

#[derive(Debug, Clone, Default)]
pub struct CareerResource;

impl CareerResource {
    fn form(payload: &CareerInput) -> ClientResult<crate::api::MultipartForm> {
        let mut form = multipart_fields(payload)?;
        if let Some(image) = &payload.image {
            form = form.file(image.clone());
        }
        Ok(form)
    }
}

impl Resource for CareerResource {
    type Record = CareerPosting;
    type Payload = CareerInput;

    const NAME: &'static str = "career posting";
    const LABEL: &'static str = "Career postings";
    const CONFLICT_MESSAGE: &'static str = "Career posting already exists";

    fn items_key(&self) -> &'static str {
        "data"
    }

    fn list_request(&self, _query: &PageQuery) -> ApiRequest {
        ApiRequest::get("/getCareers")
    }

    fn create_request(&self, payload: &CareerInput) -> ClientResult<ApiRequest> {
        Ok(ApiRequest::post("/newCareer").multipart(Self::form(payload)?))
    }

    fn update_request(&self, id: &str, payload: &CareerInput) -> ClientResult<ApiRequest> {
        Ok(ApiRequest::put(path_of(&["edit-career", id])).multipart(Self::form(payload)?))
    }

    fn delete_request(&self, id: &str) -> ApiRequest {
        ApiRequest::delete(path_of(&["deleteCareer", id]))
    }
}

/// Applicants are read-only apart from deletion; they are created by the public careers site.
#[derive(Debug, Clone)]
pub struct ApplicantResource {
    pub designation: String,
}

impl ApplicantResource {
    pub fn new(designation: impl Into<String>) -> Self {
        Self {
            designation: designation.into(),
        }
    }
}

impl Resource for ApplicantResource {
    type Record = Applicant;
    type Payload = ();

    const NAME: &'static str = "applicant";
    const LABEL: &'static str = "Applicants";
    const CONFLICT_MESSAGE: &'static str = "Applicant already exists";

    fn items_key(&self) -> &'static str {
        "users"
    }

    fn list_request(&self, _query: &PageQuery) -> ApiRequest {
        ApiRequest::get("/getUserByDesignation").with_query("designation", &self.designation)
    }

    fn create_request(&self, _payload: &()) -> ClientResult<ApiRequest> {
        Err(ClientError::Unsupported(
            "applicants are submitted from the careers site".to_string(),
        ))
    }

    fn update_request(&self, _id: &str, _payload: &()) -> ClientResult<ApiRequest> {
        Err(ClientError::Unsupported(
            "applicant submissions cannot be edited".to_string(),
        ))
    }

    fn delete_request(&self, id: &str) -> ApiRequest {
        ApiRequest::delete(path_of(&["deleteSubmittedFormData", id]))
    }
}
