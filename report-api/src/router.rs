use crate::config::{LISTING_PATH, ResolvedEndpoint};
use crate::errors::ReportApiError;
use crate::metrics_defs::{REPORTS_BUILT, REPORTS_FAILED};
use http::{Method, Request, Response, StatusCode};
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use reports::errors::ReportError;
use reports::row_source::RowSource;
use reports::types::OrderedGroups;
use serde::Serialize;
use shared::counter;
use shared::http::{full_body, insert_cors_headers, json_response, make_boxed_error_response};
use std::collections::HashMap;
use std::sync::Arc;

pub type RouterResponse = Response<BoxBody<Bytes, ReportApiError>>;

/// Body of every report response.
#[derive(Serialize)]
struct Envelope<'a> {
    data: Option<&'a OrderedGroups>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ListingEntry<'a> {
    name: &'a str,
    path: &'a str,
}

/// Maps request paths to reports. Built once at startup and shared by all
/// connections.
#[derive(Clone)]
pub struct ReportRouter {
    endpoints: Arc<HashMap<String, Arc<ResolvedEndpoint>>>,
    listing: Bytes,
    source: Arc<dyn RowSource>,
}

impl ReportRouter {
    pub fn new(
        endpoints: Vec<ResolvedEndpoint>,
        source: Arc<dyn RowSource>,
    ) -> Result<Self, ReportApiError> {
        let listing = endpoints
            .iter()
            .map(|endpoint| ListingEntry {
                name: &endpoint.name,
                path: &endpoint.path,
            })
            .collect::<Vec<_>>();
        let listing = Bytes::from(serde_json::to_vec(&serde_json::json!({ "data": listing }))?);

        let endpoints = endpoints
            .into_iter()
            .map(|endpoint| (endpoint.path.clone(), Arc::new(endpoint)))
            .collect();

        Ok(Self {
            endpoints: Arc::new(endpoints),
            listing,
            source,
        })
    }

    /// Name of the report served at `path`, if any.
    pub fn report_name(&self, path: &str) -> Option<&str> {
        self.endpoints.get(path).map(|endpoint| endpoint.name.as_str())
    }

    pub async fn route<B>(&self, req: Request<B>) -> Result<RouterResponse, ReportApiError> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        drop(req);

        let mut response = if method == Method::OPTIONS {
            let mut response = Response::new(full_body(Bytes::new()));
            *response.status_mut() = StatusCode::NO_CONTENT;
            response
        } else if let Some(endpoint) = self.endpoints.get(&path) {
            match method {
                Method::GET => self.build(endpoint).await?,
                _ => make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED),
            }
        } else if path == LISTING_PATH {
            match method {
                Method::GET => json_response(StatusCode::OK, self.listing.clone()),
                _ => make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED),
            }
        } else {
            tracing::debug!(method = %method, path = %path, "No report matched");
            make_boxed_error_response(StatusCode::NOT_FOUND)
        };

        insert_cors_headers(response.headers_mut());
        Ok(response)
    }

    async fn build(&self, endpoint: &ResolvedEndpoint) -> Result<RouterResponse, ReportApiError> {
        let report = endpoint.name.clone();
        let result =
            reports::render(self.source.as_ref(), &endpoint.dataset, &endpoint.definition).await;
        let body = encode_envelope(&result)?;

        match result {
            Ok(_) => {
                counter!(REPORTS_BUILT, "report" => report).increment(1);
                Ok(json_response(StatusCode::OK, body.into()))
            }
            Err(e) => {
                tracing::error!(report = %report, dataset = %endpoint.dataset, error = %e, "Failed to build report");
                counter!(REPORTS_FAILED, "report" => report, "kind" => e.kind()).increment(1);
                Ok(json_response(StatusCode::INTERNAL_SERVER_ERROR, body.into()))
            }
        }
    }
}

/// Serializes a report outcome as `{"data": ...}` or `{"data": null, "error": ...}`.
pub fn encode_envelope(
    result: &Result<OrderedGroups, ReportError>,
) -> Result<Vec<u8>, serde_json::Error> {
    let envelope = match result {
        Ok(groups) => Envelope {
            data: Some(groups),
            error: None,
        },
        Err(e) => Envelope {
            data: None,
            error: Some(e.to_string()),
        },
    };
    serde_json::to_vec(&envelope)
}
