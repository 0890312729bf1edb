//! Gateway client for the RookieShop REST API
//!
//! Every request carries the identity's bearer token. A 401 triggers exactly
//! one silent renewal; when it yields a token the request is replayed once,
//! otherwise the user is sent to interactive sign-in. Any other non-2xx
//! response becomes [`Error::Problem`].

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use url::Url;

use crate::auth::Identity;
use crate::error::{Error, ProblemDetails, Result};

type FormFactory<'a> = Box<dyn Fn() -> Form + Send + Sync + 'a>;

enum Body<'a> {
    Json(Vec<u8>),
    // Rebuilt for the replay; a sent form cannot be reused.
    Multipart(FormFactory<'a>),
}

/// HTTP client for the RookieShop API
pub struct ApiClient {
    base_url: Url,
    http_client: Client,
    identity: Arc<dyn Identity>,
}

impl ApiClient {
    /// Create a new ApiClient
    pub fn new(base_url: &str, http_client: Client, identity: Arc<dyn Identity>) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!("{} cannot be a base URL", base_url)));
        }

        Ok(Self {
            base_url,
            http_client,
            identity,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn identity(&self) -> &Arc<dyn Identity> {
        &self.identity
    }

    /// Resolve `path` against the base URL, keeping any base path prefix.
    pub fn url(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path))?)
    }

    /// Resolve `path` and append each segment percent-encoded, so keys
    /// containing `/`, `?` or `#` stay a single path segment.
    pub fn url_with_segments<S: AsRef<str>>(&self, path: &str, segments: &[S]) -> Result<Url> {
        let mut url = self.url(path)?;
        url.path_segments_mut()
            .map_err(|_| Error::config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments.iter().map(AsRef::as_ref));
        Ok(url)
    }

    /// Start building a request
    pub fn request(&self, method: Method, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(self, method, path)
    }

    /// GET `path` and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.request(Method::GET, path)
            .query(query)
            .execute::<T>()
            .await
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::POST, path)
            .json(body)?
            .execute::<T>()
            .await
    }

    /// POST a JSON body, ignoring the response body
    pub async fn post_empty<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.request(Method::POST, path)
            .json(body)?
            .execute_empty()
            .await
    }

    /// PUT a JSON body, ignoring the response body
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.request(Method::PUT, path)
            .json(body)?
            .execute_empty()
            .await
    }

    /// DELETE `path`
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path).execute_empty().await
    }

    /// POST a multipart form built by `form`, ignoring the response body
    pub async fn post_multipart<F>(&self, path: &str, form: F) -> Result<()>
    where
        F: Fn() -> Form + Send + Sync,
    {
        self.request(Method::POST, path)
            .multipart(form)
            .execute_empty()
            .await
    }
}

/// Helper for building and executing requests against the API
pub struct FetchBuilder<'a> {
    client: &'a ApiClient,
    method: Method,
    path: String,
    segments: Vec<String>,
    query_params: Vec<(String, String)>,
    body: Option<Body<'a>>,
}

impl<'a> FetchBuilder<'a> {
    fn new(client: &'a ApiClient, method: Method, path: &str) -> Self {
        Self {
            client,
            method,
            path: path.to_string(),
            segments: Vec::new(),
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Append an encoded path segment, e.g. a SKU or an id
    pub fn segment(mut self, segment: impl ToString) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Add query parameters to the request
    pub fn query(mut self, params: &[(&str, String)]) -> Self {
        self.query_params.extend(
            params
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone())),
        );
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(Body::Json(json));
        Ok(self)
    }

    /// Add a multipart body, rebuilt by `form` for every attempt
    pub fn multipart<F>(mut self, form: F) -> Self
    where
        F: Fn() -> Form + Send + Sync + 'a,
    {
        self.body = Some(Body::Multipart(Box::new(form)));
        self
    }

    fn build(&self, token: Option<&str>) -> Result<RequestBuilder> {
        let mut url = self.client.url_with_segments(&self.path, &self.segments)?;

        if !self.query_params.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                query_pairs.append_pair(key, value);
            }
        }

        log::debug!("{} {}", self.method, url);

        let mut req = self.client.http_client.request(self.method.clone(), url);

        if let Some(token) = token {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        req = match &self.body {
            Some(Body::Json(json)) => req
                .header(CONTENT_TYPE, "application/json")
                .body(json.clone()),
            Some(Body::Multipart(form)) => req.multipart(form()),
            None => req,
        };

        Ok(req)
    }

    /// Send the request, renewing the session once on 401.
    async fn send(&self) -> Result<Response> {
        let identity = &self.client.identity;

        let token = identity.access_token().await;
        let response = self.build(token.as_deref())?.send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        log::warn!("{} {} returned 401, renewing session", self.method, self.path);

        match identity.sign_in_silent().await {
            Ok(Some(token)) => Ok(self.build(Some(&token))?.send().await?),
            Ok(None) => {
                identity.sign_in_redirect().await?;
                Err(Error::SignInRequired)
            }
            Err(err) => {
                log::warn!("Session renewal failed: {}", err);
                identity.sign_in_redirect().await?;
                Err(Error::SignInRequired)
            }
        }
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T> {
        let response = check(self.send().await?).await?;
        let result = response.json::<T>().await?;
        Ok(result)
    }

    /// Execute the request and discard the response body
    pub async fn execute_empty(&self) -> Result<()> {
        check(self.send().await?).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into the server's problem details.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await?;
    let problem = serde_json::from_str::<ProblemDetails>(&text)
        .unwrap_or_else(|_| ProblemDetails::from_status(status, &text));

    Err(Error::Problem(problem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticIdentity;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Client::new(), Arc::new(StaticIdentity::anonymous())).unwrap()
    }

    #[test]
    fn url_keeps_base_path() {
        let api = client("http://localhost:5027/gateway/");
        let url = api.url("/product-catalog/api/products/all").unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:5027/gateway/product-catalog/api/products/all"
        );
    }

    #[test]
    fn segments_are_percent_encoded() {
        let api = client("http://localhost:5027");
        let url = api
            .url_with_segments("/product-catalog/api/products", &["SKU#2", "a/b?c"])
            .unwrap();

        assert_eq!(
            url.path(),
            "/product-catalog/api/products/SKU%232/a%2Fb%3Fc"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn rejects_non_base_url() {
        let result = ApiClient::new(
            "mailto:admin@rookie.shop",
            Client::new(),
            Arc::new(StaticIdentity::anonymous()),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
