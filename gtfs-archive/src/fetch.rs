//! Conditional download of a remote archive
use crate::Error;
use log::debug;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Validators of the last successfully fetched version of a remote archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteMetadata {
    /// `Last-Modified` header, verbatim
    pub last_modified: Option<String>,
    /// `ETag` header, verbatim
    pub etag: Option<String>,
}

/// What the server answered to a conditional request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    /// Validators sent back by the server
    pub metadata: RemoteMetadata,
    /// Where the body was written, when there was one to write
    pub path: Option<PathBuf>,
}

/// Fetches an url, sending the validators of the previous fetch
pub trait RemoteFetcher {
    /// Only a transport failure is an error: any HTTP status is a valid response.
    /// A successful body must be written to `destination`.
    fn fetch(
        &self,
        url: &str,
        previous: &RemoteMetadata,
        destination: &Path,
    ) -> Result<FetchResponse, Error>;
}

/// [RemoteFetcher] over blocking http
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        HttpFetcher { client }
    }
}

fn header_value(response: &reqwest::blocking::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(
        &self,
        url: &str,
        previous: &RemoteMetadata,
        destination: &Path,
    ) -> Result<FetchResponse, Error> {
        let transport = |source| Error::Transport {
            url: url.to_owned(),
            source,
        };

        let mut request = self.client.get(url);
        if let Some(last_modified) = &previous.last_modified {
            request = request.header(IF_MODIFIED_SINCE, last_modified.as_str());
        }
        if let Some(etag) = &previous.etag {
            request = request.header(IF_NONE_MATCH, etag.as_str());
        }
        let mut response = request.send().map_err(transport)?;
        let status = response.status();
        debug!("{} answered {}", url, status);

        let metadata = RemoteMetadata {
            last_modified: header_value(&response, LAST_MODIFIED),
            etag: header_value(&response, ETAG),
        };
        let path = if status.is_success() {
            let mut file = File::create(destination)?;
            response.copy_to(&mut file).map_err(transport)?;
            Some(destination.to_owned())
        } else {
            None
        };

        Ok(FetchResponse {
            status: status.as_u16(),
            metadata,
            path,
        })
    }
}
