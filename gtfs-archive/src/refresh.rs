//! Keeps a local copy of a remote archive, fetching it again only when the server has a newer one
use crate::fetch::{RemoteFetcher, RemoteMetadata};
use crate::{Archive, ArchiveReader, Error};
use log::{info, warn};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static DOWNLOADS: AtomicUsize = AtomicUsize::new(0);

/// Where an [ArchiveRefresher] stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// Nothing was fetched yet
    NoLocalCopy,
    /// A request is in flight
    CheckingRemote,
    /// The server has nothing newer than the local copy
    Unchanged,
    /// A new version was downloaded and extracted
    Refreshed,
    /// The last attempt failed, the previous local copy (if any) is still the current one
    Failed,
}

#[derive(Debug)]
pub enum RefreshOutcome {
    /// Keep using the current archive
    Unchanged,
    /// The freshly downloaded archive
    Refreshed(Archive),
}

/// The downloaded zip, removed when dropped whatever happened to it
struct DownloadedFile {
    path: PathBuf,
}

impl Drop for DownloadedFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("impossible to remove {}: {}", self.path.display(), e),
        }
    }
}

/// Refreshes the local copy of the archive found at an url.
///
/// The validators of the last successful fetch are kept, so every [ArchiveRefresher::refresh] is
/// a conditional request.
pub struct ArchiveRefresher<F> {
    url: String,
    fetcher: F,
    reader: ArchiveReader,
    metadata: RemoteMetadata,
    state: RefreshState,
}

impl<F: RemoteFetcher> ArchiveRefresher<F> {
    pub fn new(url: &str, fetcher: F, reader: ArchiveReader) -> Self {
        ArchiveRefresher {
            url: url.to_owned(),
            fetcher,
            reader,
            metadata: RemoteMetadata::default(),
            state: RefreshState::NoLocalCopy,
        }
    }

    /// Starts from the validators of a copy fetched earlier
    pub fn with_metadata(mut self, metadata: RemoteMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn metadata(&self) -> &RemoteMetadata {
        &self.metadata
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn download_path(&self) -> PathBuf {
        let digest = Sha256::digest(self.url.as_bytes());
        let name = format!("{:x}", digest);
        // unique per refresh, refreshers of the same url can share the directory
        self.reader.download_dir.join(format!(
            "{}-{}-{}.zip",
            &name[..16],
            std::process::id(),
            DOWNLOADS.fetch_add(1, Ordering::Relaxed)
        ))
    }

    /// Asks the server for a newer version of the archive.
    ///
    /// `304 Not Modified`, or a success response carrying the etag already known, means the local
    /// copy is current and nothing is extracted. Any other non success status is an
    /// [Error::RemoteFetch]. The downloaded zip never outlives this call.
    pub fn refresh(&mut self) -> Result<RefreshOutcome, Error> {
        self.state = RefreshState::CheckingRemote;
        let res = self.check_remote();
        self.state = match &res {
            Ok(RefreshOutcome::Unchanged) => RefreshState::Unchanged,
            Ok(RefreshOutcome::Refreshed(_)) => RefreshState::Refreshed,
            Err(_) => RefreshState::Failed,
        };
        res
    }

    fn check_remote(&mut self) -> Result<RefreshOutcome, Error> {
        fs::create_dir_all(&self.reader.download_dir)?;
        let download = DownloadedFile {
            path: self.download_path(),
        };
        let response = self
            .fetcher
            .fetch(&self.url, &self.metadata, &download.path)?;

        match response.status {
            304 => {
                info!("{} not modified", self.url);
                Ok(RefreshOutcome::Unchanged)
            }
            200..=299 => {
                if response.metadata.etag.is_some() && response.metadata.etag == self.metadata.etag
                {
                    info!("{} has the same etag, not extracting it again", self.url);
                    return Ok(RefreshOutcome::Unchanged);
                }
                let zip_path = response.path.as_deref().unwrap_or(&download.path);
                let archive = self.extract(zip_path, &response.metadata)?;
                self.metadata = response.metadata;
                Ok(RefreshOutcome::Refreshed(archive))
            }
            status => Err(Error::RemoteFetch {
                url: self.url.clone(),
                status,
            }),
        }
    }

    fn extract(&self, zip_path: &Path, metadata: &RemoteMetadata) -> Result<Archive, Error> {
        let archive = self.reader.clone().read_from_zip(zip_path)?;
        info!(
            "{} refreshed, last modified {}",
            self.url,
            metadata.last_modified.as_deref().unwrap_or("unknown")
        );
        Ok(archive.with_remote_metadata(metadata.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchResponse;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Answers with a fixed status, copying a fixture zip as the body
    struct ScriptedFetcher {
        status: u16,
        metadata: RemoteMetadata,
        body: Option<&'static str>,
        requests: Rc<RefCell<Vec<(RemoteMetadata, PathBuf)>>>,
    }

    impl RemoteFetcher for ScriptedFetcher {
        fn fetch(
            &self,
            _url: &str,
            previous: &RemoteMetadata,
            destination: &Path,
        ) -> Result<FetchResponse, Error> {
            self.requests
                .borrow_mut()
                .push((previous.clone(), destination.to_owned()));
            let path = match self.body {
                Some(fixture) => {
                    fs::copy(fixture, destination)?;
                    Some(destination.to_owned())
                }
                None => None,
            };
            Ok(FetchResponse {
                status: self.status,
                metadata: self.metadata.clone(),
                path,
            })
        }
    }

    struct Setup {
        _dir: tempfile::TempDir,
        reader: ArchiveReader,
        requests: Rc<RefCell<Vec<(RemoteMetadata, PathBuf)>>>,
    }

    fn setup() -> Setup {
        let dir = tempfile::tempdir().unwrap();
        let reader = ArchiveReader::default()
            .download_dir(dir.path().join("downloads"))
            .extraction_root(dir.path().join("extracted"));
        Setup {
            _dir: dir,
            reader,
            requests: Rc::default(),
        }
    }

    fn metadata(last_modified: &str, etag: &str) -> RemoteMetadata {
        RemoteMetadata {
            last_modified: Some(last_modified.to_owned()),
            etag: Some(etag.to_owned()),
        }
    }

    fn refresher(setup: &Setup, status: u16, body: Option<&'static str>) -> ArchiveRefresher<ScriptedFetcher> {
        let fetcher = ScriptedFetcher {
            status,
            metadata: metadata("Wed, 21 Oct 2026 07:28:00 GMT", "\"v2\""),
            body,
            requests: setup.requests.clone(),
        };
        ArchiveRefresher::new("https://example.org/gtfs.zip", fetcher, setup.reader.clone())
            .with_metadata(metadata("Tue, 20 Oct 2026 07:28:00 GMT", "\"v1\""))
    }

    fn nothing_extracted(setup: &Setup) -> bool {
        fs::read_dir(&setup.reader.extraction_root)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }

    #[test]
    fn not_modified() {
        let setup = setup();
        let mut refresher = refresher(&setup, 304, None);
        assert_eq!(RefreshState::NoLocalCopy, refresher.state());
        let outcome = refresher.refresh().unwrap();
        assert!(matches!(outcome, RefreshOutcome::Unchanged));
        assert_eq!(RefreshState::Unchanged, refresher.state());

        let requests = setup.requests.borrow();
        assert_eq!(1, requests.len());
        assert_eq!(
            Some("Tue, 20 Oct 2026 07:28:00 GMT"),
            requests[0].0.last_modified.as_deref()
        );
        assert!(!requests[0].1.exists());
        assert!(nothing_extracted(&setup));
        assert_eq!(Some("\"v1\""), refresher.metadata().etag.as_deref());
    }

    #[test]
    fn modified() {
        let setup = setup();
        let mut refresher = refresher(&setup, 200, Some("fixtures/zips/gtfs.zip"));
        let archive = match refresher.refresh().unwrap() {
            RefreshOutcome::Refreshed(archive) => archive,
            RefreshOutcome::Unchanged => panic!("the archive should have been refreshed"),
        };
        assert_eq!(RefreshState::Refreshed, refresher.state());
        assert_eq!(
            Some("Wed, 21 Oct 2026 07:28:00 GMT"),
            refresher.metadata().last_modified.as_deref()
        );
        assert_eq!(
            Some(refresher.metadata()),
            archive.remote_metadata()
        );
        assert!(archive.stop("B").unwrap().is_some());
        assert!(archive.sha256().is_some());

        let downloaded = setup.requests.borrow()[0].1.clone();
        assert!(!downloaded.exists());
        archive.delete_uncompressed_files().unwrap();
        assert!(nothing_extracted(&setup));
    }

    #[test]
    fn same_etag() {
        let setup = setup();
        let mut refresher = refresher(&setup, 200, Some("fixtures/zips/gtfs.zip"))
            .with_metadata(metadata("Tue, 20 Oct 2026 07:28:00 GMT", "\"v2\""));
        assert!(matches!(
            refresher.refresh().unwrap(),
            RefreshOutcome::Unchanged
        ));
        assert_eq!(RefreshState::Unchanged, refresher.state());
        assert!(nothing_extracted(&setup));
        assert!(!setup.requests.borrow()[0].1.exists());
    }

    #[test]
    fn server_error() {
        let setup = setup();
        let mut refresher = refresher(&setup, 500, Some("fixtures/zips/gtfs.zip"));
        match refresher.refresh() {
            Err(Error::RemoteFetch { url, status }) => {
                assert_eq!("https://example.org/gtfs.zip", url);
                assert_eq!(500, status);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(RefreshState::Failed, refresher.state());
        assert_eq!(Some("\"v1\""), refresher.metadata().etag.as_deref());
        assert!(!setup.requests.borrow()[0].1.exists());
        assert!(nothing_extracted(&setup));
    }

    #[test]
    fn same_url_downloads_do_not_collide() {
        let setup = setup();
        let mut first = refresher(&setup, 200, Some("fixtures/zips/gtfs.zip"));
        let mut second = refresher(&setup, 200, Some("fixtures/zips/gtfs.zip"));
        let a = match first.refresh().unwrap() {
            RefreshOutcome::Refreshed(archive) => archive,
            RefreshOutcome::Unchanged => panic!("the archive should have been refreshed"),
        };
        let b = match second.refresh().unwrap() {
            RefreshOutcome::Refreshed(archive) => archive,
            RefreshOutcome::Unchanged => panic!("the archive should have been refreshed"),
        };

        let requests = setup.requests.borrow();
        assert_eq!(2, requests.len());
        assert_ne!(requests[0].1, requests[1].1);
        for (_, path) in requests.iter() {
            assert_eq!(Some(setup.reader.download_dir.as_path()), path.parent());
            assert!(!path.exists());
        }
        assert_eq!(a.sha256(), b.sha256());
        a.delete_uncompressed_files().unwrap();
        b.delete_uncompressed_files().unwrap();
    }

    #[test]
    fn malformed_download() {
        let setup = setup();
        let mut refresher = refresher(&setup, 200, Some("fixtures/zips/not_a_zip.zip"));
        assert!(matches!(
            refresher.refresh(),
            Err(Error::MalformedArchive { .. })
        ));
        assert_eq!(RefreshState::Failed, refresher.state());
        assert!(!setup.requests.borrow()[0].1.exists());
    }
}
