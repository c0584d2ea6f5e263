use crate::fetch::{HttpFetcher, RemoteFetcher};
use crate::refresh::{ArchiveRefresher, RefreshOutcome};
use crate::row_reader::TableReader;
use crate::source::{extract_zip, remove_extracted, sha256_of, DirectorySource};
use crate::{Archive, Error};
use chrono::Utc;
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static EXTRACTIONS: AtomicUsize = AtomicUsize::new(0);

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("gtfs")
}

/// Allows to parameterize how archives are opened
///
/// ```no_run
///let archive = gtfs_archive::ArchiveReader::default()
///    .trim_fields(false) // The feed is clean, don’t spend time trimming every field
///    .extraction_root("/var/cache/gtfs")
///    .read("fixtures/zips/gtfs.zip")?;
///assert!(archive.stop("B")?.is_some());
/// # Ok::<(), gtfs_archive::Error>(())
///```
#[derive(Derivative, Debug, Clone)]
#[derivative(Default)]
pub struct ArchiveReader {
    /// Avoid trimming the fields
    ///
    /// It is quite time consumming
    /// If performance is an issue, and if your data is high quality, you can switch it off
    #[derivative(Default(value = "true"))]
    pub trim_fields: bool,
    /// Zip archives are extracted in a new directory under this one
    #[derivative(Default(value = "default_work_dir()"))]
    pub extraction_root: PathBuf,
    /// Remote archives are downloaded here before being extracted
    #[derivative(Default(value = "default_work_dir()"))]
    pub download_dir: PathBuf,
}

impl ArchiveReader {
    /// Should the fields be trimmed (default: true)
    ///
    /// It is quite time consumming
    /// If performance is an issue, and if your data is high quality, you can set it to false
    pub fn trim_fields(mut self, trim_fields: bool) -> Self {
        self.trim_fields = trim_fields;
        self
    }

    /// Where zip archives are extracted (default: `gtfs` in the temporary directory)
    pub fn extraction_root<P: Into<PathBuf>>(mut self, extraction_root: P) -> Self {
        self.extraction_root = extraction_root.into();
        self
    }

    /// Where remote archives are downloaded (default: `gtfs` in the temporary directory)
    pub fn download_dir<P: Into<PathBuf>>(mut self, download_dir: P) -> Self {
        self.download_dir = download_dir.into();
        self
    }

    fn table_reader(&self) -> TableReader {
        TableReader {
            trim_fields: self.trim_fields,
        }
    }

    /// Reads from an url (if starts with `"http"`), or a local path (either a directory or zipped file)
    ///
    /// See also [ArchiveReader::read_from_url] and [ArchiveReader::read_from_path] if you don’t want the library to guess
    pub fn read(self, gtfs: &str) -> Result<Archive, Error> {
        if gtfs.starts_with("http") {
            self.read_from_url(gtfs)
        } else {
            self.read_from_path(gtfs)
        }
    }

    /// Opens a local zip archive or an already extracted directory.
    ///
    /// A directory is used in place and is never removed by [Archive::delete_uncompressed_files].
    pub fn read_from_path<P: AsRef<Path>>(self, path: P) -> Result<Archive, Error> {
        let p = path.as_ref();
        if p.is_file() {
            self.read_from_zip(p)
        } else if p.is_dir() {
            let source = DirectorySource::new(p);
            Ok(Archive::with_source(Box::new(source), self.table_reader())
                .with_root(p.to_owned(), false))
        } else {
            Err(Error::NotFileNorDirectory(format!("{}", p.display())))
        }
    }

    /// Extracts the zip in a directory of its own, owned by the returned archive
    pub(crate) fn read_from_zip(self, zip_path: &Path) -> Result<Archive, Error> {
        let sha256 = sha256_of(zip_path)?;
        let stem = zip_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "gtfs".to_owned());
        // unique per extraction, the same zip can be opened several times
        let destination = self.extraction_root.join(format!(
            "{}-{}-{}-{}",
            stem,
            std::process::id(),
            Utc::now().timestamp_millis(),
            EXTRACTIONS.fetch_add(1, Ordering::Relaxed)
        ));
        if let Err(e) = extract_zip(zip_path, &destination) {
            if let Err(cleanup) = remove_extracted(&destination) {
                warn!(
                    "impossible to clean {} after a failed extraction: {}",
                    destination.display(),
                    cleanup
                );
            }
            return Err(e);
        }

        let source = DirectorySource::new(&destination);
        Ok(Archive::with_source(Box::new(source), self.table_reader())
            .with_root(destination, true)
            .with_sha256(sha256))
    }

    /// Downloads and extracts a remote archive
    pub fn read_from_url(self, url: &str) -> Result<Archive, Error> {
        match self.refresher(url).refresh()? {
            RefreshOutcome::Refreshed(archive) => Ok(archive),
            RefreshOutcome::Unchanged => Err(Error::NotModifiedWithoutLocalCopy(url.to_owned())),
        }
    }

    /// Keeps an archive from an url up to date, over http
    pub fn refresher(self, url: &str) -> ArchiveRefresher<HttpFetcher> {
        self.refresher_with_fetcher(url, HttpFetcher::default())
    }

    /// Keeps an archive from an url up to date, with any [RemoteFetcher]
    pub fn refresher_with_fetcher<F: RemoteFetcher>(self, url: &str, fetcher: F) -> ArchiveRefresher<F> {
        ArchiveRefresher::new(url, fetcher, self)
    }
}
