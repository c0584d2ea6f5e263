//! Where table files come from: an extracted directory, and the zip extraction producing it
use crate::Error;
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// The tables of a GTFS archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableName {
    Agency,
    Stops,
    Routes,
    Trips,
    StopTimes,
    Calendar,
    CalendarDates,
    FareAttributes,
    FareRules,
    Shapes,
    Frequencies,
    Transfers,
    Pathways,
    Levels,
    FeedInfo,
    /// GTFS+ extension
    Directions,
}

impl TableName {
    pub const ALL: [TableName; 16] = [
        TableName::Agency,
        TableName::Stops,
        TableName::Routes,
        TableName::Trips,
        TableName::StopTimes,
        TableName::Calendar,
        TableName::CalendarDates,
        TableName::FareAttributes,
        TableName::FareRules,
        TableName::Shapes,
        TableName::Frequencies,
        TableName::Transfers,
        TableName::Pathways,
        TableName::Levels,
        TableName::FeedInfo,
        TableName::Directions,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            TableName::Agency => "agency.txt",
            TableName::Stops => "stops.txt",
            TableName::Routes => "routes.txt",
            TableName::Trips => "trips.txt",
            TableName::StopTimes => "stop_times.txt",
            TableName::Calendar => "calendar.txt",
            TableName::CalendarDates => "calendar_dates.txt",
            TableName::FareAttributes => "fare_attributes.txt",
            TableName::FareRules => "fare_rules.txt",
            TableName::Shapes => "shapes.txt",
            TableName::Frequencies => "frequencies.txt",
            TableName::Transfers => "transfers.txt",
            TableName::Pathways => "pathways.txt",
            TableName::Levels => "levels.txt",
            TableName::FeedInfo => "feed_info.txt",
            TableName::Directions => "directions.txt",
        }
    }

    /// Whether the archive can turn this table into records. Fares, pathways and levels are not
    /// read.
    pub fn is_supported(&self) -> bool {
        !matches!(
            self,
            TableName::FareAttributes
                | TableName::FareRules
                | TableName::Pathways
                | TableName::Levels
        )
    }

    pub fn from_file_name(file_name: &str) -> Option<TableName> {
        TableName::ALL
            .iter()
            .copied()
            .find(|t| t.file_name() == file_name)
    }
}

/// Gives access to the raw content of the tables of one archive
pub trait TableSource {
    /// Opens the table, `None` when the archive does not contain it
    fn open(&self, file_name: &str) -> Result<Option<Box<dyn Read + '_>>, Error>;
}

/// Tables stored as files of a directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DirectorySource {
            root: root.as_ref().to_owned(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TableSource for DirectorySource {
    fn open(&self, file_name: &str) -> Result<Option<Box<dyn Read + '_>>, Error> {
        match File::open(self.root.join(file_name)) {
            Ok(file) => Ok(Some(Box::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no {} in {}", file_name, self.root.display());
                Ok(None)
            }
            Err(e) => Err(Error::NamedFileIO {
                file_name: file_name.to_owned(),
                source: Box::new(e),
            }),
        }
    }
}

/// Hex encoded sha256 of a file
pub fn sha256_of<P: AsRef<Path>>(path: P) -> Result<String, Error> {
    let mut file = File::open(path.as_ref())?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Extracts every file of a zip archive directly into `destination`.
///
/// Folders inside the zip are flattened: feeds are often zipped with an enclosing directory and
/// only the file names matter.
pub fn extract_zip<P: AsRef<Path>, Q: AsRef<Path>>(zip_path: P, destination: Q) -> Result<(), Error> {
    let zip_path = zip_path.as_ref();
    let destination = destination.as_ref();
    let malformed = |source| Error::MalformedArchive {
        path: format!("{}", zip_path.display()),
        source,
    };

    let mut archive = zip::ZipArchive::new(File::open(zip_path)?).map_err(malformed)?;
    fs::create_dir_all(destination)?;
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(malformed)?;
        if file.is_dir() {
            continue;
        }
        let file_name = match file.enclosed_name().and_then(|p| p.file_name()) {
            Some(file_name) => file_name.to_owned(),
            None => continue,
        };
        let mut target = File::create(destination.join(file_name))?;
        io::copy(&mut file, &mut target)?;
    }
    info!(
        "extracted {} entries of {} into {}",
        archive.len(),
        zip_path.display(),
        destination.display()
    );
    Ok(())
}

/// Removes an extracted directory and everything in it. A missing directory is not an error.
pub fn remove_extracted<P: AsRef<Path>>(root: P) -> Result<(), Error> {
    match fs::remove_dir_all(root.as_ref()) {
        Ok(()) => {
            debug!("removed {}", root.as_ref().display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
