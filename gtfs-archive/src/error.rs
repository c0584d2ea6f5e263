//! Module for the error management
use thiserror::Error;

/// Specific line from a CSV file that could not be turned into a record
#[derive(Debug)]
pub struct LineError {
    /// Headers of the CSV file
    pub headers: Vec<String>,
    /// Values of the line that could not be parsed
    pub values: Vec<String>,
}

/// An error that can occur when opening, refreshing or querying a GTFS archive.
///
/// A query that matches nothing is not an error: lookups return `None` or an empty `Vec`.
#[derive(Error, Debug)]
pub enum Error {
    /// The zip container could not be opened or extracted
    #[error("could not open the GTFS archive '{path}'")]
    MalformedArchive {
        /// Path of the archive that could not be opened
        path: String,
        /// The error reported by the zip library
        #[source]
        source: zip::result::ZipError,
    },
    /// The given path to the GTFS is neither a file nor a directory
    #[error("could not read GTFS: {0} is neither a file nor a directory")]
    NotFileNorDirectory(String),
    /// A column needed to build an index is missing from the header or from a row
    #[error("column '{column}' needed to index '{file_name}' is missing")]
    MissingColumn {
        /// The table being indexed
        file_name: String,
        /// The key column that could not be found
        column: String,
    },
    /// The time is not given in the HH:MM:SS format
    #[error("'{0}' is not a valid time; HH:MM:SS format is expected.")]
    InvalidTime(String),
    /// The color is not given in the RRGGBB format, without a leading `#`
    #[error("'{0}' is not a valid color; RRGGBB format is expected, without a leading `#`")]
    InvalidColor(String),
    /// Generic Input/Output error
    #[error("impossible to read file")]
    IO(#[from] std::io::Error),
    /// Impossible to open or read a table file
    #[error("impossible to read '{file_name}'")]
    NamedFileIO {
        /// The file name that could not be read
        file_name: String,
        /// The inital error that caused the unability to read the file
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Impossible to read a CSV file, or the stream ended in the middle of a row
    #[error("impossible to read csv file '{file_name}'")]
    CSVError {
        /// File name that could not be parsed as CSV
        file_name: String,
        /// The initial error by the csv library
        #[source]
        source: csv::Error,
        /// The line that could not be turned into a record, if one was read
        line_in_error: Option<LineError>,
    },
    /// A row was read but could not be turned into a record
    #[error("invalid record in '{file_name}'")]
    InvalidRecord {
        /// File name of the table
        file_name: String,
        /// What went wrong while building the record
        #[source]
        source: serde::de::value::Error,
        /// The offending line
        line_in_error: LineError,
    },
    /// The remote server answered with a status that is neither a success nor `304 Not Modified`
    #[error("fetching '{url}' failed with HTTP status {status}")]
    RemoteFetch {
        /// The url that was requested
        url: String,
        /// The HTTP status code of the response
        status: u16,
    },
    /// The remote archive could not be reached at all
    #[error("impossible to remotely access '{url}'")]
    Transport {
        /// The url that was requested
        url: String,
        /// The error reported by the http client
        #[source]
        source: reqwest::Error,
    },
    /// The server answered `304 Not Modified` but there is no local copy to fall back on
    #[error("'{0}' was not modified, but there is no local copy of it")]
    NotModifiedWithoutLocalCopy(String),
}
