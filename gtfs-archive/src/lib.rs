/*! The [General Transit Feed Specification](https://gtfs.org/) (GTFS) is a commonly used model to represent public transit data.

This crate opens GTFS archives (a local zip, a directory, or an url) and answers queries on them.

To get started, see [Archive] and [ArchiveReader].

## What is GTFS

A Gtfs feed is a collection of CSV files (often bundled as a zip file).
Each file represents a collection of one type (stops, lines, etc.) that have relationships through unique identifiers.

## Design decisions

### Lazy tables

Nothing is parsed when an [Archive] is opened. Each table is read the first time it is queried,
then kept: every query result is computed once and shared as an [std::sync::Arc].
Relationships between objects are not verified, a [Trip] referencing an unknown [Route] simply
gets `None` from [Archive::route_of_trip].

An [Archive] is not [Sync]. Use it from one thread at a time.

### Empty values

An empty CSV field is no value at all: optional fields are [std::option::Option] and an empty
mandatory field makes the row invalid. A `0` is a value, not an absence.

### Use of Enum

Many values are integers that are actually enumerations of certain values. We always use Rust enums, like [LocationType] to represent them, and not the integer value.

### Renaming

We kept some names even if they can be confusing (a [Calendar] will be referenced by `service_id`), but we strip the object type (`route_short_name` is [Route::short_name]).

### Remote archives

An [ArchiveRefresher] only downloads an archive again when the server says it changed, using the
`Last-Modified` and `ETag` of the previous download.
*/

#[macro_use]
extern crate derivative;

mod archive;
pub mod binary_search;
pub mod cache;
mod enums;
pub mod error;
pub mod fetch;
pub mod index;
pub(crate) mod objects;
mod reader;
pub mod refresh;
pub mod row_reader;
mod serde_helpers;
pub mod source;

#[cfg(test)]
mod tests;

pub use archive::Archive;
pub use error::Error;
pub use fetch::{HttpFetcher, RemoteFetcher, RemoteMetadata};
pub use objects::*;
pub use reader::ArchiveReader;
pub use refresh::{ArchiveRefresher, RefreshOutcome, RefreshState};
pub use source::{DirectorySource, TableName, TableSource};
