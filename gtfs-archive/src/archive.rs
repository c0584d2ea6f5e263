use crate::cache::{CacheKey, QueryCache};
use crate::fetch::RemoteMetadata;
use crate::index::{FxIndexMap, GroupIndex, SortedIndex, Table, UniqueIndex};
use crate::objects::*;
use crate::row_reader::TableReader;
use crate::source::{remove_extracted, TableName, TableSource};
use crate::{ArchiveReader, Error};
use log::info;
use serde::de::DeserializeOwned;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

const STOP_TIMES_BY_STOP: &str = "stop_times_by_stop";
const STOP_TIMES_BY_TRIP: &str = "stop_times_by_trip";
const SHAPE: &str = "shape";

/// One snapshot of a GTFS feed.
///
/// Tables are parsed the first time they are queried and every derived result is computed at
/// most once: asking twice gives back the same [Arc]. Nothing is ever reloaded, an archive whose
/// files change on disk after a table was read keeps answering with what it read.
///
/// An [Archive] can be sent to another thread but not shared between threads; wrap it in a
/// `Mutex` if several threads need it.
///
/// Extracted files are not removed automatically, call [Archive::delete_uncompressed_files] when
/// done.
pub struct Archive {
    source: Box<dyn TableSource + Send>,
    table_reader: TableReader,
    cache: QueryCache,
    root: Option<PathBuf>,
    owns_root: bool,
    sha256: Option<String>,
    remote_metadata: Option<RemoteMetadata>,
}

impl fmt::Debug for Archive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Archive")
            .field("root", &self.root)
            .field("owns_root", &self.owns_root)
            .field("sha256", &self.sha256)
            .field("remote_metadata", &self.remote_metadata)
            .field("cached_queries", &self.cache.len())
            .finish()
    }
}

impl Archive {
    /// Reads from an url (if starts with `"http"`), or a local path (either a directory or zipped file)
    ///
    /// See also [Archive::from_url] and [Archive::from_path] if you don’t want the library to guess
    pub fn new(gtfs: &str) -> Result<Archive, Error> {
        ArchiveReader::default().read(gtfs)
    }

    /// Opens a local zip archive or an already extracted directory
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Archive, Error> {
        ArchiveReader::default().read_from_path(path)
    }

    /// Downloads and extracts a remote archive
    pub fn from_url(url: &str) -> Result<Archive, Error> {
        ArchiveReader::default().read_from_url(url)
    }

    /// An archive reading its tables from any [TableSource]
    pub fn from_table_source<S>(source: S) -> Archive
    where
        S: TableSource + Send + 'static,
    {
        Archive::with_source(Box::new(source), TableReader { trim_fields: true })
    }

    pub(crate) fn with_source(source: Box<dyn TableSource + Send>, table_reader: TableReader) -> Self {
        Archive {
            source,
            table_reader,
            cache: QueryCache::default(),
            root: None,
            owns_root: false,
            sha256: None,
            remote_metadata: None,
        }
    }

    pub(crate) fn with_root(mut self, root: PathBuf, owned: bool) -> Self {
        self.root = Some(root);
        self.owns_root = owned;
        self
    }

    pub(crate) fn with_sha256(mut self, sha256: String) -> Self {
        self.sha256 = Some(sha256);
        self
    }

    pub(crate) fn with_remote_metadata(mut self, metadata: RemoteMetadata) -> Self {
        self.remote_metadata = Some(metadata);
        self
    }

    /// Directory holding the table files, if the archive is backed by one
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// sha256 of the zip the archive was extracted from
    pub fn sha256(&self) -> Option<&str> {
        self.sha256.as_deref()
    }

    /// Validators of the remote archive, when it was downloaded
    pub fn remote_metadata(&self) -> Option<&RemoteMetadata> {
        self.remote_metadata.as_ref()
    }

    /// Number of tables and derived results computed so far
    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }

    /// Removes the files extracted for this archive.
    ///
    /// A directory given by the caller is left untouched.
    pub fn delete_uncompressed_files(self) -> Result<(), Error> {
        match (&self.root, self.owns_root) {
            (Some(root), true) => {
                info!("removing extracted files in {}", root.display());
                remove_extracted(root)
            }
            _ => Ok(()),
        }
    }

    fn open(&self, table: TableName) -> Result<Option<Box<dyn Read + '_>>, Error> {
        self.source.open(table.file_name())
    }

    fn table<T>(&self, table: TableName) -> Result<Arc<Table<T>>, Error>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        self.cache
            .get_or_try_insert_with(CacheKey::method(table.file_name()), || {
                let now = Instant::now();
                let records = match self.open(table)? {
                    Some(reader) => self.table_reader.read_objs(reader, table.file_name())?,
                    None => Vec::new(),
                };
                info!(
                    "{} records of {} read in {} ms",
                    records.len(),
                    table.file_name(),
                    now.elapsed().as_millis()
                );
                Ok(Table::new(records))
            })
    }

    fn unique<T>(&self, table: TableName, key_column: &str) -> Result<Arc<UniqueIndex<T>>, Error>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        self.cache
            .get_or_try_insert_with(CacheKey::method(table.file_name()), || {
                let now = Instant::now();
                let records = match self.open(table)? {
                    Some(reader) => {
                        self.table_reader
                            .read_objs_by_key(reader, table.file_name(), key_column)?
                    }
                    None => FxIndexMap::default(),
                };
                info!(
                    "{} records of {} read in {} ms",
                    records.len(),
                    table.file_name(),
                    now.elapsed().as_millis()
                );
                Ok(UniqueIndex::new(records))
            })
    }

    fn grouped<T>(
        &self,
        method: &'static str,
        table: &Table<T>,
        key_of: fn(&T) -> &str,
    ) -> Result<Arc<GroupIndex<T>>, Error>
    where
        T: Send + Sync + 'static,
    {
        self.cache.get_or_try_insert_with(CacheKey::method(method), || {
            Ok(GroupIndex::build(table.all(), key_of))
        })
    }

    pub fn agencies(&self) -> Result<Arc<Table<Agency>>, Error> {
        self.table(TableName::Agency)
    }

    /// Scans the agencies, `agency_id` being optional it is not indexed
    pub fn agency(&self, id: &str) -> Result<Option<Arc<Agency>>, Error> {
        Ok(self.agencies()?.find(|a| a.id.as_deref() == Some(id)))
    }

    pub fn stops(&self) -> Result<Arc<UniqueIndex<Stop>>, Error> {
        self.unique(TableName::Stops, "stop_id")
    }

    pub fn stop(&self, id: &str) -> Result<Option<Arc<Stop>>, Error> {
        Ok(self.stops()?.get(id))
    }

    pub fn routes(&self) -> Result<Arc<UniqueIndex<Route>>, Error> {
        self.unique(TableName::Routes, "route_id")
    }

    pub fn route(&self, id: &str) -> Result<Option<Arc<Route>>, Error> {
        Ok(self.routes()?.get(id))
    }

    pub fn routes_for_agency(&self, agency_id: &str) -> Result<Vec<Arc<Route>>, Error> {
        Ok(self
            .routes()?
            .all()
            .filter(|r| r.agency_id.as_deref() == Some(agency_id))
            .cloned()
            .collect())
    }

    pub fn trips(&self) -> Result<Arc<UniqueIndex<Trip>>, Error> {
        self.unique(TableName::Trips, "trip_id")
    }

    pub fn trip(&self, id: &str) -> Result<Option<Arc<Trip>>, Error> {
        Ok(self.trips()?.get(id))
    }

    pub fn trips_for_route(&self, route_id: &str) -> Result<Vec<Arc<Trip>>, Error> {
        Ok(self
            .trips()?
            .all()
            .filter(|t| t.route_id == route_id)
            .cloned()
            .collect())
    }

    pub fn stop_times(&self) -> Result<Arc<Table<StopTime>>, Error> {
        self.table(TableName::StopTimes)
    }

    /// Stop times at a stop, in file order. The grouping is built on the first call.
    pub fn stop_times_for_stop(&self, stop_id: &str) -> Result<Vec<Arc<StopTime>>, Error> {
        let stop_times = self.stop_times()?;
        let groups = self.grouped(STOP_TIMES_BY_STOP, &stop_times, |st| st.stop_id.as_str())?;
        Ok(groups.get(stop_id))
    }

    /// Stop times of a trip, in file order. The grouping is built on the first call.
    pub fn stop_times_for_trip(&self, trip_id: &str) -> Result<Vec<Arc<StopTime>>, Error> {
        let stop_times = self.stop_times()?;
        let groups = self.grouped(STOP_TIMES_BY_TRIP, &stop_times, |st| st.trip_id.as_str())?;
        Ok(groups.get(trip_id))
    }

    pub fn calendar(&self) -> Result<Arc<Table<Calendar>>, Error> {
        self.table(TableName::Calendar)
    }

    pub fn calendar_for_service(&self, service_id: &str) -> Result<Option<Arc<Calendar>>, Error> {
        Ok(self.calendar()?.find(|c| c.id == service_id))
    }

    pub fn calendar_dates(&self) -> Result<Arc<Table<CalendarDate>>, Error> {
        self.table(TableName::CalendarDates)
    }

    pub fn calendar_dates_for_service(
        &self,
        service_id: &str,
    ) -> Result<Vec<Arc<CalendarDate>>, Error> {
        Ok(self
            .calendar_dates()?
            .filter(|c| c.service_id == service_id))
    }

    /// Every shape point, sorted by shape and sequence.
    ///
    /// A point repeating the shape id and sequence of an earlier one replaces it.
    pub fn shape_points(&self) -> Result<Arc<SortedIndex<ShapePoint>>, Error> {
        let file_name = TableName::Shapes.file_name();
        self.cache
            .get_or_try_insert_with(CacheKey::method(file_name), || {
                let now = Instant::now();
                let points = match self.open(TableName::Shapes)? {
                    Some(reader) => self.table_reader.read_objs_by_composite_key(
                        reader,
                        file_name,
                        "shape_id",
                        "shape_pt_sequence",
                    )?,
                    None => FxIndexMap::default(),
                };
                info!(
                    "{} records of {} read in {} ms",
                    points.len(),
                    file_name,
                    now.elapsed().as_millis()
                );
                Ok(SortedIndex::new(
                    points.into_values().collect(),
                    |p: &ShapePoint| p.id.as_str(),
                    |a, b| a.sequence.cmp(&b.sequence),
                ))
            })
    }

    /// Points of a shape, in ascending sequence order. Empty for an unknown shape.
    pub fn shape(&self, id: &str) -> Result<Arc<Vec<Arc<ShapePoint>>>, Error> {
        self.cache
            .get_or_try_insert_with(CacheKey::with_argument(SHAPE, id), || {
                Ok(self.shape_points()?.run(id).to_vec())
            })
    }

    pub fn transfers(&self) -> Result<Arc<Table<Transfer>>, Error> {
        self.table(TableName::Transfers)
    }

    pub fn transfers_from_stop(&self, stop_id: &str) -> Result<Vec<Arc<Transfer>>, Error> {
        Ok(self.transfers()?.filter(|t| t.from_stop_id == stop_id))
    }

    pub fn feed_info(&self) -> Result<Arc<Table<FeedInfo>>, Error> {
        self.table(TableName::FeedInfo)
    }

    pub fn frequencies(&self) -> Result<Arc<Table<Frequency>>, Error> {
        self.table(TableName::Frequencies)
    }

    pub fn frequencies_for_trip(&self, trip_id: &str) -> Result<Vec<Arc<Frequency>>, Error> {
        Ok(self.frequencies()?.filter(|f| f.trip_id == trip_id))
    }

    pub fn directions(&self) -> Result<Arc<Table<Direction>>, Error> {
        self.table(TableName::Directions)
    }

    pub fn directions_for_route(&self, route_id: &str) -> Result<Vec<Arc<Direction>>, Error> {
        Ok(self.directions()?.filter(|d| d.route_id == route_id))
    }

    pub fn route_of_trip(&self, trip: &Trip) -> Result<Option<Arc<Route>>, Error> {
        self.route(&trip.route_id)
    }

    pub fn trip_of_stop_time(&self, stop_time: &StopTime) -> Result<Option<Arc<Trip>>, Error> {
        self.trip(&stop_time.trip_id)
    }

    pub fn stop_of_stop_time(&self, stop_time: &StopTime) -> Result<Option<Arc<Stop>>, Error> {
        self.stop(&stop_time.stop_id)
    }

    /// Empty when the trip has no shape
    pub fn shape_of_trip(&self, trip: &Trip) -> Result<Arc<Vec<Arc<ShapePoint>>>, Error> {
        match &trip.shape_id {
            Some(shape_id) => self.shape(shape_id),
            None => Ok(Arc::default()),
        }
    }

    /// Agency running the route. A route without `agency_id` belongs to the only agency of the
    /// feed, if there is exactly one.
    pub fn agency_of_route(&self, route: &Route) -> Result<Option<Arc<Agency>>, Error> {
        match &route.agency_id {
            Some(agency_id) => self.agency(agency_id),
            None => {
                let agencies = self.agencies()?;
                Ok(match agencies.all() {
                    [single] => Some(Arc::clone(single)),
                    _ => None,
                })
            }
        }
    }

    pub fn calendar_of_trip(&self, trip: &Trip) -> Result<Option<Arc<Calendar>>, Error> {
        self.calendar_for_service(&trip.service_id)
    }

    /// Prints on stdout some basic statistics about the archive (numbers of elements for each object). Loads every table.
    pub fn print_stats(&self) -> Result<(), Error> {
        println!("GTFS data:");
        if let Some(sha256) = self.sha256() {
            println!("  sha256: {}", sha256);
        }
        println!("  Agencies: {}", self.agencies()?.len());
        println!("  Stops: {}", self.stops()?.len());
        println!("  Routes: {}", self.routes()?.len());
        println!("  Trips: {}", self.trips()?.len());
        println!("  Stop times: {}", self.stop_times()?.len());
        println!("  Calendar: {}", self.calendar()?.len());
        println!("  Calendar dates: {}", self.calendar_dates()?.len());
        println!("  Shape points: {}", self.shape_points()?.len());
        println!("  Transfers: {}", self.transfers()?.len());
        println!("  Frequencies: {}", self.frequencies()?.len());
        println!("  Directions: {}", self.directions()?.len());
        println!("  Feed info: {}", self.feed_info()?.len());
        Ok(())
    }
}
