use crate::objects::*;
use crate::{Archive, ArchiveReader, DirectorySource, Error, TableSource};
use chrono::NaiveDate;
use rgb::RGB8;
use std::fs;
use std::io::Read;
use std::sync::{Arc, Mutex};

/// Records every table opened
struct CountingSource {
    inner: DirectorySource,
    opened: Arc<Mutex<Vec<String>>>,
}

impl TableSource for CountingSource {
    fn open(&self, file_name: &str) -> Result<Option<Box<dyn Read + '_>>, Error> {
        self.opened.lock().unwrap().push(file_name.to_owned());
        self.inner.open(file_name)
    }
}

fn counting_archive() -> (Archive, Arc<Mutex<Vec<String>>>) {
    let opened = Arc::new(Mutex::new(Vec::new()));
    let archive = Archive::from_table_source(CountingSource {
        inner: DirectorySource::new("fixtures/basic"),
        opened: opened.clone(),
    });
    (archive, opened)
}

fn times_opened(opened: &Mutex<Vec<String>>, file_name: &str) -> usize {
    opened
        .lock()
        .unwrap()
        .iter()
        .filter(|f| *f == file_name)
        .count()
}

fn basic() -> Archive {
    Archive::from_path("fixtures/basic").expect("impossible to read gtfs")
}

#[test]
fn archive_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<Archive>();
}

#[test]
fn tables_are_parsed_once() {
    let (archive, opened) = counting_archive();
    let first = archive.stops().unwrap();
    let second = archive.stops().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(archive.stop("A").unwrap().is_some());
    assert!(archive.stop("C").unwrap().is_none());
    assert_eq!(1, times_opened(&opened, "stops.txt"));

    let shape = archive.shape("S1").unwrap();
    assert!(Arc::ptr_eq(&shape, &archive.shape("S1").unwrap()));
    archive.shape("S2").unwrap();
    assert_eq!(1, times_opened(&opened, "shapes.txt"));
}

#[test]
fn groupings_are_built_once() {
    let (archive, opened) = counting_archive();
    archive.stop_times_for_stop("A").unwrap();
    let cached = archive.cached_queries();
    archive.stop_times_for_stop("B").unwrap();
    archive.stop_times_for_stop("unknown").unwrap();
    assert_eq!(cached, archive.cached_queries());
    archive.stop_times_for_trip("T1").unwrap();
    assert_eq!(cached + 1, archive.cached_queries());
    assert_eq!(1, times_opened(&opened, "stop_times.txt"));
}

#[test]
fn read_stops() {
    let archive = basic();
    let stops = archive.stops().unwrap();
    assert_eq!(3, stops.len());
    // the overwritten stop keeps its first position
    assert_eq!(vec!["A", "B", "D"], stops.ids().collect::<Vec<_>>());

    let a = archive.stop("A").unwrap().unwrap();
    assert_eq!(Some("New".to_owned()), a.name);
    assert_eq!(Some("B".to_owned()), a.parent_station);
    assert_eq!(Some(48.796_058), a.latitude);
    assert_eq!(Some(LocationType::StopPoint), a.location_type);

    let b = archive.stop("B").unwrap().unwrap();
    assert_eq!(Some("Gare".to_owned()), b.name);
    assert_eq!(Some("Station, main hall".to_owned()), b.description);
    assert_eq!(Some(LocationType::StopArea), b.location_type);
    assert_eq!(Some(Availability::Available), b.wheelchair_boarding);

    let d = archive.stop("D").unwrap().unwrap();
    assert_eq!(None, d.latitude);
    assert_eq!(Some(LocationType::GenericNode), d.location_type);
    assert_eq!(Some(Availability::NotAvailable), d.wheelchair_boarding);

    assert!(archive.stop("C").unwrap().is_none());
}

#[test]
fn empty_is_absent_and_zero_is_a_value() {
    let archive = basic();
    let b = archive.stop("B").unwrap().unwrap();
    assert_eq!(Some("0".to_owned()), b.code);
    let a = archive.stop("A").unwrap().unwrap();
    assert_eq!(None, a.code);
    assert_eq!(None, a.wheelchair_boarding);

    let transfers = archive.transfers_from_stop("A").unwrap();
    assert_eq!(1, transfers.len());
    assert_eq!(Some(0), transfers[0].min_transfer_time);
    assert_eq!(Some(TransferType::MinTime), transfers[0].transfer_type);

    let transfers = archive.transfers_from_stop("B").unwrap();
    assert_eq!(2, transfers.len());
    assert_eq!(None, transfers[0].transfer_type);
    assert_eq!(Some(60), transfers[0].min_transfer_time);
    assert_eq!(Some(TransferType::Impossible), transfers[1].transfer_type);
    assert_eq!(None, transfers[1].min_transfer_time);
}

#[test]
fn read_routes() {
    let archive = basic();
    assert_eq!(3, archive.routes().unwrap().len());

    let r1 = archive.route("R1").unwrap().unwrap();
    assert_eq!(RouteType::Bus, r1.route_type);
    assert_eq!(Some(RGB8::new(255, 0, 0)), r1.color);
    assert_eq!(Some(RGB8::new(255, 255, 255)), r1.text_color);
    assert_eq!(Some(1), r1.order);
    assert_eq!("Ligne 1", format!("{}", r1));

    let r2 = archive.route("R2").unwrap().unwrap();
    assert_eq!(RouteType::Tramway, r2.route_type);
    assert_eq!(None, r2.color);

    let r3 = archive.route("R3").unwrap().unwrap();
    assert_eq!(RouteType::Taxi, r3.route_type);
    assert_eq!(None, r3.agency_id);
    assert_eq!("X", format!("{}", r3));

    assert_eq!(1, archive.routes_for_agency("1").unwrap().len());
    assert!(archive.routes_for_agency("42").unwrap().is_empty());
}

#[test]
fn agencies() {
    let archive = basic();
    assert_eq!(2, archive.agencies().unwrap().len());
    let r1 = archive.route("R1").unwrap().unwrap();
    let agency = archive.agency_of_route(&r1).unwrap().unwrap();
    assert_eq!("BIBUS", agency.name);
    assert_eq!(None, agency.phone);
    assert_eq!(
        "Kalmar Länstrafik",
        archive.agency("2").unwrap().unwrap().name
    );
    // without agency_id, a route cannot be attributed when there are several agencies
    let r3 = archive.route("R3").unwrap().unwrap();
    assert!(archive.agency_of_route(&r3).unwrap().is_none());
}

#[test]
fn read_trips() {
    let archive = basic();
    let t1 = archive.trip("T1").unwrap().unwrap();
    assert_eq!(Some(DirectionType::Outbound), t1.direction_id);
    assert_eq!(Some(Availability::Available), t1.wheelchair_accessible);
    assert_eq!("R1", archive.route_of_trip(&t1).unwrap().unwrap().id);
    assert!(archive.calendar_of_trip(&t1).unwrap().unwrap().saturday);
    assert_eq!(3, archive.shape_of_trip(&t1).unwrap().len());

    let t2 = archive.trip("T2").unwrap().unwrap();
    assert_eq!(None, t2.trip_headsign);
    assert_eq!(Some(DirectionType::Inbound), t2.direction_id);

    let t3 = archive.trip("T3").unwrap().unwrap();
    assert!(archive.shape_of_trip(&t3).unwrap().is_empty());

    assert_eq!(2, archive.trips_for_route("R1").unwrap().len());
    assert!(archive.trips_for_route("R3").unwrap().is_empty());
}

#[test]
fn read_stop_times() {
    let archive = basic();
    assert_eq!(6, archive.stop_times().unwrap().len());

    let t1 = archive.stop_times_for_trip("T1").unwrap();
    assert_eq!(
        vec![1, 2, 3],
        t1.iter().map(|st| st.stop_sequence).collect::<Vec<_>>()
    );
    assert_eq!(Some(8 * 3600), t1[0].arrival_time);
    assert_eq!(Some(PickupDropOffType::Regular), t1[0].pickup_type);
    assert_eq!(Some(PickupDropOffType::NotAvailable), t1[0].drop_off_type);
    assert_eq!(Some(TimepointType::Exact), t1[0].timepoint);
    assert_eq!(Some(8 * 3600 + 6 * 60), t1[1].departure_time);
    assert_eq!(Some(1.5), t1[1].shape_dist_traveled);
    assert_eq!(Some(PickupDropOffType::ArrangeByPhone), t1[1].pickup_type);
    assert_eq!(None, t1[2].arrival_time);
    assert_eq!(None, t1[2].pickup_type);

    let d = archive.stop_of_stop_time(&t1[2]).unwrap().unwrap();
    assert_eq!(Some("Platform".to_owned()), d.name);
    assert_eq!("T1", archive.trip_of_stop_time(&t1[2]).unwrap().unwrap().id);

    let t2 = archive.stop_times_for_trip("T2").unwrap();
    assert_eq!(Some(9 * 3600 + 10 * 60), t2[1].arrival_time);
    let t3 = archive.stop_times_for_trip("T3").unwrap();
    assert_eq!(Some(25 * 3600 + 10 * 60), t3[0].arrival_time);

    assert!(archive.stop_times_for_trip("T4").unwrap().is_empty());
}

#[test]
fn grouped_stop_times_match_a_scan() {
    let archive = basic();
    let stop_times = archive.stop_times().unwrap();
    for stop_time in stop_times.all() {
        let scanned = stop_times.filter(|st| st.stop_id == stop_time.stop_id);
        let grouped = archive.stop_times_for_stop(&stop_time.stop_id).unwrap();
        assert_eq!(scanned.len(), grouped.len());
        assert!(scanned
            .iter()
            .all(|s| grouped.iter().any(|g| Arc::ptr_eq(s, g))));

        let scanned = stop_times.filter(|st| st.trip_id == stop_time.trip_id);
        let grouped = archive.stop_times_for_trip(&stop_time.trip_id).unwrap();
        assert_eq!(scanned.len(), grouped.len());
        assert!(scanned
            .iter()
            .all(|s| grouped.iter().any(|g| Arc::ptr_eq(s, g))));
    }
}

#[test]
fn read_shapes() {
    let archive = basic();
    let points = archive.shape_points().unwrap();
    // S1 sequence 3 is given twice
    assert_eq!(6, points.len());
    assert_eq!(Some(0), points.position("S1"));
    assert_eq!(Some(3), points.position("S2"));
    assert_eq!(Some(5), points.position("S4"));

    let s1 = archive.shape("S1").unwrap();
    assert_eq!(
        vec![1, 2, 3],
        s1.iter().map(|p| p.sequence).collect::<Vec<_>>()
    );
    assert_eq!(Some(0.), s1[0].dist_traveled);
    assert_eq!(None, s1[1].dist_traveled);
    assert_eq!(Some(300.), s1[2].dist_traveled);
    assert_eq!(37.7, s1[2].latitude);

    let s2 = archive.shape("S2").unwrap();
    assert_eq!(
        vec![1, 2],
        s2.iter().map(|p| p.sequence).collect::<Vec<_>>()
    );
    assert_eq!(1, archive.shape("S4").unwrap().len());

    assert!(archive.shape("S3").unwrap().is_empty());
    assert!(archive.shape("S0").unwrap().is_empty());
    assert!(archive.shape("S5").unwrap().is_empty());
}

#[test]
fn read_calendar() {
    let archive = basic();
    assert_eq!(2, archive.calendar().unwrap().len());
    let service1 = archive.calendar_for_service("service1").unwrap().unwrap();
    assert!(!service1.monday);
    assert!(service1.saturday);
    assert_eq!(NaiveDate::from_ymd_opt(2017, 1, 15), Some(service1.end_date));
    assert!(archive.calendar_for_service("service3").unwrap().is_none());
}

#[test]
fn read_calendar_dates() {
    let archive = basic();
    assert_eq!(3, archive.calendar_dates().unwrap().len());
    let service1 = archive.calendar_dates_for_service("service1").unwrap();
    assert_eq!(2, service1.len());
    assert!(service1
        .iter()
        .all(|d| d.exception_type == Exception::Deleted));
    assert_eq!(
        Exception::Added,
        archive.calendar_dates_for_service("service2").unwrap()[0].exception_type
    );
    assert!(archive
        .calendar_dates_for_service("service3")
        .unwrap()
        .is_empty());
}

#[test]
fn read_feed_info() {
    let archive = basic();
    let feed_info = archive.feed_info().unwrap();
    assert_eq!(1, feed_info.len());
    let feed = &feed_info.all()[0];
    assert_eq!("SNCF", feed.name);
    assert_eq!(NaiveDate::from_ymd_opt(2018, 7, 9), feed.start_date);
    assert_eq!(Some("0.3".to_owned()), feed.version);
    assert_eq!(None, feed.contact_email);
}

#[test]
fn read_frequencies() {
    let archive = basic();
    let frequencies = archive.frequencies_for_trip("T3").unwrap();
    assert_eq!(2, frequencies.len());
    assert_eq!(5 * 3600 + 30 * 60, frequencies[0].start_time);
    assert_eq!(600, frequencies[0].headway_secs);
    assert_eq!(Some(ExactTimes::ScheduleBased), frequencies[0].exact_times);
    assert_eq!(None, frequencies[1].exact_times);
    assert!(archive.frequencies_for_trip("T1").unwrap().is_empty());
}

#[test]
fn read_directions() {
    let archive = basic();
    let directions = archive.directions_for_route("R1").unwrap();
    assert_eq!(2, directions.len());
    assert_eq!("NB", directions[0].cardinal_abbreviation(true));
    assert_eq!("Outbound", directions[0].bound_direction());
    assert_eq!("S", directions[1].cardinal_abbreviation(false));
    assert_eq!("Inbound", directions[1].bound_direction());
}

#[test]
fn read_from_zip() {
    let dir = tempfile::tempdir().unwrap();
    let archive = ArchiveReader::default()
        .extraction_root(dir.path())
        .read("fixtures/zips/gtfs.zip")
        .expect("impossible to read gtfs");
    assert_eq!(64, archive.sha256().unwrap().len());
    let root = archive.root().unwrap().to_owned();
    assert!(root.starts_with(dir.path()));
    assert!(root.join("stops.txt").is_file());
    assert_eq!(
        Some("New".to_owned()),
        archive.stop("A").unwrap().unwrap().name.clone()
    );
    assert_eq!(3, archive.shape("S1").unwrap().len());

    archive.delete_uncompressed_files().unwrap();
    assert!(!root.exists());
}

#[test]
fn same_zip_opened_twice() {
    let dir = tempfile::tempdir().unwrap();
    let reader = ArchiveReader::default().extraction_root(dir.path());
    let first = reader.clone().read("fixtures/zips/gtfs.zip").unwrap();
    let second = reader.read("fixtures/zips/gtfs.zip").unwrap();
    assert_ne!(first.root(), second.root());
    assert_eq!(first.sha256(), second.sha256());
    first.delete_uncompressed_files().unwrap();
    assert!(second.stop("B").unwrap().is_some());
    second.delete_uncompressed_files().unwrap();
}

#[test]
fn directory_is_not_deleted() {
    let archive = basic();
    assert!(archive.sha256().is_none());
    archive.delete_uncompressed_files().unwrap();
    assert!(std::path::Path::new("fixtures/basic/stops.txt").is_file());
}

#[test]
fn absent_tables_are_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("stops.txt"),
        "stop_id,stop_name\nA,Somewhere\n",
    )
    .unwrap();
    let archive = Archive::from_path(dir.path()).unwrap();
    assert_eq!(1, archive.stops().unwrap().len());
    assert!(archive.agencies().unwrap().is_empty());
    assert!(archive.stop_times_for_stop("A").unwrap().is_empty());
    assert!(archive.shape("S1").unwrap().is_empty());
    assert!(archive.trip("T1").unwrap().is_none());
}

#[test]
fn invalid_record() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("routes.txt"),
        "route_id,route_type\nR1,3\nR2,bus\n",
    )
    .unwrap();
    let archive = Archive::from_path(dir.path()).unwrap();
    match archive.routes() {
        Err(Error::InvalidRecord {
            file_name,
            line_in_error,
            ..
        }) => {
            assert_eq!("routes.txt", file_name);
            assert_eq!(vec!["R2", "bus"], line_in_error.values);
        }
        other => panic!("unexpected result {:?}", other.map(|r| r.len())),
    }
    // nothing partial was kept
    assert_eq!(0, archive.cached_queries());
}

#[test]
fn missing_key_column() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("stops.txt"), "id,stop_name\nA,Somewhere\n").unwrap();
    let archive = Archive::from_path(dir.path()).unwrap();
    assert!(matches!(
        archive.stops(),
        Err(Error::MissingColumn { column, .. }) if column == "stop_id"
    ));
}

#[test]
fn not_file_nor_directory() {
    assert!(matches!(
        Archive::from_path("fixtures/does_not_exist"),
        Err(Error::NotFileNorDirectory(_))
    ));
}

#[test]
fn malformed_zip() {
    let dir = tempfile::tempdir().unwrap();
    let res = ArchiveReader::default()
        .extraction_root(dir.path())
        .read("fixtures/zips/not_a_zip.zip");
    assert!(matches!(res, Err(Error::MalformedArchive { .. })));
    assert_eq!(0, fs::read_dir(dir.path()).unwrap().count());
}

#[test]
fn malformed_zip_error_survives_a_failed_cleanup() {
    // the extraction directory cannot exist below a regular file, so removing it fails too
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("file");
    fs::write(&not_a_dir, "").unwrap();
    let res = ArchiveReader::default()
        .extraction_root(&not_a_dir)
        .read("fixtures/zips/not_a_zip.zip");
    assert!(matches!(res, Err(Error::MalformedArchive { .. })));
}
