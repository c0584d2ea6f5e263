use gtfs_archive::{ArchiveReader, RefreshOutcome};

/// Downloads the archive given as a cli argument, then asks the server if it changed
fn main() {
    env_logger::init();
    let url = std::env::args()
        .nth(1)
        .expect("you should put the url of the archive to load");

    let mut refresher = ArchiveReader::default().refresher(&url);
    let archive = match refresher.refresh().expect("impossible to download the archive") {
        RefreshOutcome::Refreshed(archive) => archive,
        RefreshOutcome::Unchanged => unreachable!("nothing was downloaded before"),
    };
    println!("there are {} stops in the gtfs", archive.stops().unwrap().len());
    println!("validators: {:?}", refresher.metadata());

    match refresher.refresh() {
        Ok(RefreshOutcome::Unchanged) => println!("not modified since the first download"),
        Ok(RefreshOutcome::Refreshed(newer)) => {
            println!("a newer version was published, sha256 {:?}", newer.sha256());
            newer.delete_uncompressed_files().unwrap();
        }
        Err(e) => eprintln!("error: {:?}", e),
    }
    archive.delete_uncompressed_files().unwrap();
}
