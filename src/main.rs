use anyhow::{Context, Result};
use gtfs_archive::{Archive, ArchiveReader};
use log::info;
use std::time::Instant;

const USAGE: &str = "usage: gtfs-inspect <path or url> [shape_id]...";

fn print_shape(archive: &Archive, shape_id: &str) -> Result<()> {
    let points = archive
        .shape(shape_id)
        .with_context(|| format!("impossible to read shape {shape_id}"))?;
    println!("Shape {shape_id}: {} points", points.len());
    for p in points.iter() {
        println!("  {:>5} {:.6},{:.6}", p.sequence, p.latitude, p.longitude);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let gtfs = args.next().context(USAGE)?;

    let now = Instant::now();
    info!("Opening {gtfs}");
    let archive = ArchiveReader::default()
        .read(&gtfs)
        .with_context(|| format!("impossible to open {gtfs}"))?;
    archive.print_stats()?;
    info!("Every table read in {} ms", now.elapsed().as_millis());

    for shape_id in args {
        print_shape(&archive, &shape_id)?;
    }

    archive
        .delete_uncompressed_files()
        .context("impossible to remove the extracted files")?;
    Ok(())
}
