fn main() {
    if let Err(err) = landkreis_stats::run() {
        eprintln!("An error occurred: {err:#}");
    }
}
