fn main() {
    if let Err(err) = roster_ingest::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
