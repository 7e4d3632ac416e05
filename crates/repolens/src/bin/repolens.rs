fn main() {
    if let Err(err) = repolens::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
