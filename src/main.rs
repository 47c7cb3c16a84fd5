fn main() {
    #[cfg(feature = "cli")]
    jsondelta::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("jsondelta: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
