fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .init();

    if let Err(error) = glaze::app::run() {
        log::error!("{error}");
        std::process::exit(1);
    }
}
