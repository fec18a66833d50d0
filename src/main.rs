use pixelruler::{run_pixelruler, PixelRulerConfig};

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cfg = PixelRulerConfig::load_or_default();
    run_pixelruler(cfg)
}
