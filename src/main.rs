mod app;
mod backend;
mod util;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the code-analysis backend.
    #[arg(long, default_value = "http://127.0.0.1:7171")]
    backend_url: String,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "codegraph-explorer",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ExplorerApp::new(
                cc,
                args.backend_url.clone(),
            )))
        }),
    )
}
