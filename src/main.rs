use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use eframe::egui::{self, Key, Sense};
use notescope::rendering::piano_roll::{PianoRollRenderer, Renderer};
use notescope::{MidiViewer, ViewerHandle, ViewerSettings, ViewportInput};

/// egui reports wheel movement in points; one notch is roughly this many.
const WHEEL_NOTCH_POINTS: f32 = 40.0;

struct MainWindow {
    viewer: ViewerHandle,
    renderer: PianoRollRenderer,
    settings: ViewerSettings,
}

impl MainWindow {
    fn new(viewer: ViewerHandle, settings: ViewerSettings) -> Self {
        Self {
            viewer,
            renderer: PianoRollRenderer::new(),
            settings,
        }
    }

    /// Forwards wheel and pointer presses to the update worker. Returns true if
    /// the user asked to quit.
    fn handle_input(&mut self, ui: &egui::Ui, response: &egui::Response) -> bool {
        let (scroll_delta, quit) = ui.input(|i| {
            (
                i.raw_scroll_delta.y,
                i.key_pressed(Key::Escape) || i.key_pressed(Key::Q),
            )
        });

        if scroll_delta.abs() > 0.001 && response.hovered() {
            self.viewer.send(ViewportInput::Wheel(scroll_delta / WHEEL_NOTCH_POINTS));
        }
        if response.hovered() && ui.input(|i| i.pointer.any_pressed()) {
            self.viewer.send(ViewportInput::Press);
        }
        quit
    }
}

impl eframe::App for MainWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| {
                let available_size = ui.available_size_before_wrap();
                let (rect, response) = ui.allocate_exact_size(available_size, Sense::click_and_drag());

                if self.handle_input(ui, &response) {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    return;
                }

                let painter = ui.painter_at(rect);
                let frame = self.viewer.descriptor();
                self.renderer.draw(&painter, rect.min, &frame);
            });

        ctx.request_repaint_after(self.settings.update_interval);
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// MIDI file to open; a file dialog is shown when omitted
    file: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = ViewerSettings::default().width as i32)]
    width: i32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = ViewerSettings::default().height as i32)]
    height: i32,
}

fn pick_file(file: Option<PathBuf>) -> Option<PathBuf> {
    file.or_else(|| {
        rfd::FileDialog::new()
            .add_filter("MIDI Files", &["mid", "midi"])
            .pick_file()
    })
}

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match ViewerSettings::new(cli.width, cli.height) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("notescope: {}", err);
            exit(2);
        }
    };

    let Some(path) = pick_file(cli.file) else {
        log::warn!("No MIDI file selected");
        return Ok(());
    };

    let viewer = match MidiViewer::open(&path, settings.clone()).and_then(MidiViewer::start) {
        Ok(viewer) => viewer,
        Err(err) => {
            log::error!("Cannot view {}: {}", path.display(), err);
            eprintln!("notescope: {}", err);
            exit(1);
        }
    };

    let title = path
        .file_name()
        .map_or_else(|| "notescope".to_string(), |name| name.to_string_lossy().into_owned());
    let native_options = eframe::NativeOptions {
        renderer: eframe::Renderer::Glow,
        viewport: egui::ViewportBuilder::default()
            .with_title(title.clone())
            .with_inner_size([settings.width_f(), settings.height_f()])
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        native_options,
        Box::new(move |_cc| Ok(Box::new(MainWindow::new(viewer, settings)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_sizes_the_viewport() {
        let cli = Cli::try_parse_from(["notescope", "song.mid", "--width", "1200", "--height", "600"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("song.mid")));
        let settings = ViewerSettings::new(cli.width, cli.height).unwrap();
        assert_eq!((settings.width, settings.height), (1200, 600));

        let cli = Cli::try_parse_from(["notescope"]).unwrap();
        assert_eq!(cli.file, None);
        assert_eq!((cli.width, cli.height), (730, 410));

        let cli = Cli::try_parse_from(["notescope", "--width", "0"]).unwrap();
        assert!(ViewerSettings::new(cli.width, cli.height).is_err());
    }
}
