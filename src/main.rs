#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = desktop::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod desktop {
    use std::any::Any;
    use std::env;
    use std::fmt;
    use std::panic::{self, AssertUnwindSafe};
    use std::path::PathBuf;
    use std::sync::Arc;

    use anyhow::{anyhow, Context, Result};
    use log::info;
    use pollster::block_on;
    use winit::dpi::LogicalSize;
    use winit::event_loop::EventLoop;
    use winit::platform::run_return::EventLoopExtRunReturn;
    use winit::window::WindowBuilder;

    use glb_viewer::{ModelFile, Renderer, ViewerApp, ViewerConfig};

    pub fn run() -> Result<()> {
        let options = CliOptions::parse()?;
        let config = match &options.config {
            Some(path) => ViewerConfig::load(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?,
            None => ViewerConfig::default(),
        };
        let model = ModelFile::open(&options.path)
            .with_context(|| format!("failed to load model {}", options.path.display()))?;
        println!("{}", model.summary());

        if options.summary_only {
            return Ok(());
        }
        match run_interactive(config) {
            Ok(()) => Ok(()),
            Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn run_interactive(config: ViewerConfig) -> Result<()> {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
        panic::set_hook(default_hook);
        let mut event_loop =
            event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title("GLB Viewer")
                .with_inner_size(LogicalSize::new(1280.0, 720.0))
                .build(&event_loop)
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );

        let renderer =
            block_on(Renderer::new(Arc::clone(&window))).context("failed to initialize renderer")?;
        info!("viewer window ready");
        let mut app = ViewerApp::new(renderer, config);

        let mut last_error = None;
        event_loop.run_return(|event, _, control_flow| {
            control_flow.set_wait();
            if let Err(err) = app.handle_event(&event, control_flow) {
                last_error = Some(err);
                control_flow.set_exit();
            }
        });

        match last_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    #[derive(Debug)]
    struct WindowInitError {
        message: String,
    }

    impl WindowInitError {
        fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
            Self {
                message: format!("failed to initialize {stage}: {}", panic_message(panic)),
            }
        }

        fn from_error(stage: &str, err: impl fmt::Display) -> Self {
            Self {
                message: format!("failed to initialize {stage}: {err}"),
            }
        }
    }

    impl fmt::Display for WindowInitError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.message)
        }
    }

    impl std::error::Error for WindowInitError {}

    fn panic_message(panic: Box<dyn Any + Send>) -> String {
        match panic.downcast::<String>() {
            Ok(msg) => *msg,
            Err(panic) => match panic.downcast::<&'static str>() {
                Ok(msg) => (*msg).to_string(),
                Err(_) => "unknown panic".into(),
            },
        }
    }

    const USAGE: &str =
        "Usage: glb-viewer <model.glb|model.gif> [--summary-only] [--config <viewer.json>]";

    struct CliOptions {
        path: PathBuf,
        summary_only: bool,
        config: Option<PathBuf>,
    }

    impl CliOptions {
        fn parse() -> Result<Self> {
            let mut args = env::args().skip(1);
            let Some(path) = args.next() else {
                return Err(anyhow!(USAGE));
            };
            let mut summary_only = false;
            let mut config = None;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--summary-only" => summary_only = true,
                    "--config" => {
                        let value = args
                            .next()
                            .ok_or_else(|| anyhow!("--config expects a file path. {USAGE}"))?;
                        config = Some(PathBuf::from(value));
                    }
                    other => {
                        return Err(anyhow!(
                            "Unknown argument: {other}. Expected --summary-only or --config"
                        ));
                    }
                }
            }
            Ok(Self {
                path: PathBuf::from(path),
                summary_only,
                config,
            })
        }
    }
}
