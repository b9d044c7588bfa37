use eo_dom::Document;
use eo_overlay::ErrorDescriptor;
use eo_overlay::ErrorPayload;
use eo_overlay::OverlayConfig;
use eo_overlay::OverlayWidget;
use eo_overlay::Region;
use eo_overlay::register_overlay;
use eo_render::Renderer;
use serde::Deserialize;
use std::io::Read;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_DIRECTIVE: &str = "overlay_preview=info";
const USAGE: &str = "usage: overlay-preview [--base <path>] [--no-links] [--origin <url>] \
                     [--plain] [<payload.json>|-]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PreviewArgs {
    base: Option<String>,
    no_links: bool,
    origin: Option<String>,
    plain: bool,
    input: Option<String>,
}

/// Either the HMR wire envelope or a bare descriptor.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PayloadInput {
    Envelope(ErrorPayload),
    Bare(ErrorDescriptor),
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("overlay-preview: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), String> {
    let args = args_from(std::env::args().skip(1))?;
    let raw = read_input(args.input.as_deref())?;
    let descriptor = parse_descriptor(&raw)?;
    let config = apply_overrides(OverlayConfig::from_env(), &args);

    let mut page = Document::new();
    let registration = register_overlay(&mut page);
    tracing::debug!(registration = registration.as_str(), "overlay element registration");

    let widget = OverlayWidget::new(&mut page, descriptor, &config, config.launcher());
    let (Some(element), Some(root)) = (widget.element(), widget.render_root()) else {
        return Err("overlay could not be built for the in-memory page".to_owned());
    };
    let body = page.body();
    page.append_child(body, element)
        .map_err(|error| format!("failed to mount overlay: {error}"))?;

    let renderer = if args.plain {
        Renderer::plain()
    } else {
        Renderer::ansi()
    };
    let frame = renderer.render(&page, root);
    println!("{}", frame.text());

    let links: usize = Region::ALL
        .iter()
        .map(|region| widget.links(&page, *region).len())
        .sum();
    tracing::info!(
        lines = frame.lines.len(),
        links,
        links_enabled = widget.links_enabled(),
        "overlay rendered"
    );
    Ok(())
}

fn args_from<I>(args: I) -> Result<PreviewArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = PreviewArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--base" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing path after --base".to_owned())?;
                parsed.base = Some(value);
            }
            "--origin" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing url after --origin".to_owned())?;
                parsed.origin = Some(value);
            }
            "--no-links" => parsed.no_links = true,
            "--plain" => parsed.plain = true,
            "-h" | "--help" => return Err(USAGE.to_owned()),
            flag if flag.starts_with("--") => {
                return Err(format!("unsupported option `{flag}`\n{USAGE}"));
            }
            path => {
                if parsed.input.is_some() {
                    return Err(format!("unexpected extra argument `{path}`\n{USAGE}"));
                }
                parsed.input = Some(path.to_owned());
            }
        }
    }

    Ok(parsed)
}

fn apply_overrides(mut config: OverlayConfig, args: &PreviewArgs) -> OverlayConfig {
    if let Some(base) = &args.base {
        config.base = eo_net::normalize_base(base);
    }
    if args.no_links {
        config.links = false;
    }
    if let Some(origin) = &args.origin {
        config.server_origin = Some(origin.clone());
    }
    config
}

fn read_input(path: Option<&str>) -> Result<String, String> {
    match path {
        None | Some("-") => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|error| format!("failed to read payload from stdin: {error}"))?;
            Ok(raw)
        }
        Some(path) => std::fs::read_to_string(path)
            .map_err(|error| format!("failed to read payload `{path}`: {error}")),
    }
}

fn parse_descriptor(raw: &str) -> Result<ErrorDescriptor, String> {
    let input: PayloadInput =
        serde_json::from_str(raw).map_err(|error| format!("invalid error payload: {error}"))?;
    Ok(match input {
        PayloadInput::Envelope(payload) => payload.into_descriptor(),
        PayloadInput::Bare(descriptor) => descriptor,
    })
}
