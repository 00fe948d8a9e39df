use anyhow::{Context, Result, bail};
use notion_cms_config::Config;
use notion_cms_render::html::{HtmlOptions, HtmlWriter};
use notion_cms_render::{BaseUrlResolver, LogSink, Renderer};
use notion_cms_types::{BlockNode, Listing};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::env;

const USAGE: &str = "Usage: notion-cms-cli [--config PATH] <FILE.json>";

#[derive(Debug, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    input: PathBuf,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut config = None;
    let mut input = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => bail!("Unknown option {flag}\n{USAGE}"),
            _ if input.is_some() => bail!("Only one input file is supported\n{USAGE}"),
            _ => input = Some(PathBuf::from(&arg)),
        }
    }

    let input = input.context(USAGE)?;
    Ok(Args { config, input })
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("Config file '{}' does not exist", path.display())),
        None => {
            let config = Config::load()?;
            if config.is_none() {
                log::debug!(
                    "No config file at {}, using defaults",
                    Config::config_path().display()
                );
            }
            Ok(config.unwrap_or_default())
        }
    }
}

fn resolver(config: &Config) -> BaseUrlResolver {
    match &config.links {
        Some(links) => BaseUrlResolver::new(links.page_base_url.as_str())
            .with_id_format(links.id_format.into()),
        None => BaseUrlResolver::default(),
    }
}

/// Accepts a bare array of blocks or a `list` envelope.
fn parse_dump(json: &str) -> Result<Vec<BlockNode>> {
    let value: Value = serde_json::from_str(json).context("Input is not valid JSON")?;
    let blocks = if value.is_array() {
        serde_json::from_value(value).context("Failed to decode block array")?
    } else {
        let listing: Listing<BlockNode> =
            serde_json::from_value(value).context("Failed to decode block listing")?;
        if listing.has_more {
            log::warn!("Input is a partial listing; later pages are not rendered");
        }
        listing.into_results()
    };
    Ok(blocks)
}

fn render_file(input: &Path, config: &Config) -> Result<String> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let blocks = parse_dump(&json).with_context(|| format!("Invalid dump {}", input.display()))?;
    log::info!("Rendering {} top-level blocks from {}", blocks.len(), input.display());

    let links = resolver(config);
    let markup = Renderer::new(&LogSink, &links).render_tree(&blocks);

    let options = HtmlOptions {
        newline_between_blocks: config.output.newline_between_blocks,
    };
    Ok(HtmlWriter::new(options).write(&markup))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args(env::args().skip(1))?;
    let config = load_config(args.config.as_deref())?;
    let html = render_file(&args.input, &config)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{html}")?;
    Ok(())
}
