// ABOUTME: CLI binary that extracts one article from a saved HTML page using a site config file.
// ABOUTME: Prints the article record as JSON or plain text; logs go to stderr.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use misinfo_extract::logging::init_tracing;
use misinfo_extract::{extract_article, load_registry, CrawlInfo, Document, SiteConfig};

#[derive(Parser, Debug)]
#[command(name = "misinfo-extract")]
#[command(about = "Extract an article from an HTML page using a site config")]
struct Args {
    /// YAML file of site configs keyed by site name
    #[arg(short = 'c', long = "config")]
    config: PathBuf,

    /// Site to use (default: the site whose domains match --url)
    #[arg(short = 's', long = "site")]
    site: Option<String>,

    /// HTML file to parse
    #[arg(long = "html")]
    html: PathBuf,

    /// URL the page was fetched from
    #[arg(long = "url")]
    url: String,

    /// Content-Type header of the response, used to pick the charset
    #[arg(long = "content-type")]
    content_type: Option<String>,

    /// Crawl id to stamp on the article (requires --crawl-datetime)
    #[arg(long = "crawl-id", requires = "crawl_datetime", conflicts_with = "new_crawl")]
    crawl_id: Option<String>,

    /// Crawl start time to stamp on the article (requires --crawl-id)
    #[arg(long = "crawl-datetime", requires = "crawl_id")]
    crawl_datetime: Option<String>,

    /// Stamp the article with a fresh crawl id and the current time
    #[arg(long = "new-crawl")]
    new_crawl: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output compact JSON instead of pretty
    #[arg(long = "compact")]
    compact: bool,

    /// Output the article's plain text paragraphs instead of JSON
    #[arg(long = "text", conflicts_with = "compact")]
    text: bool,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,
}

fn crawl_info(args: &Args) -> Option<CrawlInfo> {
    match (&args.crawl_id, &args.crawl_datetime) {
        (Some(crawl_id), Some(crawl_datetime)) => Some(CrawlInfo {
            crawl_id: crawl_id.clone(),
            crawl_datetime: crawl_datetime.clone(),
        }),
        _ if args.new_crawl => Some(CrawlInfo::new()),
        _ => None,
    }
}

fn run(args: &Args) -> anyhow::Result<String> {
    let registry = load_registry(&args.config)?;
    let config: &SiteConfig = match &args.site {
        Some(name) => registry
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("site {:?} not found in {:?}", name, args.config))?,
        None => registry
            .for_url(&args.url)
            .ok_or_else(|| anyhow::anyhow!("no site in {:?} matches {}", args.config, args.url))?,
    };

    let body = fs::read(&args.html)
        .map_err(|e| anyhow::anyhow!("error reading file {:?}: {}", args.html, e))?;
    let doc = Document::from_bytes(&body, args.content_type.as_deref(), &args.url)?;
    let article = extract_article(&doc, config, crawl_info(args).as_ref())?;

    let out = if args.text {
        article.text()
    } else if args.compact {
        serde_json::to_string(&article)?
    } else {
        serde_json::to_string_pretty(&article)?
    };
    Ok(out)
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let start = Instant::now();
    let result = run(&args);
    let elapsed = start.elapsed();

    let mut had_error = false;
    match result {
        Ok(out) => {
            if let Some(output_path) = &args.output {
                if let Err(e) = fs::write(output_path, &out) {
                    eprintln!("error writing to {:?}: {}", output_path, e);
                    had_error = true;
                }
            } else {
                println!("{}", out);
            }
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            had_error = true;
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
