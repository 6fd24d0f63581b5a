use clap::Parser;
use serde_json::{Map, Value};
use site_crawler::{CrawlerConfig, PageRecord, crawl_sites};
use std::error::Error;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let base = match &args.config {
        Some(path) => Some(CrawlerConfig::from_file(path)?),
        None => None,
    };
    let configs = args.crawler_configs(base.as_ref());

    eprintln!("Note: crawling requires a WebDriver server (e.g., ChromeDriver).");
    eprintln!(
        "Set WEBDRIVER_URL if not using the default {}",
        configs[0].webdriver_url
    );

    let start_time = std::time::Instant::now();
    let results = crawl_sites(configs.clone(), args.concurrency).await;

    let mut failed = false;
    let mut report = Vec::new();
    for (config, result) in configs.iter().zip(results) {
        match result {
            Ok(pages) if pages.is_empty() => {
                eprintln!("No pages scraped from {}", config.start_url);
                report.push((config.start_url.clone(), pages));
                failed = true;
            }
            Ok(pages) if args.json => report.push((config.start_url.clone(), pages)),
            Ok(pages) => print_pages(&config.start_url, &pages),
            Err(e) => {
                ::log::error!("Failed to crawl {}: {}", config.start_url, e);
                eprintln!("Failed to crawl {}: {}", config.start_url, e);
                failed = true;
            }
        }
    }

    if args.json {
        let report = json_report(&report, args.include_html)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    ::log::info!(
        "Crawling complete - {} sites in {:.2} seconds",
        args.urls.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_pages(site: &str, pages: &[PageRecord]) {
    println!("{} ({} pages)", site, pages.len());
    for page in pages {
        println!("  [{}] {} - {}", page.page_type, page.url, page.title);
    }
}

/// One JSON object for the whole run, keyed by start URL.
///
/// Sites that failed to crawl are left out; their errors go to stderr.
fn json_report(
    sites: &[(String, Vec<PageRecord>)],
    include_html: bool,
) -> Result<Value, serde_json::Error> {
    let mut report = Map::new();
    for (site, pages) in sites {
        let pages = pages
            .iter()
            .map(|page| match include_html {
                true => serde_json::to_value(page),
                false => serde_json::to_value(page.without_html()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        report.insert(site.clone(), Value::Array(pages));
    }
    Ok(Value::Object(report))
}
