pub mod fetcher;
pub mod hero_position;
pub mod report;

use std::io::{self, Write};

use fetcher::Fetcher;

/// Fetches `url` once and prints the report to `out`. Fetch failures are
/// written to `err` and still return `Ok`.
pub async fn run<O: Write, E: Write>(
    fetcher: &Fetcher,
    url: &str,
    out: &mut O,
    err: &mut E,
) -> io::Result<()> {
    let data = fetcher.fetch(url, err).await?;
    writeln!(out, "{}", report::render(data.as_ref())?)?;
    out.flush()
}
