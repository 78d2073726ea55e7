//! Version command implementation.

use colored::Colorize;
use serde::Serialize;

use super::Context;
use crate::config::{HTTP_TIMEOUT, build_version};
use crate::error::Result;
use crate::release::{GithubTags, VersionChecker, VersionInfo};

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    package: &'a str,
}

/// Execute the version command.
///
/// With `check`, the latest release tag is fetched. Lookup failures report
/// `unknown` rather than failing the command.
///
/// # Errors
///
/// Returns an error if configuration cannot be resolved or the async runtime
/// cannot start.
pub fn execute(check: bool, ctx: &Context<'_>) -> Result<()> {
    if !check {
        let output = VersionOutput {
            version: build_version(),
            package: env!("CARGO_PKG_VERSION"),
        };
        if ctx.json {
            println!("{}", serde_json::to_string(&output)?);
        } else {
            println!("koffan {} ({})", output.version, output.package);
        }
        return Ok(());
    }

    let config = ctx.config()?;
    let checker = VersionChecker::new(
        GithubTags::new(config.tags_url, HTTP_TIMEOUT),
        build_version(),
        config.version_cache_ttl,
    );
    let runtime = tokio::runtime::Runtime::new()?;
    let info = runtime.block_on(checker.check());

    if ctx.json {
        println!("{}", serde_json::to_string(&info)?);
    } else {
        print_info(&info);
    }
    Ok(())
}

fn print_info(info: &VersionInfo) {
    println!("Current: {}", info.current);
    println!("Latest:  {}", info.latest);
    if let Some(url) = &info.release_url {
        println!("{} {}", "Update available:".green().bold(), url);
    }
}
