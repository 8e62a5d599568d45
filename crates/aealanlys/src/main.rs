use aealanlys::cli::Cli;
use aealanlys::{compile, construct_query, load_routes, PathGrouping, GROUPING_FUNCTION};
use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Reset SIGPIPE handler to default (terminate) so piping to head works correctly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let routes = load_routes(&cli.routes)?;
    info!(routes = routes.len(), path = %cli.routes.display(), "loaded route table");

    let matcher = compile(&routes).context("failed to compile route table")?;
    for collision in matcher.collisions() {
        warn!(
            name = %collision.name,
            shadowed_by = %collision.shadowed_by,
            "group name is matched by a later route and will be rewritten"
        );
    }

    if !cli.resolve.is_empty() {
        for request in &cli.resolve {
            let Some((method, path)) = request.trim().split_once(' ') else {
                bail!("expected \"METHOD PATH\", got {:?}", request);
            };
            let method = method.to_uppercase();
            let path = path.trim();
            println!("{} {}\t{}", method, path, matcher.group_key(&method, path));
        }
        return Ok(());
    }

    if cli.udf_only {
        println!("{}", matcher.grouping_udf(GROUPING_FUNCTION));
        return Ok(());
    }

    let Some(table) = cli.table.as_deref() else {
        bail!("--table is required");
    };
    let query = construct_query(table, cli.filter.as_deref(), &matcher)?;
    println!("{}", query);

    Ok(())
}
