use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "aealanlys",
    about = "Generate BigQuery queries that aggregate App Engine request logs by route",
    version
)]
pub struct Cli {
    /// Route table: "NAME METHOD PATTERN" per line, or a JSON array (.json)
    #[arg(short, long)]
    pub routes: PathBuf,

    /// Table holding the request logs, e.g. project.dataset.appengine_googleapis_com_request_log_*
    #[arg(short, long, required_unless_present_any = ["resolve", "udf_only"])]
    pub table: Option<String>,

    /// Expression for the WHERE clause, e.g. "_TABLE_SUFFIX BETWEEN '20250101' AND '20250107'"
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Print only the grouping function definition
    #[arg(long)]
    pub udf_only: bool,

    /// Resolve a request such as "GET /items/42" to its group locally (repeatable)
    #[arg(long, value_name = "REQUEST")]
    pub resolve: Vec<String>,
}
