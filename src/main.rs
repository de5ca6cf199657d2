use clap::Parser;
use secrets_rewrite::{
    FileReportJson, Generator, LineIndexResolver, RewriteConfig, RewriteRequest, RewriteResponse,
    RewriteTarget, RewrittenFile, SourceFile, read_source, resolve_execution_id,
};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Rewrite secret declarations into runtime-loaded initializers
#[derive(Parser, Debug)]
#[command(name = "secrets-rewrite")]
#[command(version = "0.1.0")]
#[command(about = "Splice runtime secret loading into analyzed source files", long_about = None)]
struct Args {
    /// JSON file with files and rewrite targets (omit to read from stdin)
    #[arg(short, long)]
    request: Option<String>,

    /// Directory to write rewritten files into, mirroring their paths
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,

    /// Print the rewritten text of every file to stdout
    #[arg(short, long, conflicts_with = "json")]
    print: bool,

    /// Output structured JSON instead of human-readable
    #[arg(short, long)]
    json: bool,

    /// Write the report to file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Import path of the runtime dependency (overrides the request)
    #[arg(long)]
    import_path: Option<String>,

    /// Alias the runtime dependency is imported under (overrides the request)
    #[arg(long)]
    alias: Option<String>,
}

/// Read RewriteRequest from file path or stdin
///
/// If `path` is Some, reads from the file at that path.
/// If `path` is None, reads from stdin.
fn read_request(path: Option<&String>) -> Result<RewriteRequest, Box<dyn std::error::Error>> {
    let json_str = if let Some(p) = path {
        fs::read_to_string(p)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let request: RewriteRequest = serde_json::from_str(&json_str)?;
    Ok(request)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "secrets_rewrite=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let request = match read_request(args.request.as_ref()) {
        Ok(req) => req,
        Err(e) => {
            eprintln!("Error reading rewrite request: {}", e);
            std::process::exit(1);
        }
    };

    let execution_id = resolve_execution_id(&request.execution_id);
    let config = RewriteConfig::default()
        .with_overrides(request.import_path, request.alias)
        .with_overrides(args.import_path.clone(), args.alias.clone());
    tracing::debug!(%execution_id, import_path = %config.import_path, alias = %config.alias, "starting pass");

    let mut sources: Vec<SourceFile> = Vec::with_capacity(request.files.len());
    for file in &request.files {
        match read_source(&file.path, file.package_end) {
            Ok(source) => sources.push(source),
            Err(e) => fail(
                &args,
                RewriteResponse::failure(
                    execution_id.clone(),
                    format!("Failed to read file '{}': {}", file.path, e),
                ),
            ),
        }
    }

    let targets: Vec<RewriteTarget> = request.targets.into_iter().map(Into::into).collect();

    let rewritten = match Generator::new(config).generate(&sources, &targets, &LineIndexResolver) {
        Ok(rewritten) => rewritten,
        Err(e) => fail(
            &args,
            RewriteResponse::failure(execution_id.clone(), format!("Failed to rewrite: {}", e)),
        ),
    };

    // Every destination is checked before the first file is written
    let planned = args.out_dir.as_deref().map(|dir| plan_outputs(dir, &rewritten));
    let destinations: Vec<Option<PathBuf>> = match planned {
        None => vec![None; rewritten.len()],
        Some(Ok(paths)) => paths.into_iter().map(Some).collect(),
        Some(Err(e)) => fail(&args, RewriteResponse::failure(execution_id.clone(), e)),
    };

    let mut reports = Vec::with_capacity(rewritten.len());
    for (file, dest) in rewritten.iter().zip(destinations) {
        let output_path = match dest.map(|dest| write_rewritten(&dest, file).map(|()| dest)) {
            None => None,
            Some(Ok(path)) => Some(path.display().to_string()),
            Some(Err(e)) => fail(
                &args,
                RewriteResponse::failure(
                    execution_id.clone(),
                    format!("Failed to write rewritten '{}': {}", file.path, e),
                ),
            ),
        };
        reports.push(FileReportJson::new(file, output_path));
    }

    if args.print {
        for file in &rewritten {
            print!("{}", file.text());
        }
    }

    let response = RewriteResponse::success(execution_id, reports);
    output_response(&response, args.json, args.output.as_ref());
}

/// Destination of `file` under `out_dir`; root and parent components of
/// the source path are dropped so nothing escapes the directory
fn output_location(out_dir: &Path, source_path: &str) -> PathBuf {
    let relative: PathBuf = Path::new(source_path)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    out_dir.join(relative)
}

/// Destinations of every rewritten file, in order
///
/// Fails when two sources would land on the same path, since the later
/// write would silently replace the earlier one.
fn plan_outputs(out_dir: &Path, rewritten: &[RewrittenFile]) -> Result<Vec<PathBuf>, String> {
    let mut claimed: HashMap<PathBuf, &str> = HashMap::with_capacity(rewritten.len());
    let mut destinations = Vec::with_capacity(rewritten.len());
    for file in rewritten {
        let dest = output_location(out_dir, &file.path);
        if let Some(first) = claimed.insert(dest.clone(), &file.path) {
            return Err(format!(
                "Rewritten files '{}' and '{}' would both be written to '{}'",
                first,
                file.path,
                dest.display()
            ));
        }
        destinations.push(dest);
    }
    Ok(destinations)
}

fn write_rewritten(dest: &Path, file: &RewrittenFile) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, &file.content)?;
    tracing::debug!(source = %file.path, dest = %dest.display(), "wrote rewritten file");
    Ok(())
}

/// Report a failed pass and exit
fn fail(args: &Args, response: RewriteResponse) -> ! {
    tracing::error!(error = response.error.as_deref().unwrap_or_default(), "pass failed");
    output_response(&response, args.json, args.output.as_ref());
    std::process::exit(1);
}

/// Format and output the response
fn output_response(response: &RewriteResponse, json_mode: bool, output_path: Option<&String>) {
    let output = if json_mode {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| {
            r#"{"error": "Failed to serialize response"}"#.to_string()
        })
    } else if response.success {
        let mut lines = vec![format!(
            "Rewrote {} declaration(s) in {} file(s)",
            response.rewritten_count,
            response.files.len()
        )];
        for file in &response.files {
            let dest = file
                .output_path
                .as_deref()
                .map(|p| format!(" -> {}", p))
                .unwrap_or_default();
            lines.push(format!(
                "  {}: {} declaration(s), checksum {}{}",
                file.path, file.replacements, file.checksum, dest
            ));
        }
        lines.join("\n")
    } else {
        format!("Error: {}", response.error.as_deref().unwrap_or("Unknown error"))
    };

    if let Some(path) = output_path {
        if let Err(e) = fs::write(path, &output) {
            eprintln!("Failed to write output to '{}': {}", path, e);
            std::process::exit(1);
        }
    } else {
        println!("{}", output);
    }
}
