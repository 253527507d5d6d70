use std::io::Read;
use std::time::Duration;

use cairn::order::{OptimalSearch, DEFAULT_TIMEOUT_OPTIMAL};
use cairn::perm::PqTree;
use cairn::tower::{self, BuildOptions, Simple};
use cairn::{dot, io, transform, Dag};
use cairn_source::{crawl, CrawlOptions, CratesIoClient, DEFAULT_CACHE_TTL};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    InvalidConstraint(String),
    Unsatisfiable(String),
    Io(std::io::Error),
    Graph(io::IoError),
    Crawl(cairn_source::CrawlError),
    Client(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::InvalidConstraint(msg) => write!(f, "invalid constraint: {msg}"),
            CliError::Unsatisfiable(c) => {
                write!(f, "constraint {c:?} made the tree unsatisfiable")
            }
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Graph(err) => write!(f, "{err}"),
            CliError::Crawl(err) => write!(f, "{err}"),
            CliError::Client(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<io::IoError> for CliError {
    fn from(value: io::IoError) -> Self {
        Self::Graph(value)
    }
}

impl From<cairn_source::CrawlError> for CliError {
    fn from(value: cairn_source::CrawlError) -> Self {
        Self::Crawl(value)
    }
}

fn usage() -> &'static str {
    "cairn\n\
\n\
USAGE:\n\
  cairn pqtree [--labels A,B,C,...] [-o FILE] [constraint...]\n\
  cairn layout [--width <w>] [--height <h>] [--optimal] [--merge] [-o FILE] [<path>|-]\n\
  cairn dot [--detailed] [<path>|-]\n\
  cairn crawl <crate> [--max-depth <n>] [--max-nodes <n>] [--refresh] [-o FILE]\n\
\n\
NOTES:\n\
  - pqtree constraints are comma-separated element indices that must be\n\
    adjacent, e.g. `cairn pqtree --labels A,B,C,D -o tree.dot 0,1 2,3`.\n\
  - layout and dot read a graph JSON document from <path> or stdin.\n\
  - crawl resolves the crate's dependency graph from crates.io and prints\n\
    it as graph JSON.\n\
"
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    labels: Option<String>,
    constraints: Vec<String>,
    width: f64,
    height: f64,
    optimal: bool,
    merge: bool,
    detailed: bool,
    max_depth: usize,
    max_nodes: usize,
    refresh: bool,
    input: Option<String>,
    out: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Command {
    #[default]
    PqTree,
    Layout,
    Dot,
    Crawl,
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        width: 1000.0,
        height: 800.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1).peekable();
    let Some(cmd) = it.next() else {
        return Err(CliError::Usage(usage()));
    };
    args.command = match cmd.as_str() {
        "pqtree" => Command::PqTree,
        "layout" => Command::Layout,
        "dot" => Command::Dot,
        "crawl" => Command::Crawl,
        "--help" | "-h" => return Err(CliError::Usage(usage())),
        _ => return Err(CliError::Usage(usage())),
    };

    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--labels" => {
                let Some(labels) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.labels = Some(labels.clone());
            }
            "--width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.width = w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.height = h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--optimal" => args.optimal = true,
            "--merge" => args.merge = true,
            "--detailed" => args.detailed = true,
            "--max-depth" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.max_depth = n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--max-nodes" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.max_nodes = n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--refresh" => args.refresh = true,
            "--output" | "-o" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()))
            }
            positional => match args.command {
                Command::PqTree => args.constraints.push(positional.to_string()),
                _ => {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(positional.to_string());
                }
            },
        }
    }

    Ok(args)
}

fn read_graph(input: Option<&str>) -> Result<Dag, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(io::read_json(buf.as_bytes())?)
        }
        Some(path) => Ok(io::import_json(path)?),
    }
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn run_pqtree(args: &Args) -> Result<(), CliError> {
    let labels_raw = args.labels.as_deref().unwrap_or("A,B,C,D");
    let labels: Vec<&str> = labels_raw.split(',').map(str::trim).collect();
    if labels.is_empty() || labels.iter().any(|l| l.is_empty()) {
        return Err(CliError::InvalidConstraint(
            "at least one non-empty label is required".to_string(),
        ));
    }

    let mut tree = PqTree::new(labels.len());
    for raw in &args.constraints {
        let constraint = parse_constraint(raw, labels.len())?;
        if !tree.reduce(&constraint) {
            return Err(CliError::Unsatisfiable(raw.clone()));
        }
    }

    write_text(&tree.to_dot(&labels), args.out.as_deref())?;

    eprintln!("Tree: {}", tree.to_string_with_labels(&labels));
    eprintln!("Valid permutations: {}", tree.valid_count());
    if let Some(out) = &args.out {
        eprintln!("Output: {out}");
    }
    Ok(())
}

fn parse_constraint(raw: &str, n: usize) -> Result<Vec<usize>, CliError> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        return Err(CliError::InvalidConstraint(format!(
            "{raw:?}: need at least 2 indices"
        )));
    }
    let mut constraint = Vec::with_capacity(parts.len());
    for part in parts {
        let index: usize = part.parse().map_err(|_| {
            CliError::InvalidConstraint(format!("{raw:?}: invalid index {part:?}"))
        })?;
        if index >= n {
            return Err(CliError::InvalidConstraint(format!(
                "{raw:?}: index {index} out of range for {n} labels"
            )));
        }
        constraint.push(index);
    }
    Ok(constraint)
}

fn run_layout(args: &Args) -> Result<(), CliError> {
    let mut g = read_graph(args.input.as_deref())?;
    transform::normalize(&mut g);

    let mut opts = BuildOptions::default();
    if args.optimal {
        opts.orderer = Box::new(OptimalSearch {
            timeout: Some(DEFAULT_TIMEOUT_OPTIMAL),
            ..Default::default()
        });
    }

    let mut layout = tower::build(&g, args.width, args.height, &opts);
    if args.merge {
        layout = tower::merge_subdividers(&layout, &g);
    }

    write_text(&tower::render_svg(&layout, &g, &Simple), args.out.as_deref())
}

fn run_dot(args: &Args) -> Result<(), CliError> {
    let g = read_graph(args.input.as_deref())?;
    let text = dot::to_dot(
        &g,
        dot::DotOptions {
            detailed: args.detailed,
        },
    );
    write_text(&text, args.out.as_deref())
}

fn run_crawl(args: &Args) -> Result<(), CliError> {
    let Some(root) = args.input.clone() else {
        return Err(CliError::Usage(usage()));
    };

    let client =
        CratesIoClient::new(DEFAULT_CACHE_TTL).map_err(|err| CliError::Client(err.to_string()))?;
    let client = std::sync::Arc::new(client);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let opts = CrawlOptions {
        max_depth: args.max_depth,
        max_nodes: args.max_nodes,
        refresh: args.refresh,
        ..Default::default()
    };
    let g = runtime.block_on(crawl(&root, opts, move |name, refresh| {
        let client = std::sync::Arc::clone(&client);
        async move {
            client
                .fetch_crate(&name, refresh)
                .await
                .map_err(anyhow::Error::from)
        }
    }))?;

    let mut out = Vec::new();
    io::write_json(&g, &mut out)?;
    let text = String::from_utf8(out).unwrap_or_default();
    write_text(&text, args.out.as_deref())
}

fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().collect();
    let args = parse_args(&argv)?;

    match args.command {
        Command::PqTree => run_pqtree(&args),
        Command::Layout => run_layout(&args),
        Command::Dot => run_dot(&args),
        Command::Crawl => run_crawl(&args),
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
