mod logging;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use completion::{
    CancelToken, CompletionParams, CompletionResponse, CompletionSource, Config, HostAdapter,
    ValueTreeProvider, flatten, markdown,
};
use logging::{LogFormat, LogLevel};
use valuesdoc::{Document, Position};

#[derive(Parser)]
#[command(
    name = "chartcomp",
    version,
    about = "Completion for annotated Helm values files"
)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "compact")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Complete at a cursor position in a values file
    Complete(CompleteArgs),

    /// List the top-level blocks of a values file
    Blocks(BlocksArgs),

    /// Print the key path at a cursor position
    Path(CursorArgs),

    /// Fetch a chart's default values and print them flattened
    Flatten(FlattenArgs),

    /// Show the documentation of one completion candidate
    Resolve(ResolveArgs),

    /// Run .case.toml completion cases
    Test(TestArgs),
}

#[derive(clap::Args)]
struct CursorArgs {
    /// Values file
    file: String,

    /// Cursor line (1-based)
    #[arg(short, long)]
    line: usize,

    /// Cursor column (0-based)
    #[arg(short, long)]
    column: usize,
}

#[derive(clap::Args)]
struct CompleteArgs {
    #[command(flatten)]
    cursor: CursorArgs,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct BlocksArgs {
    /// Values file
    file: String,
}

#[derive(clap::Args)]
struct FlattenArgs {
    /// Chart reference, e.g. bitnami/redis
    chart_ref: String,

    /// Print entries as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct ResolveArgs {
    #[command(flatten)]
    cursor: CursorArgs,

    /// Candidate label to resolve
    #[arg(long)]
    label: String,

    /// Print the resolved item and its action as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .case.toml file or directory containing them
    path: String,

    /// Run only cases in these categories (subfolder names). Repeatable.
    #[arg(long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let cli = Cli::parse();
    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    if let Err(err) = logging::setup_logging(cli.log_level, cli.log_format, color_choice) {
        eprintln!("error: cannot set up logging: {}", err);
        process::exit(1);
    }

    let exit_code = match cli.command {
        Command::Complete(args) => do_complete(args, cli.config.as_deref(), color_choice),
        Command::Blocks(args) => do_blocks(args),
        Command::Path(args) => do_path(args),
        Command::Flatten(args) => do_flatten(args, cli.config.as_deref()),
        Command::Resolve(args) => do_resolve(args, cli.config.as_deref()),
        Command::Test(args) => {
            let path = Path::new(&args.path);
            if args.list_categories {
                test_runner::list_categories(path);
                0
            } else {
                test_runner::run_tests(path, cli.no_color, &args.category)
            }
        }
    };
    process::exit(exit_code);
}

fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    match Config::load(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn build_source(config: &Config) -> CompletionSource<Box<dyn ValueTreeProvider>> {
    match CompletionSource::from_config(config) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn read_document(file: &str) -> Document {
    match std::fs::read_to_string(file) {
        Ok(text) => Document::new(file, text),
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", file, e);
            process::exit(1);
        }
    }
}

/// Prints completion responses to the terminal.
struct TerminalHost<'a> {
    document: &'a Document,
    json: bool,
    color_choice: ColorChoice,
    failed: bool,
}

impl HostAdapter for TerminalHost<'_> {
    fn deliver(&mut self, response: CompletionResponse) {
        if self.json {
            match serde_json::to_string_pretty(&response) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("error: cannot serialize response: {}", e);
                    self.failed = true;
                }
            }
        } else {
            for item in &response.items {
                match &item.detail {
                    Some(detail) => println!("{}\t{}\t{}", item.label, item.insert_text, detail),
                    None => println!("{}\t{}", item.label, item.insert_text),
                }
            }
        }

        emit_notices(self.document, &response, self.color_choice);
        if response.notices.iter().any(|n| !n.is_warning()) {
            self.failed = true;
        }
    }
}

fn emit_notices(document: &Document, response: &CompletionResponse, color_choice: ColorChoice) {
    if response.notices.is_empty() {
        return;
    }
    let mut files = SimpleFiles::new();
    let file_id = files.add(document.name.clone(), document.source().to_string());
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for notice in &response.notices {
        let diagnostic = notice.to_diagnostic(file_id);
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
    }
}

fn do_complete(args: CompleteArgs, config: Option<&Path>, color_choice: ColorChoice) -> i32 {
    let config = load_config(config);
    let mut source = build_source(&config);
    let CursorArgs { file, line, column } = args.cursor;

    if !source.is_applicable(&file) {
        eprintln!("note: '{}' does not match any values document pattern", file);
        return 0;
    }

    let document = read_document(&file);
    let mut host = TerminalHost {
        document: &document,
        json: args.json,
        color_choice,
        failed: false,
    };
    let params = CompletionParams {
        document: &document,
        position: Position::new(line, column),
    };
    source.serve(params, &CancelToken::new(), &mut host);
    i32::from(host.failed)
}

fn do_blocks(args: BlocksArgs) -> i32 {
    let document = read_document(&args.file);
    let blocks = valuesdoc::scan(&document);
    for block in &blocks {
        println!(
            "{}-{}\t{}\t{}",
            block.start_line,
            block.key_line,
            block.top_key,
            block.chart_ref.as_deref().unwrap_or("-")
        );
    }
    0
}

fn do_path(args: CursorArgs) -> i32 {
    let document = read_document(&args.file);
    match valuesdoc::resolve_path(&document, Position::new(args.line, args.column)) {
        Ok(path) => {
            println!("{}", path);
            0
        }
        Err(e) => {
            eprintln!("error: {}", e);
            1
        }
    }
}

fn do_flatten(args: FlattenArgs, config: Option<&Path>) -> i32 {
    let config = load_config(config);
    let provider = match config.build_provider() {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };
    let tree = match provider.fetch(&args.chart_ref, &CancelToken::new()) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };

    let entries = flatten(&tree);
    if args.json {
        return match serde_json::to_string_pretty(&entries) {
            Ok(text) => {
                println!("{}", text);
                0
            }
            Err(e) => {
                eprintln!("error: cannot serialize entries: {}", e);
                1
            }
        };
    }
    for entry in &entries {
        let value = match (&entry.scalar_text, entry.kind) {
            (Some(text), Some(kind)) => format!("{} ({})", text, kind),
            _ => "(object)".to_string(),
        };
        println!("{}\t{}\t{}", entry.sort_key.as_text(), entry.dotted(), value);
    }
    0
}

fn do_resolve(args: ResolveArgs, config: Option<&Path>) -> i32 {
    let config = load_config(config);
    let mut source = build_source(&config);
    let CursorArgs { file, line, column } = args.cursor;
    let document = read_document(&file);

    let response = source.get_completions(
        CompletionParams {
            document: &document,
            position: Position::new(line, column),
        },
        &CancelToken::new(),
    );
    let Some(item) = response
        .items
        .iter()
        .find(|item| item.label == args.label)
        .cloned()
    else {
        eprintln!("error: no candidate labelled '{}' at {}:{}", args.label, line, column);
        return 1;
    };

    let resolved = source.resolve(item);
    if args.json {
        let action = source.execute(&resolved);
        let value = serde_json::json!({ "item": resolved, "action": action });
        return match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{}", text);
                0
            }
            Err(e) => {
                eprintln!("error: cannot serialize item: {}", e);
                1
            }
        };
    }

    match &resolved.documentation_markdown {
        Some(docs) => println!("{}", markdown::to_terminal_text(docs)),
        None => println!("{}", resolved.label),
    }
    0
}
