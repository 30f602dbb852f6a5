use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use csspath_codegen::{CompileOptions, Namespaces, Scope};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "csspath")]
#[command(about = "csspath: CSS3 selector to XPath 1.0 compiler")]
#[command(version)]
struct Cli {
    /// Log more (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a selector and print the XPath expression
    Compile {
        /// CSS selector, e.g. "ul > li:nth-child(odd)"
        selector: String,

        /// Namespace binding as PREFIX=URI (repeatable)
        #[arg(long = "ns", value_name = "PREFIX=URI", value_parser = parse_binding)]
        namespaces: Vec<(String, String)>,

        /// Namespace applied to unprefixed type selectors
        #[arg(long, value_name = "URI")]
        default_ns: Option<String>,

        /// Axis of the first location step
        #[arg(long, value_enum, default_value_t = ScopeArg::Descendants)]
        scope: ScopeArg,

        /// Maximum nesting of :not() / :has()
        #[arg(long, default_value_t = CompileOptions::default().max_depth)]
        max_depth: usize,
    },

    /// Check a selector for errors without printing output
    Check {
        /// CSS selector
        selector: String,
    },

    /// Print the token stream of a selector
    Tokens {
        /// CSS selector
        selector: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Descendants,
    DescendantsOrSelf,
    Children,
}

impl From<ScopeArg> for Scope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Descendants => Scope::Descendants,
            ScopeArg::DescendantsOrSelf => Scope::DescendantsOrSelf,
            ScopeArg::Children => Scope::Children,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Compile {
            selector,
            namespaces,
            default_ns,
            scope,
            max_depth,
        } => {
            let options = CompileOptions {
                scope: scope.into(),
                max_depth,
            };
            cmd_compile(&selector, namespaces, default_ns, options)
        }
        Command::Check { selector } => cmd_check(&selector),
        Command::Tokens { selector } => cmd_tokens(&selector),
    }
}

fn init_tracing(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        })
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

/// Split `PREFIX=URI`. The prefix may be empty to set the default namespace.
fn parse_binding(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((prefix, uri)) => Ok((prefix.to_string(), uri.to_string())),
        None => Err(format!("expected PREFIX=URI, got '{s}'")),
    }
}

fn cmd_compile(
    selector: &str,
    bindings: Vec<(String, String)>,
    default_ns: Option<String>,
    options: CompileOptions,
) {
    let mut namespaces = match Namespaces::with(bindings) {
        Ok(namespaces) => namespaces,
        Err(e) => {
            eprintln!("Namespace error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(uri) = default_ns {
        namespaces.set_default(uri);
    }
    debug!(
        bindings = namespaces.len(),
        scope = options.scope.axis(),
        max_depth = options.max_depth,
        "namespace context ready"
    );

    match csspath_codegen::compile_with(selector, &namespaces, options) {
        Ok(xpath) => println!("{xpath}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_check(selector: &str) {
    // Unknown namespace prefixes are not an error here; only the grammar is checked.
    if let Err(e) = check_selector(selector) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    eprintln!("OK: {selector}");
}

fn check_selector(selector: &str) -> Result<(), csspath_codegen::Error> {
    match csspath_codegen::compile(selector, &Namespaces::new()) {
        Err(csspath_codegen::Error::UnknownNamespacePrefix(_)) | Ok(_) => Ok(()),
        Err(e) => Err(e),
    }
}

fn cmd_tokens(selector: &str) {
    let tokens = match csspath_lexer::Scanner::tokenize(selector) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    info!(count = tokens.len(), "tokenized");
    for token in tokens {
        println!("{:>4}  {:<20} {:?}", token.offset, format!("{:?}", token.kind), token.text);
    }
}
