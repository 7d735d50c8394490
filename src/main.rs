use clap::{Parser, Subcommand};
use dotenv::dotenv;
use kinetic_el::config::ElConfig;
use kinetic_el::el::{unescape_text, Builder, Node, TreeBuilder, TreeStore};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file; defaults to EL_* environment variables
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse expressions and report their properties
    Check {
        /// Expressions to compile
        #[arg(required = true)]
        expressions: Vec<String>,
    },
    /// Print the canonical form of an expression
    Canon {
        /// Expression to canonicalize
        expression: String,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ElConfig::load(path)?,
        None => ElConfig::from_env()?,
    };
    log::info!(
        "Using cache capacity {} with concurrency {}",
        config.cache_capacity,
        config.concurrency
    );

    match args.command {
        Commands::Check { expressions } => {
            let store = TreeStore::from_config(&config)?;
            let mut failed = 0;
            for expression in &expressions {
                match store.parse_or_get_cached(expression) {
                    Ok(tree) => {
                        println!("{}", expression);
                        println!("  canonical:    {}", tree.structural_id(None));
                        println!("  literal text: {}", tree.is_literal_text());
                        println!("  deferred:     {}", tree.is_deferred());
                        println!("  left value:   {}", tree.is_left_value());
                        if let Node::Text { raw } = tree.root() {
                            println!("  text:         {}", unescape_text(raw));
                        }
                        if !tree.identifiers().is_empty() {
                            println!("  identifiers:  {}", tree.identifiers().join(", "));
                        }
                        if !tree.functions().is_empty() {
                            let names: Vec<String> =
                                tree.functions().iter().map(|f| f.qualified_name()).collect();
                            println!("  functions:    {}", names.join(", "));
                        }
                    }
                    Err(e) => {
                        log::error!("Failed to parse '{}': {}", expression, e);
                        println!("{}", expression);
                        if let Some(position) = e.position() {
                            println!("{}^", " ".repeat(position));
                        }
                        println!("  error: {}", e);
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                return Err(format!("{} of {} expressions failed", failed, expressions.len()).into());
            }
        }
        Commands::Canon { expression } => {
            let builder = Builder::new(config.features.iter().copied());
            let tree = builder.build(&expression)?;
            println!("{}", tree);
        }
        Commands::Config => {
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}
