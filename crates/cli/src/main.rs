use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lib::skills::Library;
use lib::tools::{self, CheckRulesArgs, GetSkillArgs, ListSkillsArgs, ScaffoldArgs};

#[derive(Parser)]
#[command(name = "skilldex")]
#[command(about = "Serve a library of markdown skill documents to AI assistants", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where to find the skill library.
#[derive(clap::Args, Clone)]
struct LibraryOpts {
    /// Config file path (default: SKILLDEX_CONFIG_PATH or ~/.skilldex/config.json)
    #[arg(long, short, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Skill library root (SKILLDEX_SKILLS_DIR takes precedence when set)
    #[arg(long, value_name = "DIR")]
    skills_dir: Option<PathBuf>,

    /// Use the skills compiled into this binary instead of a directory
    #[arg(long, conflicts_with = "skills_dir")]
    bundled: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and extract the bundled skill library.
    Init {
        /// Config file path (default: SKILLDEX_CONFIG_PATH or ~/.skilldex/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Run the MCP server on stdin/stdout.
    Serve {
        #[command(flatten)]
        library: LibraryOpts,
    },

    /// List categories and their skills.
    List {
        /// Only this category
        category: Option<String>,
        #[command(flatten)]
        library: LibraryOpts,
    },

    /// Print a skill (category/skill) or a category overview.
    Get {
        id: String,
        #[command(flatten)]
        library: LibraryOpts,
    },

    /// Search skills by keyword.
    Search {
        query: String,
        #[command(flatten)]
        library: LibraryOpts,
    },

    /// Print the rules checklist of a skill.
    Check {
        skill_id: String,
        /// File whose contents are echoed under the checklist for review
        #[arg(long, value_name = "FILE")]
        code: Option<PathBuf>,
        #[command(flatten)]
        library: LibraryOpts,
    },

    /// Render a category's templates for a name and print the files.
    Scaffold {
        category: String,
        name: String,
        /// Extra template variable (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,
        #[command(flatten)]
        library: LibraryOpts,
    },
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))?;
    let k = k.trim();
    if k.is_empty() {
        return Err(format!("empty variable name in {:?}", s));
    }
    Ok((k.to_string(), v.to_string()))
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("skilldex {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Init { config }) => run_init(config),
        Some(Commands::Serve { library }) => run_serve(library).await,
        Some(Commands::List { category, library }) => open_library(&library)
            .map(|skills| tools::list_skills(&skills, &ListSkillsArgs { category }))
            .map(print_output),
        Some(Commands::Get { id, library }) => open_library(&library)
            .map(|skills| {
                let args = GetSkillArgs {
                    id: Some(id),
                    search: None,
                };
                tools::get_skill(&skills, &args)
            })
            .map(print_output),
        Some(Commands::Search { query, library }) => open_library(&library)
            .map(|skills| {
                let args = GetSkillArgs {
                    id: None,
                    search: Some(query),
                };
                tools::get_skill(&skills, &args)
            })
            .map(print_output),
        Some(Commands::Check {
            skill_id,
            code,
            library,
        }) => run_check(library, skill_id, code),
        Some(Commands::Scaffold {
            category,
            name,
            vars,
            library,
        }) => open_library(&library)
            .map(|skills| {
                let variables = vars
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::String(v)))
                    .collect();
                let args = ScaffoldArgs {
                    category,
                    name,
                    variables: Some(variables),
                };
                tools::scaffold(&skills, &args)
            })
            .map(print_output),
        None => {
            println!("Run with --help for usage");
            Ok(())
        }
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn print_output(text: String) {
    println!("{}", text.trim_end());
}

fn open_library(opts: &LibraryOpts) -> anyhow::Result<Library> {
    if opts.bundled {
        log::info!("using bundled skill library");
        return Ok(lib::init::bundled_library());
    }
    let (config, path) = lib::config::load_config(opts.config.clone())?;
    let root = lib::config::resolve_root_dir(&config, &path, opts.skills_dir.as_deref());
    if !root.is_dir() {
        log::warn!(
            "skill library not found at {} (run `skilldex init` or pass --skills-dir); serving an empty library",
            root.display()
        );
    } else {
        log::info!("skill library: {}", root.display());
    }
    Ok(Library::open(root))
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let skills_dir = lib::init::init_config_dir(&path)?;
    println!(
        "initialized configuration at {} (skills in {})",
        path.parent().unwrap_or(std::path::Path::new(".")).display(),
        skills_dir.display()
    );
    Ok(())
}

async fn run_serve(opts: LibraryOpts) -> anyhow::Result<()> {
    let library = open_library(&opts)?;
    lib::server::run_stdio(library).await
}

fn run_check(opts: LibraryOpts, skill_id: String, code: Option<PathBuf>) -> anyhow::Result<()> {
    let code = code
        .map(|path| {
            std::fs::read_to_string(&path)
                .with_context(|| format!("reading code from {}", path.display()))
        })
        .transpose()?;
    let library = open_library(&opts)?;
    let checklist = tools::check_rules(&library, &CheckRulesArgs { skill_id, code });
    print_output(checklist.to_string());
    Ok(())
}
