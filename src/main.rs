use clap::{Parser, Subcommand};
use policy_doc::render::{self, RenderOptions, scan_document};
use policy_doc::section::{self, Section};
use policy_doc::store::{self, DirStore};
use policy_doc::template::{self, Bilingual, DocumentTemplate};
use policy_doc::{config, export, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

#[derive(Parser)]
#[command(name = "policy-doc")]
#[command(about = "Section editing and bilingual Word export for policy documents")]
#[command(long_about = "\
Section editing and bilingual Word export for policy documents

A policy is one markdown file. Every English element is followed by its
Arabic translation wrapped in an RTL block:

  ## Abbreviations
  <div dir=\"rtl\">
  ## الاختصارات
  </div>

  | Term | Full Form |
  |---|---|
  | KYC | Know Your Customer |

  <div dir=\"rtl\">
  | المصطلح | الشكل الكامل |
  |---|---|
  | KYC | اعرف عميلك |
  </div>

Workflow:

  policy-doc split credit.md              # store sections under key \"credit\"
  policy-doc show credit                  # outline with section ids
  policy-doc update credit section-3 new.md
  policy-doc reorder credit 4 2
  policy-doc join credit -o credit.md
  policy-doc render credit.md -o out/     # → out/credit-policy.doc

Run 'policy-doc gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding stored section lists
    #[arg(long, default_value = ".policy-doc", global = true)]
    store: PathBuf,

    /// Directory containing config.toml (and the logo it references)
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log scanner decisions and other debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a markdown document into stored sections
    Split {
        file: PathBuf,
        /// Store key (defaults to the file name)
        #[arg(long)]
        key: Option<String>,
    },
    /// List stored sections in order
    Show { key: String },
    /// Replace one section's content with the contents of a file
    Update {
        key: String,
        id: String,
        content_file: PathBuf,
    },
    /// Move the section at position FROM to position TO (0-based)
    Reorder { key: String, from: usize, to: usize },
    /// Add a section awaiting generation
    Placeholder {
        key: String,
        title: String,
        /// Heading level, 1-6
        #[arg(long, default_value_t = 2)]
        level: u8,
        /// Position to insert at (defaults to the end)
        #[arg(long)]
        at: Option<usize>,
    },
    /// Reassemble stored sections into markdown
    Join {
        key: String,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export a markdown file, or every .md file in a directory, to .doc
    Render {
        path: PathBuf,
        /// Output file or directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Cover title (defaults to the document's first `# ` heading)
        #[arg(long)]
        title: Option<String>,
        /// Logo image (overrides brand.logo)
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Process diagram image, added as its own page
        #[arg(long)]
        diagram: Option<PathBuf>,
    },
    /// Write bilingual markdown from a JSON template or the standard skeleton
    Template {
        /// Template JSON file
        #[arg(long, conflicts_with_all = ["title", "arabic_title"])]
        json: Option<PathBuf>,
        /// English title of the standard skeleton
        #[arg(long, default_value = "Policy Title")]
        title: String,
        /// Arabic title of the standard skeleton
        #[arg(long, default_value = "عنوان السياسة")]
        arabic_title: String,
        /// Markdown output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also export the template as a .doc file or into a directory
        #[arg(long)]
        doc: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut store = DirStore::new(&cli.store);

    match cli.command {
        Command::Split { file, key } => {
            let markdown = std::fs::read_to_string(&file)?;
            let key = key.unwrap_or_else(|| default_key(&file));
            let sections = section::parse_sections(&markdown);
            store::save_sections(&mut store, &key, &sections)?;
            output::print_stored(&key, &sections);
        }
        Command::Show { key } => {
            let sections = load(&store, &key)?;
            output::print_sections(&sections);
        }
        Command::Update {
            key,
            id,
            content_file,
        } => {
            let sections = load(&store, &key)?;
            if section::find_section(&sections, &id).is_none() {
                return Err(format!("no section \"{id}\" under \"{key}\"").into());
            }
            let content = std::fs::read_to_string(&content_file)?;
            let sections = section::update_section(&sections, &id, content.trim());
            store::save_sections(&mut store, &key, &sections)?;
            output::print_stored(&key, &sections);
        }
        Command::Reorder { key, from, to } => {
            let sections = load(&store, &key)?;
            if from >= sections.len() {
                return Err(format!("position {from} out of range (0-{})", sections.len().saturating_sub(1)).into());
            }
            let sections = section::reorder_sections(&sections, from, to);
            store::save_sections(&mut store, &key, &sections)?;
            output::print_stored(&key, &sections);
        }
        Command::Placeholder {
            key,
            title,
            level,
            at,
        } => {
            let mut sections = store::load_sections(&store, &key)?.unwrap_or_default();
            let end = sections.len();
            sections.push(section::create_placeholder(&title, level, end));
            if let Some(at) = at {
                sections = section::reorder_sections(&sections, end, at);
            }
            store::save_sections(&mut store, &key, &sections)?;
            output::print_stored(&key, &sections);
        }
        Command::Join { key, output: target } => {
            let sections = load(&store, &key)?;
            let markdown = section::reconstruct(&sections);
            match target {
                Some(path) => std::fs::write(path, markdown + "\n")?,
                None => println!("{}", markdown),
            }
        }
        Command::Render {
            path,
            output: target,
            title,
            logo,
            diagram,
        } => {
            let doc_config = config::load_config(&cli.config_dir)?;
            let options = RenderOptions {
                title,
                logo: match logo {
                    Some(p) => Some(export::load_image(&p)?),
                    None => export::brand_logo(&doc_config.brand, &cli.config_dir)?,
                },
                diagram: diagram.map(|p| export::load_image(&p)).transpose()?,
            };

            if path.is_dir() {
                if options.title.is_some() {
                    tracing::warn!("--title is ignored when rendering a directory");
                }
                init_thread_pool(&doc_config.processing);
                let sources = export::find_markdown_files(&path);
                let results = export::export_batch(&path, &sources, &options, &doc_config, &target)?;
                output::print_batch_output(&results);
            } else {
                let markdown = std::fs::read_to_string(&path)?;
                render_one(&markdown, &options, &doc_config, &target)?;
            }
        }
        Command::Template {
            json,
            title,
            arabic_title,
            output: target,
            doc,
        } => {
            let template: DocumentTemplate = match json {
                Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
                None => template::standard_policy_template(Bilingual::new(title, arabic_title)),
            };
            output::eprint_translation_report(&template.missing_translations());

            let markdown = template.to_markdown();
            match target {
                Some(path) => std::fs::write(path, &markdown)?,
                None => print!("{}", markdown),
            }

            if let Some(doc_target) = doc {
                let mut doc_config = config::load_config(&cli.config_dir)?;
                if let Some(footer) = template.footer_text() {
                    doc_config.footer.text = footer;
                }
                let options = RenderOptions {
                    logo: export::brand_logo(&doc_config.brand, &cli.config_dir)?,
                    ..RenderOptions::default()
                };
                render_one(&markdown, &options, &doc_config, &doc_target)?;
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Export one document and print its outline.
fn render_one(
    markdown: &str,
    options: &RenderOptions,
    doc_config: &config::DocConfig,
    target: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = export::export_document(markdown, options, doc_config, target)?;
    let doc = scan_document(markdown);
    let title = render::document_title(&doc, options);
    output::print_export_output(&title, &path, &render::table_of_contents(&doc));
    Ok(())
}

fn load(store: &DirStore, key: &str) -> Result<Vec<Section>, Box<dyn std::error::Error>> {
    store::load_sections(store, key)?.ok_or_else(|| {
        format!(
            "no sections stored under \"{key}\" in {} (run 'policy-doc split' first)",
            store.root().display()
        )
        .into()
    })
}

/// Store key from a file name: `Credit Policy.md` → `credit-policy`.
fn default_key(file: &Path) -> String {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let key = export::slugify(&stem);
    if key.is_empty() { "document".to_string() } else { key }
}

/// Diagnostics go to stderr so stdout stays usable for markdown.
fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    SubscriberBuilder::default()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
